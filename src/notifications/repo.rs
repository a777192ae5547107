use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo::Role;

#[derive(Debug, Clone, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub message: String,
    pub is_read: bool,
    pub related_checkin_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

/// Notification joined with sender data and the related check-in's level.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationDetail {
    pub id: Uuid,
    pub sender_name: String,
    pub sender_role: Role,
    pub message: String,
    pub is_read: bool,
    pub related_checkin_id: Option<Uuid>,
    pub related_level: Option<i32>,
    pub created_at: OffsetDateTime,
}

const DETAIL_SELECT: &str = r#"
SELECT n.id, u.name AS sender_name, u.role AS sender_role, n.message, n.is_read,
       n.related_checkin_id, c.emotion_level AS related_level, n.created_at
FROM notifications n
JOIN users u ON u.id = n.sender_id
LEFT JOIN emotion_checkins c ON c.id = n.related_checkin_id
"#;

pub async fn insert(
    db: &PgPool,
    sender_id: Uuid,
    receiver_id: Uuid,
    message: &str,
    related_checkin_id: Option<Uuid>,
) -> anyhow::Result<Notification> {
    let row = sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (sender_id, receiver_id, message, related_checkin_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, sender_id, receiver_id, message, is_read, related_checkin_id, created_at
        "#,
    )
    .bind(sender_id)
    .bind(receiver_id)
    .bind(message)
    .bind(related_checkin_id)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn list_for(db: &PgPool, receiver_id: Uuid) -> anyhow::Result<Vec<NotificationDetail>> {
    let rows = sqlx::query_as::<_, NotificationDetail>(&format!(
        "{DETAIL_SELECT} WHERE n.receiver_id = $1 ORDER BY n.created_at DESC"
    ))
    .bind(receiver_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_unread_for(
    db: &PgPool,
    receiver_id: Uuid,
) -> anyhow::Result<Vec<NotificationDetail>> {
    let rows = sqlx::query_as::<_, NotificationDetail>(&format!(
        "{DETAIL_SELECT} WHERE n.receiver_id = $1 AND NOT n.is_read ORDER BY n.created_at DESC"
    ))
    .bind(receiver_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn count_unread(db: &PgPool, receiver_id: Uuid) -> anyhow::Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE receiver_id = $1 AND NOT is_read",
    )
    .bind(receiver_id)
    .fetch_one(db)
    .await?;
    Ok(count)
}

/// Marks one of the receiver's notifications read. Returns false when the id
/// does not belong to them.
pub async fn mark_read(db: &PgPool, id: Uuid, receiver_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND receiver_id = $2",
    )
    .bind(id)
    .bind(receiver_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn mark_all_read(db: &PgPool, receiver_id: Uuid) -> anyhow::Result<u64> {
    let result = sqlx::query(
        "UPDATE notifications SET is_read = TRUE WHERE receiver_id = $1 AND NOT is_read",
    )
    .bind(receiver_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

pub async fn delete_read_older_than(
    db: &PgPool,
    cutoff: OffsetDateTime,
) -> anyhow::Result<u64> {
    let result =
        sqlx::query("DELETE FROM notifications WHERE is_read AND created_at < $1")
            .bind(cutoff)
            .execute(db)
            .await?;
    Ok(result.rows_affected())
}
