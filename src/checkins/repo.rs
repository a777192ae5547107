use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::sentiment::SentimentLabel;

#[derive(Debug, Clone, FromRow)]
pub struct EmotionType {
    pub id: Uuid,
    pub name: String,
    pub level: i32,
    pub description: String,
    pub color_code: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Checkin {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub emotion_level: i32,
    pub emotion_type_id: Uuid,
    pub comment: Option<String>,
    pub checkin_time: OffsetDateTime,
    pub checkin_date: Date,
}

/// Check-in joined with its catalog entry and AI result, the row shape every
/// read path consumes.
#[derive(Debug, Clone, FromRow)]
pub struct CheckinDetail {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub emotion_level: i32,
    pub mood_name: String,
    pub color_code: String,
    pub comment: Option<String>,
    pub checkin_time: OffsetDateTime,
    pub checkin_date: Date,
    pub sentiment_score: Option<f32>,
    pub sentiment_label: Option<SentimentLabel>,
}

const DETAIL_SELECT: &str = r#"
SELECT c.id, c.employee_id, c.emotion_level, e.name AS mood_name, e.color_code,
       c.comment, c.checkin_time, c.checkin_date,
       r.sentiment_score, r.label AS sentiment_label
FROM emotion_checkins c
JOIN emotion_catalog e ON e.id = c.emotion_type_id
LEFT JOIN emotion_ai_results r ON r.checkin_id = c.id
"#;

pub async fn list_emotions(db: &PgPool) -> anyhow::Result<Vec<EmotionType>> {
    let rows = sqlx::query_as::<_, EmotionType>(
        r#"
        SELECT id, name, level, description, color_code
        FROM emotion_catalog
        ORDER BY level DESC, name
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_emotion(db: &PgPool, id: Uuid) -> anyhow::Result<Option<EmotionType>> {
    let row = sqlx::query_as::<_, EmotionType>(
        r#"
        SELECT id, name, level, description, color_code
        FROM emotion_catalog
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn exists_for_day(db: &PgPool, employee_id: Uuid, day: Date) -> anyhow::Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM emotion_checkins
            WHERE employee_id = $1 AND checkin_date = $2
        )
        "#,
    )
    .bind(employee_id)
    .bind(day)
    .fetch_one(db)
    .await?;
    Ok(exists)
}

pub async fn insert_checkin(
    db: &PgPool,
    employee_id: Uuid,
    emotion_level: i32,
    emotion_type_id: Uuid,
    comment: Option<&str>,
    checkin_time: OffsetDateTime,
    checkin_date: Date,
) -> anyhow::Result<Checkin> {
    let row = sqlx::query_as::<_, Checkin>(
        r#"
        INSERT INTO emotion_checkins
            (employee_id, emotion_level, emotion_type_id, comment, checkin_time, checkin_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, employee_id, emotion_level, emotion_type_id, comment,
                  checkin_time, checkin_date
        "#,
    )
    .bind(employee_id)
    .bind(emotion_level)
    .bind(emotion_type_id)
    .bind(comment)
    .bind(checkin_time)
    .bind(checkin_date)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn insert_ai_result(
    db: &PgPool,
    checkin_id: Uuid,
    score: f32,
    magnitude: f32,
    label: SentimentLabel,
    language: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO emotion_ai_results (checkin_id, sentiment_score, magnitude, label, language)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(checkin_id)
    .bind(score)
    .bind(magnitude)
    .bind(label)
    .bind(language)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn find_for_day(
    db: &PgPool,
    employee_id: Uuid,
    day: Date,
) -> anyhow::Result<Option<CheckinDetail>> {
    let row = sqlx::query_as::<_, CheckinDetail>(&format!(
        "{DETAIL_SELECT} WHERE c.employee_id = $1 AND c.checkin_date = $2"
    ))
    .bind(employee_id)
    .bind(day)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Most recent check-in regardless of age.
pub async fn find_latest(db: &PgPool, employee_id: Uuid) -> anyhow::Result<Option<CheckinDetail>> {
    let row = sqlx::query_as::<_, CheckinDetail>(&format!(
        "{DETAIL_SELECT} WHERE c.employee_id = $1 ORDER BY c.checkin_date DESC LIMIT 1"
    ))
    .bind(employee_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Check-ins on or after `from`, newest first.
pub async fn list_since(
    db: &PgPool,
    employee_id: Uuid,
    from: Date,
) -> anyhow::Result<Vec<CheckinDetail>> {
    let rows = sqlx::query_as::<_, CheckinDetail>(&format!(
        r#"
        {DETAIL_SELECT}
        WHERE c.employee_id = $1 AND c.checkin_date >= $2
        ORDER BY c.checkin_date DESC
        "#
    ))
    .bind(employee_id)
    .bind(from)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_history(
    db: &PgPool,
    employee_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<CheckinDetail>> {
    let rows = sqlx::query_as::<_, CheckinDetail>(&format!(
        r#"
        {DETAIL_SELECT}
        WHERE c.employee_id = $1
        ORDER BY c.checkin_date DESC
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(employee_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn count_for_day(db: &PgPool, day: Date) -> anyhow::Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM emotion_checkins WHERE checkin_date = $1",
    )
    .bind(day)
    .fetch_one(db)
    .await?;
    Ok(count)
}

/// Count of AI results past the high-risk thresholds since `from`.
pub async fn count_high_risk_since(
    db: &PgPool,
    from: Date,
    score_below: f32,
    magnitude_above: f32,
) -> anyhow::Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM emotion_ai_results r
        JOIN emotion_checkins c ON c.id = r.checkin_id
        WHERE c.checkin_date >= $1
          AND r.sentiment_score < $2
          AND r.magnitude > $3
        "#,
    )
    .bind(from)
    .bind(score_below)
    .bind(magnitude_above)
    .fetch_one(db)
    .await?;
    Ok(count)
}
