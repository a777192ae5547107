use time::{Duration, OffsetDateTime};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::audit::repo::AuditAction;
use crate::audit::services::record;
use crate::error::{ApiError, ApiResult};
use crate::notifications::dto::{
    NotificationResponse, SendNotificationRequest, UnreadCountData,
};
use crate::notifications::repo::{self, NotificationDetail};
use crate::state::AppState;
use crate::users::repo::{self as users_repo, User};

pub async fn list(state: &AppState, actor: &User) -> ApiResult<Vec<NotificationResponse>> {
    let rows = repo::list_for(&state.db, actor.id).await?;
    Ok(to_responses(rows))
}

pub async fn unread(state: &AppState, actor: &User) -> ApiResult<Vec<NotificationResponse>> {
    let rows = repo::list_unread_for(&state.db, actor.id).await?;
    Ok(to_responses(rows))
}

pub async fn count_unread(state: &AppState, actor: &User) -> ApiResult<UnreadCountData> {
    let count = repo::count_unread(&state.db, actor.id).await?;
    Ok(UnreadCountData { count })
}

pub async fn send(
    state: &AppState,
    actor: &User,
    payload: SendNotificationRequest,
    ip: &str,
) -> ApiResult<NotificationResponse> {
    if !actor.role.is_hr_or_admin() {
        return Err(ApiError::forbidden("Only HR/Admin can send notifications"));
    }
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(ApiError::bad_request("Message is required"));
    }
    if users_repo::find_by_id(&state.db, payload.receiver_id)
        .await?
        .is_none()
    {
        return Err(ApiError::not_found("User not found"));
    }

    let notification = repo::insert(
        &state.db,
        actor.id,
        payload.receiver_id,
        message,
        payload.related_checkin_id,
    )
    .await?;
    record(
        &state.db,
        actor.id,
        AuditAction::SendNotification,
        Some(payload.receiver_id),
        None,
        ip,
    )
    .await?;

    let now = OffsetDateTime::now_utc();
    Ok(NotificationResponse::from_detail(
        NotificationDetail {
            id: notification.id,
            sender_name: actor.name.clone(),
            sender_role: actor.role,
            message: notification.message,
            is_read: notification.is_read,
            related_checkin_id: notification.related_checkin_id,
            related_level: None,
            created_at: notification.created_at,
        },
        now,
    ))
}

pub async fn mark_read(state: &AppState, actor: &User, id: Uuid) -> ApiResult<()> {
    if !repo::mark_read(&state.db, id, actor.id).await? {
        return Err(ApiError::not_found("Notification not found"));
    }
    Ok(())
}

pub async fn mark_all_read(state: &AppState, actor: &User) -> ApiResult<u64> {
    let updated = repo::mark_all_read(&state.db, actor.id).await?;
    Ok(updated)
}

/// Fans a bad-mood alert out to every active HR user.
pub async fn notify_hr_bad_mood(
    state: &AppState,
    employee: &User,
    checkin_id: Uuid,
) -> anyhow::Result<()> {
    let receivers = users_repo::list_active_hr(&state.db).await?;
    let message = format!(
        "Employee {} reported a negative mood. Please follow up.",
        employee.name
    );
    for hr in &receivers {
        repo::insert(&state.db, employee.id, hr.id, &message, Some(checkin_id)).await?;
    }
    info!(
        employee_id = %employee.id,
        receivers = receivers.len(),
        "bad mood alert sent"
    );
    Ok(())
}

/// Removes read notifications past the retention window. Runs daily from a
/// background task.
#[instrument(skip(state))]
pub async fn cleanup_old(state: &AppState) -> anyhow::Result<u64> {
    let cutoff =
        OffsetDateTime::now_utc() - Duration::days(state.config.notification_retention_days);
    let deleted = repo::delete_read_older_than(&state.db, cutoff).await?;
    if deleted > 0 {
        info!(deleted, "old notifications removed");
    }
    Ok(deleted)
}

pub fn spawn_cleanup(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60 * 60 * 24));
        loop {
            interval.tick().await;
            if let Err(err) = cleanup_old(&state).await {
                error!(error = %err, "notification cleanup failed");
            }
        }
    });
}

fn to_responses(rows: Vec<NotificationDetail>) -> Vec<NotificationResponse> {
    let now = OffsetDateTime::now_utc();
    rows.into_iter()
        .map(|d| NotificationResponse::from_detail(d, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use crate::users::repo::Role;

    #[tokio::test]
    async fn employees_cannot_send_notifications() {
        let state = AppState::fake();
        let actor = User {
            id: Uuid::new_v4(),
            name: "Worker".into(),
            email: "worker@example.com".into(),
            password_hash: String::new(),
            role: Role::Employee,
            department: Some("Engineering".into()),
            position: None,
            is_active: true,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };
        let payload = SendNotificationRequest {
            receiver_id: Uuid::new_v4(),
            message: "hello".into(),
            related_checkin_id: None,
        };
        let err = send(&state, &actor, payload, "unknown").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.to_string(), "Only HR/Admin can send notifications");
    }
}
