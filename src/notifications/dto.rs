use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::checkins::services::BAD_MOOD_LEVEL;
use crate::notifications::repo::NotificationDetail;
use crate::timeago::time_ago;
use crate::users::repo::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotificationType {
    Alert,
    Message,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Normal,
}

/// Bad-mood alerts outrank everything; otherwise HR mail is a message and the
/// rest is system noise.
pub(crate) fn derive_kind(sender_role: Role, related_level: Option<i32>) -> (NotificationType, Priority) {
    if related_level == Some(BAD_MOOD_LEVEL) {
        (NotificationType::Alert, Priority::High)
    } else if sender_role.is_hr_or_admin() {
        (NotificationType::Message, Priority::Normal)
    } else {
        (NotificationType::System, Priority::Normal)
    }
}

#[derive(Debug, Deserialize)]
pub struct SendNotificationRequest {
    pub receiver_id: Uuid,
    pub message: String,
    pub related_checkin_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    pub sender_name: String,
    pub sender_role: Role,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub priority: Priority,
    pub is_read: bool,
    pub related_checkin_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub time_ago: String,
}

impl NotificationResponse {
    pub fn from_detail(detail: NotificationDetail, now: OffsetDateTime) -> Self {
        let (notification_type, priority) = derive_kind(detail.sender_role, detail.related_level);
        Self {
            id: detail.id,
            sender_name: detail.sender_name,
            sender_role: detail.sender_role,
            message: detail.message,
            notification_type,
            priority,
            is_read: detail.is_read,
            related_checkin_id: detail.related_checkin_id,
            created_at: detail.created_at,
            time_ago: time_ago(detail.created_at, now),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnreadCountData {
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_mood_checkin_is_high_priority_alert() {
        let (kind, priority) = derive_kind(Role::Employee, Some(1));
        assert_eq!(kind, NotificationType::Alert);
        assert_eq!(priority, Priority::High);
    }

    #[test]
    fn hr_mail_without_bad_checkin_is_a_message() {
        let (kind, priority) = derive_kind(Role::Hr, None);
        assert_eq!(kind, NotificationType::Message);
        assert_eq!(priority, Priority::Normal);
        let (kind, _) = derive_kind(Role::Superadmin, Some(3));
        assert_eq!(kind, NotificationType::Message);
    }

    #[test]
    fn everything_else_is_system() {
        let (kind, priority) = derive_kind(Role::Employee, Some(2));
        assert_eq!(kind, NotificationType::System);
        assert_eq!(priority, Priority::Normal);
    }
}
