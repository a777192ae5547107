use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "audit_action", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Login,
    Logout,
    Register,
    LoginFailed,
    CheckIn,
    ViewDashboard,
    ViewEmployeeInsight,
    AssignDepartment,
    SendNotification,
    AddUser,
    EditUser,
    DeactivateUser,
    ActivateUser,
    ViewAuditLog,
    PasswordChange,
    ProfileUpdate,
}

impl AuditAction {
    pub fn description(self) -> &'static str {
        match self {
            Self::Login => "User logged in",
            Self::Logout => "User logged out",
            Self::Register => "New user registered",
            Self::LoginFailed => "Failed login attempt",
            Self::CheckIn => "Employee checked in",
            Self::ViewDashboard => "Viewed dashboard",
            Self::ViewEmployeeInsight => "Viewed employee insight",
            Self::AssignDepartment => "Assigned department",
            Self::SendNotification => "Sent notification",
            Self::AddUser => "Added new user",
            Self::EditUser => "Edited user",
            Self::DeactivateUser => "Deactivated user",
            Self::ActivateUser => "Activated user",
            Self::ViewAuditLog => "Viewed audit log",
            Self::PasswordChange => "Changed password",
            Self::ProfileUpdate => "Updated profile",
        }
    }

    pub fn is_critical(self) -> bool {
        matches!(
            self,
            Self::AddUser | Self::DeactivateUser | Self::AssignDepartment | Self::PasswordChange
        )
    }

    pub fn is_auth_action(self) -> bool {
        matches!(
            self,
            Self::Login | Self::Logout | Self::Register | Self::LoginFailed
        )
    }
}

/// Audit row joined with actor and target user data.
#[derive(Debug, Clone, FromRow)]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub actor_name: String,
    pub actor_role: Role,
    pub action: AuditAction,
    pub target_user_id: Option<Uuid>,
    pub target_name: Option<String>,
    pub target_role: Option<Role>,
    pub details: Option<String>,
    pub ip_address: String,
    pub created_at: OffsetDateTime,
}

const ENTRY_SELECT: &str = r#"
SELECT a.id, a.actor_id, u.name AS actor_name, u.role AS actor_role,
       a.action, a.target_user_id, t.name AS target_name, t.role AS target_role,
       a.details, a.ip_address, a.created_at
FROM audit_logs a
JOIN users u ON u.id = a.actor_id
LEFT JOIN users t ON t.id = a.target_user_id
"#;

pub async fn insert(
    db: &PgPool,
    actor_id: Uuid,
    action: AuditAction,
    target_user_id: Option<Uuid>,
    details: Option<&str>,
    ip_address: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (actor_id, action, target_user_id, details, ip_address)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(actor_id)
    .bind(action)
    .bind(target_user_id)
    .bind(details)
    .bind(ip_address)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn page(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<AuditEntry>> {
    let rows = sqlx::query_as::<_, AuditEntry>(&format!(
        "{ENTRY_SELECT} ORDER BY a.created_at DESC LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn count_all(db: &PgPool) -> anyhow::Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM audit_logs")
        .fetch_one(db)
        .await?;
    Ok(count)
}

const SEARCH_FILTER: &str = r#"
WHERE ($1::user_role IS NULL OR u.role = $1)
  AND ($2::audit_action IS NULL OR a.action = $2)
  AND ($3::text IS NULL OR u.name ILIKE '%' || $3 || '%')
"#;

pub async fn search(
    db: &PgPool,
    role: Option<Role>,
    action: Option<AuditAction>,
    keyword: Option<&str>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<AuditEntry>> {
    let rows = sqlx::query_as::<_, AuditEntry>(&format!(
        "{ENTRY_SELECT} {SEARCH_FILTER} ORDER BY a.created_at DESC LIMIT $4 OFFSET $5"
    ))
    .bind(role)
    .bind(action)
    .bind(keyword)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn count_search(
    db: &PgPool,
    role: Option<Role>,
    action: Option<AuditAction>,
    keyword: Option<&str>,
) -> anyhow::Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(&format!(
        r#"
        SELECT COUNT(*)
        FROM audit_logs a
        JOIN users u ON u.id = a.actor_id
        {SEARCH_FILTER}
        "#
    ))
    .bind(role)
    .bind(action)
    .bind(keyword)
    .fetch_one(db)
    .await?;
    Ok(count)
}

pub async fn critical(db: &PgPool) -> anyhow::Result<Vec<AuditEntry>> {
    let rows = sqlx::query_as::<_, AuditEntry>(&format!(
        r#"
        {ENTRY_SELECT}
        WHERE a.action IN ('ADD_USER', 'DEACTIVATE_USER', 'ASSIGN_DEPARTMENT', 'PASSWORD_CHANGE')
        ORDER BY a.created_at DESC
        "#
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_serializes_screaming_snake() {
        let json = serde_json::to_value(AuditAction::LoginFailed).unwrap();
        assert_eq!(json, "LOGIN_FAILED");
        let json = serde_json::to_value(AuditAction::ViewEmployeeInsight).unwrap();
        assert_eq!(json, "VIEW_EMPLOYEE_INSIGHT");
    }

    #[test]
    fn critical_set() {
        assert!(AuditAction::AddUser.is_critical());
        assert!(AuditAction::DeactivateUser.is_critical());
        assert!(AuditAction::AssignDepartment.is_critical());
        assert!(AuditAction::PasswordChange.is_critical());
        assert!(!AuditAction::Login.is_critical());
        assert!(!AuditAction::CheckIn.is_critical());
    }

    #[test]
    fn auth_action_set() {
        assert!(AuditAction::Login.is_auth_action());
        assert!(AuditAction::Logout.is_auth_action());
        assert!(AuditAction::Register.is_auth_action());
        assert!(AuditAction::LoginFailed.is_auth_action());
        assert!(!AuditAction::ViewAuditLog.is_auth_action());
    }
}
