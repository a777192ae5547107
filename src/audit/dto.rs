use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::audit::repo::{AuditAction, AuditEntry};
use crate::timeago::time_ago;
use crate::users::repo::Role;

#[derive(Debug, Deserialize)]
pub struct AuditPageQuery {
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

#[derive(Debug, Deserialize)]
pub struct AuditSearchQuery {
    pub role: Option<Role>,
    pub action: Option<AuditAction>,
    pub keyword: Option<String>,
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

fn default_size() -> i64 {
    20
}

#[derive(Debug, Serialize)]
pub struct AuditLogResponse {
    pub id: Uuid,
    pub actor_name: String,
    pub actor_role: Role,
    pub action: AuditAction,
    pub action_description: String,
    pub target_name: Option<String>,
    pub target_role: Option<Role>,
    pub details: Option<String>,
    pub ip_address: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub time_ago: String,
    pub is_critical: bool,
    pub is_auth_action: bool,
}

impl AuditLogResponse {
    pub fn from_entry(entry: AuditEntry, now: OffsetDateTime) -> Self {
        Self {
            id: entry.id,
            actor_name: entry.actor_name,
            actor_role: entry.actor_role,
            action: entry.action,
            action_description: entry.action.description().to_string(),
            target_name: entry.target_name,
            target_role: entry.target_role,
            details: entry.details,
            ip_address: entry.ip_address,
            created_at: entry.created_at,
            time_ago: time_ago(entry.created_at, now),
            is_critical: entry.action.is_critical(),
            is_auth_action: entry.action.is_auth_action(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuditPageResponse {
    pub logs: Vec<AuditLogResponse>,
    pub page: i64,
    pub size: i64,
    pub total: i64,
}
