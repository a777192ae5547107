use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::audit::dto::{AuditLogResponse, AuditPageQuery, AuditPageResponse, AuditSearchQuery};
use crate::audit::repo::{self, AuditAction};
use crate::error::ApiResult;
use crate::state::AppState;
use crate::users::repo::User;
use crate::users::services::require_admin;

/// Appends an audit entry. Callers propagate failures so a lost entry is
/// never silent.
pub async fn record(
    db: &PgPool,
    actor_id: Uuid,
    action: AuditAction,
    target_user_id: Option<Uuid>,
    details: Option<String>,
    ip_address: &str,
) -> anyhow::Result<()> {
    repo::insert(
        db,
        actor_id,
        action,
        target_user_id,
        details.as_deref(),
        ip_address,
    )
    .await
}

pub async fn list(
    state: &AppState,
    actor: &User,
    query: AuditPageQuery,
    ip: &str,
) -> ApiResult<AuditPageResponse> {
    require_admin(actor)?;
    let page = query.page.max(0);
    let size = query.size.clamp(1, 100);
    let rows = repo::page(&state.db, size, page * size).await?;
    let total = repo::count_all(&state.db).await?;
    record(
        &state.db,
        actor.id,
        AuditAction::ViewAuditLog,
        None,
        None,
        ip,
    )
    .await?;
    let now = OffsetDateTime::now_utc();
    Ok(AuditPageResponse {
        logs: rows
            .into_iter()
            .map(|e| AuditLogResponse::from_entry(e, now))
            .collect(),
        page,
        size,
        total,
    })
}

pub async fn search(
    state: &AppState,
    actor: &User,
    query: AuditSearchQuery,
) -> ApiResult<AuditPageResponse> {
    require_admin(actor)?;
    let page = query.page.max(0);
    let size = query.size.clamp(1, 100);
    let keyword = query
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty());
    let rows = repo::search(
        &state.db,
        query.role,
        query.action,
        keyword,
        size,
        page * size,
    )
    .await?;
    let total = repo::count_search(&state.db, query.role, query.action, keyword).await?;
    let now = OffsetDateTime::now_utc();
    Ok(AuditPageResponse {
        logs: rows
            .into_iter()
            .map(|e| AuditLogResponse::from_entry(e, now))
            .collect(),
        page,
        size,
        total,
    })
}

pub async fn critical(state: &AppState, actor: &User) -> ApiResult<Vec<AuditLogResponse>> {
    require_admin(actor)?;
    let rows = repo::critical(&state.db).await?;
    let now = OffsetDateTime::now_utc();
    Ok(rows
        .into_iter()
        .map(|e| AuditLogResponse::from_entry(e, now))
        .collect())
}
