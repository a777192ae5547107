use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    audit::repo::AuditAction,
    audit::services::record,
    auth::{
        dto::{LoginData, LoginRequest, RegisterRequest},
        extractors::{ClientIp, CurrentUser},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::{ApiError, ApiResult},
    response::ApiResponse,
    state::AppState,
    users::{
        dto::UserResponse,
        repo::{self, NewUser, Role},
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(mut payload): Json<RegisterRequest>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    payload.email = payload.email.trim().to_lowercase();
    let name = payload.name.trim();

    if name.is_empty() {
        return Err(ApiError::bad_request("Name is required"));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::bad_request("Invalid email"));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::bad_request("Password too short"));
    }
    if payload.password != payload.confirm_password {
        return Err(ApiError::bad_request("Passwords do not match"));
    }
    if repo::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::conflict("Email already registered"));
    }

    let hash = hash_password(&payload.password)?;
    let user = repo::insert(
        &state.db,
        NewUser {
            name,
            email: &payload.email,
            password_hash: &hash,
            role: Role::Employee,
            department: None,
            position: payload.position.as_deref(),
        },
    )
    .await?;

    record(&state.db, user.id, AuditAction::Register, None, None, &ip).await?;
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(ApiResponse::success(
        "Registration successful",
        UserResponse::from(user),
    )))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginData>>> {
    payload.email = payload.email.trim().to_lowercase();

    let user = match repo::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::unauthorized("Invalid email or password"));
        }
    };

    if !user.is_active {
        record(
            &state.db,
            user.id,
            AuditAction::LoginFailed,
            None,
            Some("Account deactivated".into()),
            &ip,
        )
        .await?;
        warn!(user_id = %user.id, "login on deactivated account");
        return Err(ApiError::unauthorized(
            "Account has been deactivated. Please contact admin.",
        ));
    }

    if !verify_password(&payload.password, &user.password_hash)? {
        record(
            &state.db,
            user.id,
            AuditAction::LoginFailed,
            None,
            Some("Invalid password".into()),
            &ip,
        )
        .await?;
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    record(&state.db, user.id, AuditAction::Login, None, None, &ip).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(ApiResponse::success(
        "Login successful",
        LoginData {
            token,
            user: UserResponse::from(user),
        },
    )))
}

#[instrument(skip(state, actor))]
async fn logout(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    ClientIp(ip): ClientIp,
) -> ApiResult<Json<ApiResponse<()>>> {
    record(&state.db, actor.id, AuditAction::Logout, None, None, &ip).await?;
    info!(user_id = %actor.id, "user logged out");
    Ok(Json(ApiResponse::message("Logout successful")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("somchai@company.co.th"));
        assert!(is_valid_email("hr.team@example.com"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }
}
