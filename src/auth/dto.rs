use serde::{Deserialize, Serialize};

use crate::users::dto::UserResponse;

/// Request body for self-registration. New accounts are always employees.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub position: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload returned on successful login.
#[derive(Debug, Serialize)]
pub struct LoginData {
    pub token: String,
    pub user: UserResponse,
}
