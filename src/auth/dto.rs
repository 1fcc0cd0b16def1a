use serde::{Deserialize, Serialize};

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after register or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub auth_token: String,
}

impl AuthResponse {
    pub fn new(message: &'static str, auth_token: String) -> Self {
        Self {
            status: "success",
            message,
            auth_token,
        }
    }
}
