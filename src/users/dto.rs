use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::model::PublicUser;
use crate::error::ApiError;

pub const MIN_PASSWORD_LEN: usize = 8;
/// Column width of `users.username` and `users.email`.
pub const MAX_FIELD_LEN: usize = 128;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Request body for creating a user, shared by `POST /users` and registration.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl CreateUserRequest {
    /// Trims fields, lowercases the email and applies the password policy.
    pub fn validate(mut self) -> Result<Self, ApiError> {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_lowercase();

        if self.username.is_empty() || !is_valid_email(&self.email) {
            return Err(ApiError::InvalidPayload);
        }
        if self.username.chars().count() > MAX_FIELD_LEN
            || self.email.chars().count() > MAX_FIELD_LEN
        {
            return Err(ApiError::InvalidPayload);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ApiError::InvalidPayload);
        }
        Ok(self)
    }
}

#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<PublicUser>,
}
