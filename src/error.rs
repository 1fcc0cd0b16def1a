use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Which unique key a rejected insert collided with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Username,
    Email,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username => f.write_str("username"),
            Self::Email => f.write_str("email"),
        }
    }
}

/// Failures raised by the identity and credential model and its store.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("{0} already exists")]
    DuplicateIdentity(IdentityField),
    #[error("invalid credentials")]
    InvalidCredential,
    #[error("token expired")]
    ExpiredToken,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token is malformed")]
    MalformedToken,

    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("token lifetime is out of range")]
    TokenLifetime,
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Errors returned by HTTP handlers, rendered as a `fail` envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid payload.")]
    InvalidPayload,
    #[error("Sorry. That {0} already exists.")]
    Duplicate(IdentityField),
    #[error("Sorry. That user already exists.")]
    UserExists,
    #[error("User does not exist")]
    UserNotFound,
    #[error("User does not exist.")]
    UnknownLogin,
    #[error("Invalid credentials.")]
    InvalidCredentials,
    #[error("Provide a valid auth token.")]
    MissingToken,
    #[error("Signature expired. Please log in again.")]
    ExpiredToken,
    #[error("Invalid token. Please log in again.")]
    InvalidToken,
    #[error("Something went wrong. Please contact us.")]
    Internal(#[source] IdentityError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidPayload | Self::Duplicate(_) | Self::UserExists => StatusCode::BAD_REQUEST,
            Self::UserNotFound | Self::UnknownLogin => StatusCode::NOT_FOUND,
            Self::InvalidCredentials | Self::ExpiredToken | Self::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::MissingToken => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::DuplicateIdentity(field) => Self::Duplicate(field),
            IdentityError::InvalidCredential => Self::InvalidCredentials,
            IdentityError::ExpiredToken => Self::ExpiredToken,
            IdentityError::InvalidSignature | IdentityError::MalformedToken => Self::InvalidToken,
            other => Self::Internal(other),
        }
    }
}

#[derive(Serialize)]
struct FailBody {
    status: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(ref source) = self {
            error!(error = %source, "internal error");
        }
        let body = FailBody {
            status: "fail",
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
