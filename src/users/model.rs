use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use tracing::error;

use super::password::{hash_password, verify_password};
use crate::error::IdentityError;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // argon2 PHC string
    pub active: bool,
    pub created_at: OffsetDateTime,
}

/// A user that has not been stored yet. Only the hash of the secret is kept.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub active: bool,
}

impl NewUser {
    /// Builds the record and hashes `password` immediately.
    ///
    /// Length policy on `password` belongs to the caller.
    pub fn create(
        username: impl Into<String>,
        email: impl Into<String>,
        password: &str,
    ) -> Result<Self, IdentityError> {
        Ok(Self {
            username: username.into(),
            email: email.into(),
            password_hash: hash_password(password)?,
            active: true,
        })
    }
}

impl User {
    /// True only when `candidate` is the secret this user was created with.
    pub fn verify_secret(&self, candidate: &str) -> bool {
        match verify_password(candidate, &self.password_hash) {
            Ok(ok) => ok,
            Err(e) => {
                error!(user_id = self.id, error = %e, "stored password hash is unreadable");
                false
            }
        }
    }

    /// Like [`User::verify_secret`], but as a `Result` for `?` chains.
    pub fn check_secret(&self, candidate: &str) -> Result<(), IdentityError> {
        if self.verify_secret(candidate) {
            Ok(())
        } else {
            Err(IdentityError::InvalidCredential)
        }
    }

    pub fn to_public(&self) -> PublicUser {
        PublicUser::from(self)
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub active: bool,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
            active: u.active,
        }
    }
}
