use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use super::model::{NewUser, User};
use crate::error::{IdentityError, IdentityField};

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Persistence for users. Uniqueness of username and email is the store's job.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `DuplicateIdentity` when either unique key is taken.
    async fn insert(&self, user: NewUser) -> Result<User, IdentityError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, IdentityError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, IdentityError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, IdentityError>;
    /// All users, oldest first.
    async fn list(&self) -> Result<Vec<User>, IdentityError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn map_insert_error(e: sqlx::Error) -> IdentityError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some(USERNAME_CONSTRAINT) => IdentityField::Username,
                Some(EMAIL_CONSTRAINT) => IdentityField::Email,
                // Unknown constraint name; email is the key callers report on.
                _ => IdentityField::Email,
            };
            return IdentityError::DuplicateIdentity(field);
        }
    }
    IdentityError::Database(e)
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, IdentityError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, active, created_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.active)
        .fetch_one(&self.db)
        .await
        .map_err(map_insert_error)?;
        debug!(user_id = created.id, "user row inserted");
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, IdentityError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, IdentityError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, active, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, IdentityError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, active, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, IdentityError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, active, created_at
            FROM users
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
