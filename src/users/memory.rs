use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use super::model::{NewUser, User};
use super::repo::UserStore;
use crate::error::{IdentityError, IdentityField};

/// In-process store with the same uniqueness rules as the `users` table.
#[derive(Default)]
pub struct MemoryUserStore {
    rows: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, IdentityError> {
        let mut rows = self.rows.lock().unwrap();
        // Email is checked first, like the constraint order in the migration.
        if rows.iter().any(|u| u.email == user.email) {
            return Err(IdentityError::DuplicateIdentity(IdentityField::Email));
        }
        if rows.iter().any(|u| u.username == user.username) {
            return Err(IdentityError::DuplicateIdentity(IdentityField::Username));
        }
        let created = User {
            id: rows.last().map_or(1, |u| u.id + 1),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            active: user.active,
            created_at: OffsetDateTime::now_utc(),
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, IdentityError> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, IdentityError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, IdentityError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, IdentityError> {
        Ok(self.rows.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser::create(username, email, "greaterthaneight").unwrap()
    }

    #[tokio::test]
    async fn add_user() {
        let store = MemoryUserStore::default();
        let user = store
            .insert(new_user("justatest", "test@test.com"))
            .await
            .unwrap();
        assert!(user.id > 0);
        assert_eq!(user.username, "justatest");
        assert_eq!(user.email, "test@test.com");
        assert!(user.active);
        assert_ne!(user.password_hash, "greaterthaneight");
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = MemoryUserStore::default();
        store.insert(new_user("justatest", "test@test.com")).await.unwrap();
        let err = store
            .insert(new_user("justatest", "test@test2.com"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IdentityError::DuplicateIdentity(IdentityField::Username)
        ));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryUserStore::default();
        store.insert(new_user("justatest", "test@test.com")).await.unwrap();
        let err = store
            .insert(new_user("justanothertest", "test@test.com"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IdentityError::DuplicateIdentity(IdentityField::Email)
        ));
    }

    #[tokio::test]
    async fn duplicate_username_and_email_reports_email() {
        let store = MemoryUserStore::default();
        store.insert(new_user("justatest", "test@test.com")).await.unwrap();
        let err = store
            .insert(new_user("justatest", "test@test.com"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IdentityError::DuplicateIdentity(IdentityField::Email)
        ));
    }

    #[tokio::test]
    async fn same_password_stores_different_hashes() {
        let store = MemoryUserStore::default();
        let one = store.insert(new_user("justatest", "test@test.com")).await.unwrap();
        let two = store.insert(new_user("justatest2", "test@test2.com")).await.unwrap();
        assert_ne!(one.password_hash, two.password_hash);
    }

    #[tokio::test]
    async fn lookups_and_listing() {
        let store = MemoryUserStore::default();
        let ryan = store.insert(new_user("ryan", "ryan@3wisemonkeys.org")).await.unwrap();
        store
            .insert(new_user("nichelle", "nichelle@3wisemonkeys.org"))
            .await
            .unwrap();

        assert_eq!(store.find_by_id(ryan.id).await.unwrap().unwrap().username, "ryan");
        assert!(store.find_by_id(999).await.unwrap().is_none());
        assert!(store.find_by_email("ryan@3wisemonkeys.org").await.unwrap().is_some());
        assert!(store.find_by_username("nichelle").await.unwrap().is_some());

        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, ["ryan", "nichelle"]);
    }
}
