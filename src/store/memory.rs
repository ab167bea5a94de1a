//! In-process store with the same uniqueness and foreign-key rules as the
//! Postgres schema. Test-only.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{AccountStore, StoreError};
use crate::{
    schema::{unique_index_name, user_tokens, users},
    tokens::repo_types::UserToken,
    users::repo_types::User,
};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    tokens: Mutex<Vec<UserToken>>,
}

impl MemoryStore {
    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut rows = self.users.lock().unwrap();
        if rows.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(unique_index_name(users::TABLE, users::USERNAME)));
        }
        if rows.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(unique_index_name(users::TABLE, users::EMAIL)));
        }
        rows.push(user.clone());
        Ok(())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let rows = self.users.lock().unwrap();
        Ok(rows.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let rows = self.users.lock().unwrap();
        Ok(rows.iter().find(|u| u.username == username).cloned())
    }

    async fn insert_token(&self, token: &UserToken) -> Result<(), StoreError> {
        if !self.users.lock().unwrap().iter().any(|u| u.id == token.user_id) {
            return Err(StoreError::ForeignKey(format!(
                "{}_{}_fkey",
                user_tokens::TABLE.to_lowercase(),
                user_tokens::USER_ID
            )));
        }
        let mut rows = self.tokens.lock().unwrap();
        if rows.iter().any(|t| t.value == token.value) {
            return Err(StoreError::Conflict(unique_index_name(
                user_tokens::TABLE,
                user_tokens::VALUE,
            )));
        }
        rows.push(token.clone());
        Ok(())
    }

    async fn find_token(&self, value: &str) -> Result<Option<UserToken>, StoreError> {
        let rows = self.tokens.lock().unwrap();
        Ok(rows.iter().find(|t| t.value == value).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::fixtures::user;

    #[tokio::test]
    async fn duplicate_username_or_email_conflicts_and_keeps_first_row() {
        let store = MemoryStore::default();
        let first = user("ada", "ada@example.com");
        store.insert_user(&first).await.expect("first insert");

        let err = store
            .insert_user(&user("ada", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref c) if c == "users_username_key"));

        let err = store
            .insert_user(&user("bob", "ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref c) if c == "users_email_key"));

        assert_eq!(store.user_count(), 1);
        let kept = store.find_user_by_username("ada").await.unwrap().unwrap();
        assert_eq!(kept.id, first.id);
        assert_eq!(kept.email, "ada@example.com");
    }

    #[tokio::test]
    async fn token_requires_existing_owner() {
        let store = MemoryStore::default();
        let err = store
            .insert_token(&UserToken::new("abc".into(), Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKey(_)));
        assert_eq!(store.token_count(), 0);
    }
}
