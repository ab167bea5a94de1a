//! Persistence seam between the handlers and the relational store.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::{tokens::repo_types::UserToken, users::repo_types::User};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write; carries the constraint name.
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    #[error("foreign key violated: {0}")]
    ForeignKey(String),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error() {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            if db_err.is_unique_violation() {
                return StoreError::Conflict(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::ForeignKey(constraint);
            }
        }
        StoreError::Database(e)
    }
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn insert_token(&self, token: &UserToken) -> Result<(), StoreError>;
    async fn find_token(&self, value: &str) -> Result<Option<UserToken>, StoreError>;
}
