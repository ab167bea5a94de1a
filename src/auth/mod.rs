use axum::Router;
use uuid::Uuid;

use crate::{
    schema::{user_tokens, users},
    state::AppState,
    tokens::repo_types::UserToken,
    users::repo_types::User,
};

pub mod extractors;
pub mod handlers;
pub mod password;

/// A record that can log in with a username and password.
pub trait Authenticatable {
    const USERNAME_FIELD: &'static str;
    const PASSWORD_HASH_FIELD: &'static str;

    fn password_hash(&self) -> &str;

    /// Errors mean the stored hash is unusable; callers must treat them
    /// exactly like a mismatch.
    fn verify(&self, password: &str) -> anyhow::Result<bool> {
        password::verify_password(password, self.password_hash())
    }
}

/// A stored bearer credential that resolves to its owner.
pub trait BearerTokenOwner {
    const TOKEN_VALUE_FIELD: &'static str;
    const OWNER_FIELD: &'static str;

    fn owner_id(&self) -> Uuid;
    fn is_valid(&self) -> bool;
}

impl Authenticatable for User {
    const USERNAME_FIELD: &'static str = users::USERNAME;
    const PASSWORD_HASH_FIELD: &'static str = users::PASSWORD_HASH;

    fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

impl BearerTokenOwner for UserToken {
    const TOKEN_VALUE_FIELD: &'static str = user_tokens::VALUE;
    const OWNER_FIELD: &'static str = user_tokens::USER_ID;

    fn owner_id(&self) -> Uuid {
        self.user_id
    }

    // no expiry or revocation is modelled
    fn is_valid(&self) -> bool {
        true
    }
}

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
