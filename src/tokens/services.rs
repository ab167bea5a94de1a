use base64ct::{Base64, Encoding};
use rand::{rngs::OsRng, RngCore};
use tracing::{debug, warn};

use super::repo_types::UserToken;
use crate::{
    error::AppError,
    store::{AccountStore, StoreError},
    users::repo_types::User,
};

pub const TOKEN_BYTES: usize = 16;
const MAX_ISSUE_ATTEMPTS: usize = 3;

/// Base64 (standard, padded) of [`TOKEN_BYTES`] bytes from the OS RNG.
pub fn generate_value() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    Base64::encode_string(&bytes)
}

impl User {
    pub fn generate_token(&self) -> UserToken {
        UserToken::new(generate_value(), self.id)
    }
}

/// Stores a fresh token for `user`, drawing a new value if the store reports
/// a collision on the unique token column.
pub async fn issue_token(store: &dyn AccountStore, user: &User) -> Result<UserToken, AppError> {
    for attempt in 1..=MAX_ISSUE_ATTEMPTS {
        let token = user.generate_token();
        match store.insert_token(&token).await {
            Ok(()) => {
                debug!(user_id = %user.id, token_id = %token.id, attempt, "token issued");
                return Ok(token);
            }
            Err(StoreError::Conflict(constraint)) => {
                warn!(user_id = %user.id, attempt, %constraint, "token value collision");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(AppError::Conflict)
}
