use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::users::repo_types::PublicUser;

/// Bearer token record in the `UserTokens` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserToken {
    pub id: Uuid,
    pub value: String, // base64 of 16 random bytes
    pub user_id: Uuid,
}

impl UserToken {
    pub fn new(value: String, user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            value,
            user_id,
        }
    }
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub id: Uuid,
    pub value: String,
    pub user: PublicUser,
}
