use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::users::dto::RegisterRequest;

/// User record in the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,      // always lowercase
    pub password_hash: String, // Argon2 PHC string, never exposed
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub recovery_question1: String,
    pub recovery_answer1: String,
    pub recovery_question2: String,
    pub recovery_answer2: String,
    pub birthday: String,
    pub gender: Option<String>,
}

impl User {
    /// Builds a new record from an already validated registration.
    pub fn from_registration(req: RegisterRequest, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: req.username.to_lowercase(),
            password_hash,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            recovery_question1: req.recovery_question1,
            recovery_answer1: req.recovery_answer1,
            recovery_question2: req.recovery_question2,
            recovery_answer2: req.recovery_answer2,
            birthday: req.birthday,
            gender: req.gender,
        }
    }

    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            username: self.username.clone(),
        }
    }
}

/// Public part of the user returned to untrusted callers.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}
