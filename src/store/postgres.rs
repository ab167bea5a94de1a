use async_trait::async_trait;
use lazy_static::lazy_static;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{AccountStore, StoreError};
use crate::{
    auth::{Authenticatable, BearerTokenOwner},
    schema::{users, USERS, USER_TOKENS},
    tokens::repo_types::UserToken,
    users::repo_types::User,
};

lazy_static! {
    static ref INSERT_USER: String = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        USERS.ident(),
        USERS.column_list(),
        USERS.placeholders()
    );
    static ref SELECT_USER_BY_ID: String = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        USERS.column_list(),
        USERS.ident(),
        users::ID
    );
    static ref SELECT_USER_BY_USERNAME: String = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        USERS.column_list(),
        USERS.ident(),
        User::USERNAME_FIELD
    );
    static ref INSERT_TOKEN: String = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        USER_TOKENS.ident(),
        USER_TOKENS.column_list(),
        USER_TOKENS.placeholders()
    );
    static ref SELECT_TOKEN_BY_VALUE: String = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        USER_TOKENS.column_list(),
        USER_TOKENS.ident(),
        UserToken::TOKEN_VALUE_FIELD
    );
}

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        // bind order follows schema::USERS
        sqlx::query(&INSERT_USER)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.recovery_question1)
            .bind(&user.recovery_answer1)
            .bind(&user.recovery_question2)
            .bind(&user.recovery_answer2)
            .bind(&user.birthday)
            .bind(&user.gender)
            .execute(&self.db)
            .await?;
        debug!(user_id = %user.id, "user row inserted");
        Ok(())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&SELECT_USER_BY_ID)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&SELECT_USER_BY_USERNAME)
            .bind(username)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn insert_token(&self, token: &UserToken) -> Result<(), StoreError> {
        sqlx::query(&INSERT_TOKEN)
            .bind(token.id)
            .bind(&token.value)
            .bind(token.user_id)
            .execute(&self.db)
            .await?;
        debug!(token_id = %token.id, user_id = %token.user_id, "token row inserted");
        Ok(())
    }

    async fn find_token(&self, value: &str) -> Result<Option<UserToken>, StoreError> {
        let token = sqlx::query_as::<_, UserToken>(&SELECT_TOKEN_BY_VALUE)
            .bind(value)
            .fetch_optional(&self.db)
            .await?;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_are_built_from_the_schema() {
        assert!(INSERT_USER.starts_with("INSERT INTO \"users\" (id, username, password_hash"));
        assert!(INSERT_USER.ends_with("$12)"));
        assert_eq!(
            *SELECT_TOKEN_BY_VALUE,
            "SELECT id, value, user_id FROM \"UserTokens\" WHERE value = $1"
        );
        assert!(SELECT_USER_BY_USERNAME.ends_with("WHERE username = $1"));
    }
}
