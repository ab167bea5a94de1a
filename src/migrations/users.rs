use super::Migration;
use crate::schema::{users, USERS};

/// Creates `users`; skipped if the table already exists.
pub struct CreateUsers;

impl Migration for CreateUsers {
    fn name(&self) -> &'static str {
        "CreateUsers"
    }

    fn prepare(&self) -> Vec<String> {
        vec![USERS.create_sql()]
    }

    fn revert(&self) -> Vec<String> {
        vec![USERS.drop_sql()]
    }
}

pub struct MakeUsernameAndEmailUnique;

impl Migration for MakeUsernameAndEmailUnique {
    fn name(&self) -> &'static str {
        "MakeUsernameAndEmailUnique"
    }

    fn prepare(&self) -> Vec<String> {
        vec![
            USERS.create_unique_index_sql(users::USERNAME),
            USERS.create_unique_index_sql(users::EMAIL),
        ]
    }

    fn revert(&self) -> Vec<String> {
        vec![
            USERS.drop_unique_index_sql(users::USERNAME),
            USERS.drop_unique_index_sql(users::EMAIL),
        ]
    }
}
