use super::Migration;
use crate::schema::USER_TOKENS;

/// Creates `UserTokens` with its foreign key to `users` and unique `value`.
pub struct CreateUserTokens;

impl Migration for CreateUserTokens {
    fn name(&self) -> &'static str {
        "CreateUserTokens"
    }

    fn prepare(&self) -> Vec<String> {
        vec![USER_TOKENS.create_sql()]
    }

    fn revert(&self) -> Vec<String> {
        vec![USER_TOKENS.drop_sql()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_and_drops_user_tokens() {
        let up = CreateUserTokens.prepare();
        assert!(up[0].contains("REFERENCES \"users\" (id)"));
        assert!(up[0].contains("UNIQUE (value)"));
        assert_eq!(
            CreateUserTokens.revert(),
            vec!["DROP TABLE IF EXISTS \"UserTokens\"".to_string()]
        );
    }
}
