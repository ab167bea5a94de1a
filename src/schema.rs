//! Table definitions shared by the migrations and the query layer.
//!
//! Both the DDL emitted by [`crate::migrations`] and the SQL issued by
//! [`crate::store::postgres`] are derived from the constants below, so a
//! column rename only has to happen here.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Uuid,
    Text,
}

impl ColumnType {
    fn sql(self) -> &'static str {
        match self {
            ColumnType::Uuid => "UUID",
            ColumnType::Text => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub required: bool,
    pub primary_key: bool,
    /// `(table, column)` this column points at.
    pub references: Option<(&'static str, &'static str)>,
}

impl Column {
    const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            required: false,
            primary_key: false,
            references: None,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    const fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.references = Some((table, column));
        self
    }

    fn definition(&self) -> String {
        let mut def = format!("{} {}", self.name, self.ty.sql());
        if self.primary_key {
            def.push_str(" PRIMARY KEY");
        } else if self.required {
            def.push_str(" NOT NULL");
        }
        if let Some((table, column)) = self.references {
            def.push_str(&format!(" REFERENCES {} ({})", quote_ident(table), column));
        }
        def
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    /// Columns that get a unique constraint as part of `CREATE TABLE`.
    pub unique: &'static [&'static str],
}

impl Table {
    /// Quoted table name, safe for mixed-case names like `UserTokens`.
    pub fn ident(&self) -> String {
        quote_ident(self.name)
    }

    pub fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `$1, $2, ...` matching [`Table::column_list`].
    pub fn placeholders(&self) -> String {
        (1..=self.columns.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn create_sql(&self) -> String {
        let mut parts: Vec<String> = self.columns.iter().map(Column::definition).collect();
        for column in self.unique {
            parts.push(format!(
                "CONSTRAINT {} UNIQUE ({})",
                quote_ident(&unique_index_name(self.name, column)),
                column
            ));
        }
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.ident(),
            parts.join(", ")
        )
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.ident())
    }

    pub fn create_unique_index_sql(&self, column: &str) -> String {
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {} ({})",
            quote_ident(&unique_index_name(self.name, column)),
            self.ident(),
            column
        )
    }

    pub fn drop_unique_index_sql(&self, column: &str) -> String {
        format!(
            "DROP INDEX IF EXISTS {}",
            quote_ident(&unique_index_name(self.name, column))
        )
    }
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Postgres-style `<table>_<column>_key`.
pub fn unique_index_name(table: &str, column: &str) -> String {
    format!("{}_{}_key", table.to_lowercase(), column)
}

pub mod users {
    pub const TABLE: &str = "users";
    pub const ID: &str = "id";
    pub const USERNAME: &str = "username";
    pub const PASSWORD_HASH: &str = "password_hash";
    pub const EMAIL: &str = "email";
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";
    pub const RECOVERY_QUESTION1: &str = "recovery_question1";
    pub const RECOVERY_ANSWER1: &str = "recovery_answer1";
    pub const RECOVERY_QUESTION2: &str = "recovery_question2";
    pub const RECOVERY_ANSWER2: &str = "recovery_answer2";
    pub const BIRTHDAY: &str = "birthday";
    pub const GENDER: &str = "gender";
}

pub mod user_tokens {
    pub const TABLE: &str = "UserTokens";
    pub const ID: &str = "id";
    pub const VALUE: &str = "value";
    pub const USER_ID: &str = "user_id";
}

pub const USERS: Table = Table {
    name: users::TABLE,
    columns: &[
        Column::new(users::ID, ColumnType::Uuid).primary_key(),
        Column::new(users::USERNAME, ColumnType::Text).required(),
        Column::new(users::PASSWORD_HASH, ColumnType::Text).required(),
        Column::new(users::EMAIL, ColumnType::Text).required(),
        Column::new(users::FIRST_NAME, ColumnType::Text).required(),
        Column::new(users::LAST_NAME, ColumnType::Text).required(),
        Column::new(users::RECOVERY_QUESTION1, ColumnType::Text).required(),
        Column::new(users::RECOVERY_ANSWER1, ColumnType::Text).required(),
        Column::new(users::RECOVERY_QUESTION2, ColumnType::Text).required(),
        Column::new(users::RECOVERY_ANSWER2, ColumnType::Text).required(),
        Column::new(users::BIRTHDAY, ColumnType::Text).required(),
        Column::new(users::GENDER, ColumnType::Text),
    ],
    unique: &[],
};

pub const USER_TOKENS: Table = Table {
    name: user_tokens::TABLE,
    columns: &[
        Column::new(user_tokens::ID, ColumnType::Uuid).primary_key(),
        Column::new(user_tokens::VALUE, ColumnType::Text).required(),
        Column::new(user_tokens::USER_ID, ColumnType::Uuid)
            .required()
            .references(users::TABLE, users::ID),
    ],
    unique: &[user_tokens::VALUE],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn users_create_sql_lists_every_column_in_order() {
        let sql = USERS.create_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"users\" (id UUID PRIMARY KEY, "));
        assert!(sql.contains("username TEXT NOT NULL"));
        assert!(sql.contains("birthday TEXT NOT NULL"));
        // gender is the only optional column
        assert!(sql.ends_with("gender TEXT)"));
        assert!(!sql.contains("UNIQUE"));
    }

    #[test]
    fn user_tokens_create_sql_has_fk_and_unique_value() {
        let sql = USER_TOKENS.create_sql();
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS \"UserTokens\""));
        assert!(sql.contains("user_id UUID NOT NULL REFERENCES \"users\" (id)"));
        assert!(sql.contains("CONSTRAINT \"usertokens_value_key\" UNIQUE (value)"));
    }

    #[test]
    fn placeholders_match_column_count() {
        assert_eq!(USER_TOKENS.placeholders(), "$1, $2, $3");
        assert_eq!(USER_TOKENS.column_list(), "id, value, user_id");
        assert_eq!(USERS.placeholders().split(", ").count(), USERS.columns.len());
    }

    #[test]
    fn unique_index_statements_are_idempotent() {
        assert_eq!(
            USERS.create_unique_index_sql(users::EMAIL),
            "CREATE UNIQUE INDEX IF NOT EXISTS \"users_email_key\" ON \"users\" (email)"
        );
        assert_eq!(
            USERS.drop_unique_index_sql(users::EMAIL),
            "DROP INDEX IF EXISTS \"users_email_key\""
        );
        assert_eq!(USERS.drop_sql(), "DROP TABLE IF EXISTS \"users\"");
    }

    #[test]
    fn quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
