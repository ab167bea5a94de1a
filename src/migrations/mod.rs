//! Ordered, reversible schema migrations.
//!
//! Each migration is a list of DDL statements generated from
//! [`crate::schema`]. The [`Migrator`] records applied migrations in
//! `_schema_migrations`, grouped in batches so `revert` undoes exactly the
//! last `run`. A batch is applied in a single transaction under an advisory
//! lock: it lands completely or not at all, and concurrent runners wait.

use std::collections::HashSet;

use anyhow::Context;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use tracing::{debug, info, instrument};

mod tokens;
mod users;

pub use tokens::CreateUserTokens;
pub use users::{CreateUsers, MakeUsernameAndEmailUnique};

const HISTORY_TABLE: &str = "_schema_migrations";
/// `pg_advisory_xact_lock` key shared by every migrator of this schema.
const LOCK_KEY: i64 = 0x7573_6572_5f61_6363;

#[derive(Debug, Clone, Copy)]
enum RevertScope {
    LastBatch,
    All,
}

pub trait Migration: Send + Sync {
    fn name(&self) -> &'static str;
    fn prepare(&self) -> Vec<String>;
    fn revert(&self) -> Vec<String>;
}

/// Every migration, in the order it must be applied.
pub fn all() -> Vec<Box<dyn Migration>> {
    vec![
        Box::new(CreateUsers),
        Box::new(MakeUsernameAndEmailUnique),
        Box::new(CreateUserTokens),
    ]
}

#[derive(Debug, Clone, FromRow)]
pub struct AppliedMigration {
    pub name: String,
    pub batch: i32,
    pub applied_at: OffsetDateTime,
}

fn pending<'a>(
    migrations: &'a [Box<dyn Migration>],
    applied: &[AppliedMigration],
) -> Vec<&'a dyn Migration> {
    let done: HashSet<&str> = applied.iter().map(|m| m.name.as_str()).collect();
    migrations
        .iter()
        .map(|m| m.as_ref())
        .filter(|m| !done.contains(m.name()))
        .collect()
}

/// Applied migrations to undo, newest first. `batch = None` selects all.
fn to_revert<'a>(
    migrations: &'a [Box<dyn Migration>],
    applied: &[AppliedMigration],
    batch: Option<i32>,
) -> anyhow::Result<Vec<&'a dyn Migration>> {
    let selected: HashSet<&str> = applied
        .iter()
        .filter(|m| batch.map_or(true, |b| m.batch == b))
        .map(|m| m.name.as_str())
        .collect();

    if let Some(unknown) = selected
        .iter()
        .find(|name| !migrations.iter().any(|m| m.name() == **name))
    {
        anyhow::bail!("applied migration {unknown} is not known to this build");
    }

    Ok(migrations
        .iter()
        .rev()
        .map(|m| m.as_ref())
        .filter(|m| selected.contains(m.name()))
        .collect())
}

pub struct Migrator {
    db: PgPool,
    migrations: Vec<Box<dyn Migration>>,
}

impl Migrator {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            migrations: all(),
        }
    }

    /// Opens the transaction every operation runs in. The advisory lock is
    /// held until the transaction ends, so concurrent runners queue up.
    async fn begin_locked(&self) -> anyhow::Result<Transaction<'static, Postgres>> {
        let mut tx = self.db.begin().await.context("begin tx")?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(LOCK_KEY)
            .execute(&mut *tx)
            .await
            .context("take migration lock")?;

        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {HISTORY_TABLE} (
                name TEXT PRIMARY KEY,
                batch INTEGER NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"
        );
        sqlx::query(&sql)
            .execute(&mut *tx)
            .await
            .context("create migration history table")?;
        Ok(tx)
    }

    async fn history(conn: &mut PgConnection) -> anyhow::Result<Vec<AppliedMigration>> {
        let sql = format!(
            "SELECT name, batch, applied_at FROM {HISTORY_TABLE} ORDER BY batch, applied_at"
        );
        let rows = sqlx::query_as::<_, AppliedMigration>(&sql)
            .fetch_all(conn)
            .await
            .context("read migration history")?;
        Ok(rows)
    }

    pub async fn status(&self) -> anyhow::Result<Vec<AppliedMigration>> {
        let mut tx = self.begin_locked().await?;
        let rows = Self::history(&mut tx).await?;
        tx.commit().await.context("commit tx")?;
        Ok(rows)
    }

    /// Applies every pending migration as one new batch, all or nothing.
    #[instrument(skip(self))]
    pub async fn run(&self) -> anyhow::Result<Vec<&'static str>> {
        let mut tx = self.begin_locked().await?;
        let applied = Self::history(&mut tx).await?;
        let todo = pending(&self.migrations, &applied);
        if todo.is_empty() {
            tx.commit().await.context("commit tx")?;
            info!("schema is up to date");
            return Ok(Vec::new());
        }

        let batch = applied.iter().map(|m| m.batch).max().unwrap_or(0) + 1;
        let insert = format!("INSERT INTO {HISTORY_TABLE} (name, batch) VALUES ($1, $2)");
        let mut names = Vec::with_capacity(todo.len());

        for migration in todo {
            for stmt in migration.prepare() {
                sqlx::query(&stmt)
                    .execute(&mut *tx)
                    .await
                    .with_context(|| format!("prepare {}: {stmt}", migration.name()))?;
            }
            sqlx::query(&insert)
                .bind(migration.name())
                .bind(batch)
                .execute(&mut *tx)
                .await
                .context("record migration")?;
            debug!(migration = migration.name(), batch, "migration prepared");
            names.push(migration.name());
        }
        tx.commit().await.context("commit tx")?;

        info!(batch, count = names.len(), "migrations applied");
        Ok(names)
    }

    /// Reverts the migrations applied by the most recent `run`.
    pub async fn revert_last_batch(&self) -> anyhow::Result<Vec<&'static str>> {
        self.revert(RevertScope::LastBatch).await
    }

    pub async fn revert_all(&self) -> anyhow::Result<Vec<&'static str>> {
        self.revert(RevertScope::All).await
    }

    #[instrument(skip(self))]
    async fn revert(&self, scope: RevertScope) -> anyhow::Result<Vec<&'static str>> {
        let mut tx = self.begin_locked().await?;
        let applied = Self::history(&mut tx).await?;
        let batch = match scope {
            RevertScope::All => None,
            RevertScope::LastBatch => match applied.iter().map(|m| m.batch).max() {
                Some(batch) => Some(batch),
                None => {
                    tx.commit().await.context("commit tx")?;
                    info!("nothing to revert");
                    return Ok(Vec::new());
                }
            },
        };

        let delete = format!("DELETE FROM {HISTORY_TABLE} WHERE name = $1");
        let mut names = Vec::new();

        for migration in to_revert(&self.migrations, &applied, batch)? {
            for stmt in migration.revert() {
                sqlx::query(&stmt)
                    .execute(&mut *tx)
                    .await
                    .with_context(|| format!("revert {}: {stmt}", migration.name()))?;
            }
            sqlx::query(&delete)
                .bind(migration.name())
                .execute(&mut *tx)
                .await
                .context("forget migration")?;
            debug!(migration = migration.name(), "migration reverted");
            names.push(migration.name());
        }
        tx.commit().await.context("commit tx")?;

        info!(count = names.len(), "migrations reverted");
        Ok(names)
    }
}
