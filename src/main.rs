mod app;
mod auth;
mod config;
mod db;
mod error;
mod extract;
mod migrations;
mod schema;
mod state;
mod store;
mod tokens;
mod users;

use crate::{config::AppConfig, migrations::Migrator, state::AppState};

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Serve,
    Migrate,
    Revert,
    RevertAll,
    Status,
}

fn parse_command(args: &[String]) -> anyhow::Result<Command> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        [] | ["serve"] => Ok(Command::Serve),
        ["migrate"] => Ok(Command::Migrate),
        ["migrate", "--revert"] => Ok(Command::Revert),
        ["migrate", "--revert-all"] => Ok(Command::RevertAll),
        ["migrate", "--status"] => Ok(Command::Status),
        other => anyhow::bail!(
            "unknown command {:?}; expected `serve` or `migrate [--revert|--revert-all|--status]`",
            other.join(" ")
        ),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "user_accounts=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_command(&args)?;

    let config = AppConfig::from_env()?;
    let db = db::connect(&config).await?;
    let migrator = Migrator::new(db.clone());

    match command {
        Command::Serve => {
            if config.auto_migrate {
                migrator.run().await?;
            }
            let app = app::build_app(AppState::new(db));
            app::serve(app, &config).await?;
        }
        Command::Migrate => {
            let applied = migrator.run().await?;
            tracing::info!(count = applied.len(), "migrations applied");
        }
        Command::Revert => {
            let reverted = migrator.revert_last_batch().await?;
            tracing::info!(count = reverted.len(), "migrations reverted");
        }
        Command::RevertAll => {
            let reverted = migrator.revert_all().await?;
            tracing::info!(count = reverted.len(), "migrations reverted");
        }
        Command::Status => {
            for m in migrator.status().await? {
                tracing::info!(migration = %m.name, batch = m.batch, applied_at = %m.applied_at, "applied");
            }
        }
    }

    Ok(())
}
