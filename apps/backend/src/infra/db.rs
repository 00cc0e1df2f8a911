use std::time::Duration;

use migration::{count_applied_migrations, migrate, MigrationCommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::config::db::{make_conn_spec, DbKind, DbOwner, RuntimeEnv};
use crate::error::AppError;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_INTERVAL: Duration = Duration::from_millis(500);

fn options(kind: DbKind, url: String) -> ConnectOptions {
    let mut opts = ConnectOptions::new(url);
    opts.sqlx_logging(false)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5));

    match kind {
        // Every pooled connection would get its own empty database
        DbKind::SqliteMemory => {
            opts.max_connections(1).min_connections(1);
        }
        DbKind::SqliteFile => {
            opts.max_connections(4);
        }
        DbKind::Postgres => {
            opts.max_connections(16).min_connections(1);
        }
    }
    opts
}

/// Connect without running migrations. Postgres is retried a few times
/// with a fixed interval so the server can start alongside the database.
pub async fn connect_db(
    env: RuntimeEnv,
    kind: DbKind,
    owner: DbOwner,
) -> Result<DatabaseConnection, AppError> {
    let url = make_conn_spec(env, kind, owner)?;
    let attempts = if kind == DbKind::Postgres {
        CONNECT_ATTEMPTS
    } else {
        1
    };

    let mut last_err = None;
    for attempt in 1..=attempts {
        match Database::connect(options(kind, url.clone())).await {
            Ok(conn) => {
                if attempt > 1 {
                    info!(attempt, "connection_retry=success");
                }
                return Ok(conn);
            }
            Err(e) => {
                if attempt < attempts {
                    warn!(attempt, max_attempts = attempts, error = %e, "connection_retry=failed");
                    tokio::time::sleep(CONNECT_RETRY_INTERVAL).await;
                }
                last_err = Some(e);
            }
        }
    }

    Err(last_err.map(AppError::from).unwrap_or_else(AppError::db_unavailable))
}

/// Connect and bring the schema up to date.
///
/// Postgres migrates through a short-lived owner connection and then
/// serves through the app role; SQLite uses one connection for both.
pub async fn bootstrap_db(env: RuntimeEnv, kind: DbKind) -> Result<DatabaseConnection, AppError> {
    let conn = match kind {
        DbKind::Postgres => {
            let owner = connect_db(env, kind, DbOwner::Owner).await?;
            migrate(&owner, MigrationCommand::Up).await?;
            if let Err(e) = owner.close().await {
                warn!(error = %e, "Failed to close owner connection");
            }
            connect_db(env, kind, DbOwner::App).await?
        }
        DbKind::SqliteFile | DbKind::SqliteMemory => {
            let conn = connect_db(env, kind, DbOwner::App).await?;
            migrate(&conn, MigrationCommand::Up).await?;
            conn
        }
    };

    let applied = count_applied_migrations(&conn).await?;
    info!(db_kind = ?kind, env = ?env, applied_migrations = applied, "Database ready");
    Ok(conn)
}
