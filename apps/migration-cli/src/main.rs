use std::env;

use clap::{Parser, ValueEnum};
use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, Database};

#[derive(Clone, Copy, ValueEnum)]
enum Env {
    Prod,
    Test,
}

#[derive(Clone, Copy, ValueEnum)]
enum Db {
    Postgres,
    SqliteFile,
}

#[derive(Parser)]
#[command(name = "migration-cli")]
#[command(about = "PawHaven database migration tool")]
struct Args {
    /// Migration command: up | down | fresh | reset | refresh | status
    command: String,

    /// Runtime environment
    #[arg(short, long, value_enum, default_value = "test")]
    env: Env,

    /// Database type
    #[arg(
        short,
        long,
        value_enum,
        default_value = "postgres",
        help = "Database type: postgres, sqlite-file"
    )]
    db: Db,
}

fn must_var(name: &str) -> Result<String, String> {
    env::var(name).map_err(|_| format!("Required environment variable '{name}' is not set"))
}

/// Owner-level connection string; migrations need DDL rights.
fn owner_url(env: Env, db: Db) -> Result<String, String> {
    match db {
        Db::SqliteFile => {
            let path = env::var("SQLITE_DB_PATH").unwrap_or_else(|_| "pawhaven.sqlite".into());
            Ok(format!("sqlite://{path}?mode=rwc"))
        }
        Db::Postgres => {
            let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".into());
            let port = env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".into());
            let db_name = match env {
                Env::Prod => must_var("PROD_DB")?,
                Env::Test => {
                    let name = must_var("TEST_DB")?;
                    if !name.ends_with("_test") {
                        return Err(format!(
                            "Test profile requires database name to end with '_test', but got: '{name}'"
                        ));
                    }
                    name
                }
            };
            let user = must_var("PAWHAVEN_DB_OWNER_USER")?;
            let password = must_var("PAWHAVEN_DB_OWNER_PASSWORD")?;
            Ok(format!(
                "postgresql://{user}:{password}@{host}:{port}/{db_name}"
            ))
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_env_filter("migration=info,sqlx=warn")
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.to_string().contains("invalid value") && e.to_string().contains("--db") {
                eprintln!("Unsupported database type provided.");
                eprintln!();
                eprintln!("In-memory SQLite is not supported here: each CLI run would");
                eprintln!("migrate a fresh database and then throw it away.");
                eprintln!();
                eprintln!("Supported database types:");
                eprintln!("  postgres    - PostgreSQL database");
                eprintln!("  sqlite-file - SQLite file database (SQLITE_DB_PATH)");
                std::process::exit(1);
            }
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let command: MigrationCommand = match args.command.parse() {
        Ok(cmd) => cmd,
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };

    let url = match owner_url(args.env, args.db) {
        Ok(url) => url,
        Err(msg) => {
            eprintln!("Configuration error: {msg}");
            std::process::exit(1);
        }
    };

    let mut opt = ConnectOptions::new(url);
    opt.max_connections(1).sqlx_logging(false);

    let conn = match Database::connect(opt).await {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("Failed to connect: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = migrate(&conn, command).await {
        eprintln!("Migration failed: {e}");
        std::process::exit(1);
    }
}
