//! Taskdeck API server binary.
//!
//! This binary creates the concrete database implementation and passes it
//! to the API server. The API layer remains agnostic of the storage backend.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use miette::Diagnostic;
use taskdeck::api::{self, ApiError, Config};
use taskdeck::db::seed::seed_sample_data;
use taskdeck::db::{Database, DbError, SqliteDatabase};
use taskdeck::paths::get_db_path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Diagnostic, Debug)]
enum BinaryError {
    #[error("Database error: {0}")]
    #[diagnostic(code(taskdeck::binary::database))]
    Database(#[from] DbError),

    #[error("Failed to create data directory: {0}")]
    #[diagnostic(code(taskdeck::binary::io))]
    Io(#[from] std::io::Error),

    #[error("API server error: {0}")]
    #[diagnostic(code(taskdeck::binary::api))]
    Api(#[from] ApiError),
}

#[derive(Parser)]
#[command(name = "taskdeck-api")]
#[command(author, version, about = "Taskdeck API server", long_about = None)]
struct Cli {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Database file path (defaults to XDG data directory: ~/.local/share/taskdeck/taskdeck.db)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Load sample lists, tags and tasks into an empty database
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    api::init_tracing();

    serve(cli).await?;
    Ok(())
}

async fn serve(cli: Cli) -> Result<(), BinaryError> {
    let db_path = cli.db.unwrap_or_else(get_db_path);

    // Ensure parent directory exists
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    info!(path = %db_path.display(), "opening database");
    let db = SqliteDatabase::open(&db_path).await?;

    // Run migrations before starting the server
    let outcome = db.migrate().await?;
    info!(?outcome, "database ready");

    if cli.seed {
        let summary = seed_sample_data(&db).await?;
        info!(?summary, "sample data loaded");
    }

    // Pass the abstract Database to the API layer
    api::run(
        Config {
            host: cli.host,
            port: cli.port,
        },
        db,
    )
    .await?;

    Ok(())
}
