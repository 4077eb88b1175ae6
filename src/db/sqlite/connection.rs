//! SQLite database connection and migration management.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::{debug, info};

use super::{
    SqlitePromptRepository, SqliteTagRepository, SqliteTaskListRepository, SqliteTaskRepository,
};
use crate::db::{Database, DbError, DbResult, MigrationOutcome};

// Embed migrations from migrations/ at compile time
static MIGRATOR: Migrator = sqlx::migrate!();

/// How long a statement waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(20);

/// Upper bound on concurrently open connections to a file-backed store.
const MAX_CONNECTIONS: u32 = 5;

/// SQLite database implementation.
///
/// Owns the connection pool. Construct one at startup and hand it to the
/// layers that need it; every repository call checks a connection out of
/// the pool for its own duration and returns it on drop.
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Open (or create) a database file at the given path.
    pub async fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        debug!(path = %path.as_ref().display(), "opened sqlite database");
        Ok(Self { pool })
    }

    /// Create an in-memory database (useful for testing).
    ///
    /// Every in-memory connection is a separate database, so the pool is
    /// pinned to a single connection that is never recycled.
    pub async fn in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    /// The underlying connection pool, for raw SQL in tests.
    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn applied_migrations(&self) -> DbResult<i64> {
        let tracked: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::Migration {
            message: e.to_string(),
        })?;

        if !tracked {
            return Ok(0);
        }

        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DbError::Migration {
                message: e.to_string(),
            })
    }
}

impl Database for SqliteDatabase {
    type Tasks<'a> = SqliteTaskRepository<'a>;
    type TaskLists<'a> = SqliteTaskListRepository<'a>;
    type Tags<'a> = SqliteTagRepository<'a>;
    type Prompts<'a> = SqlitePromptRepository<'a>;

    async fn migrate(&self) -> DbResult<MigrationOutcome> {
        let before = self.applied_migrations().await?;

        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| DbError::Migration {
                message: e.to_string(),
            })?;

        let after = self.applied_migrations().await?;
        if after > before {
            let count = (after - before) as usize;
            info!(count, "applied schema migrations");
            Ok(MigrationOutcome::Applied { count })
        } else {
            debug!("schema already current");
            Ok(MigrationOutcome::AlreadyCurrent)
        }
    }

    async fn close(&self) {
        self.pool.close().await;
        debug!("closed sqlite database");
    }

    fn tasks(&self) -> Self::Tasks<'_> {
        SqliteTaskRepository { pool: &self.pool }
    }

    fn task_lists(&self) -> Self::TaskLists<'_> {
        SqliteTaskListRepository { pool: &self.pool }
    }

    fn tags(&self) -> Self::Tags<'_> {
        SqliteTagRepository { pool: &self.pool }
    }

    fn prompts(&self) -> Self::Prompts<'_> {
        SqlitePromptRepository { pool: &self.pool }
    }
}
