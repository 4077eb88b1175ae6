//! Shared helper functions for SQLite repositories.

use sqlx::error::ErrorKind;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{error, warn};

use crate::db::{DbError, DbResult, Id, ListFilter, TaskFilter};

/// Columns selected for every task read, prefixed with the `t` alias.
pub const TASK_COLUMNS: &str = "t.id, t.title, t.description, t.created_at, t.updated_at, \
     t.due_date, t.completed, t.completed_at, t.priority, t.list_id, t.parent_id";

/// Largest number of ids bound into one `IN (...)` list.
pub const ID_CHUNK: usize = 500;

/// Classify a sqlx error into the database error taxonomy.
///
/// The engine's message is kept verbatim and the error is logged here, so
/// callers only need `map_err(|e| map_sqlx_error("Task", e))`.
pub fn map_sqlx_error(entity_type: &str, e: sqlx::Error) -> DbError {
    error!(entity_type, error = %e, "storage operation failed");

    let message = e.to_string();
    match &e {
        sqlx::Error::Database(db_err) => match db_err.kind() {
            ErrorKind::UniqueViolation => DbError::Conflict {
                entity_type: entity_type.to_string(),
                message: db_err.message().to_string(),
            },
            ErrorKind::ForeignKeyViolation
            | ErrorKind::CheckViolation
            | ErrorKind::NotNullViolation => DbError::Constraint {
                message: db_err.message().to_string(),
            },
            _ => DbError::Database { message },
        },
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::TypeNotFound { .. } => DbError::Decode { message },
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            DbError::Connection { message }
        }
        _ => DbError::Database { message },
    }
}

/// Open a transaction that holds the write lock from its first statement.
///
/// A deferred transaction that reads before writing fails with SQLITE_BUSY
/// without waiting when another writer commits first in WAL mode.
pub async fn begin_write(
    pool: &SqlitePool,
    entity_type: &str,
) -> DbResult<Transaction<'static, Sqlite>> {
    pool.begin_with("BEGIN IMMEDIATE")
        .await
        .map_err(|e| map_sqlx_error(entity_type, e))
}

/// Append the WHERE clause for a task filter to a query selecting from `tasks t`.
///
/// Tag membership is tested with `EXISTS` so a task never appears twice.
pub fn push_task_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &TaskFilter) {
    let mut has_where = false;

    match filter.list {
        ListFilter::Any => {}
        ListFilter::Inbox => {
            push_condition(builder, &mut has_where);
            builder.push("t.list_id IS NULL");
        }
        ListFilter::List(list_id) => {
            push_condition(builder, &mut has_where);
            builder.push("t.list_id = ").push_bind(list_id);
        }
    }

    if let Some(tag_id) = filter.tag_id {
        push_condition(builder, &mut has_where);
        builder
            .push("EXISTS (SELECT 1 FROM task_tags tt WHERE tt.task_id = t.id AND tt.tag_id = ")
            .push_bind(tag_id)
            .push(")");
    }

    if let Some(day) = filter.due_date {
        push_condition(builder, &mut has_where);
        builder.push("date(t.due_date) = ").push_bind(day);
    }

    if let Some(day) = filter.due_after {
        push_condition(builder, &mut has_where);
        builder.push("date(t.due_date) >= ").push_bind(day);
    }
}

fn push_condition(builder: &mut QueryBuilder<'_, Sqlite>, has_where: &mut bool) {
    builder.push(if *has_where { " AND " } else { " WHERE " });
    *has_where = true;
}

/// Append `(?, ?, ...)` binding each id.
pub fn push_id_list(builder: &mut QueryBuilder<'_, Sqlite>, ids: &[Id]) {
    builder.push("(");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

/// Check that a row with the given id exists in `table`.
///
/// `table` is always a literal from this crate, never user input.
pub async fn row_exists(conn: &mut SqliteConnection, table: &str, id: Id) -> DbResult<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", table);
    sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_one(conn)
        .await
        .map_err(|e| map_sqlx_error(table, e))
}

/// Resolve tag names to ids, skipping names with no matching tag.
pub async fn resolve_tag_ids(conn: &mut SqliteConnection, names: &[String]) -> DbResult<Vec<Id>> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        let id: Option<Id> = sqlx::query_scalar("SELECT id FROM tags WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("Tag", e))?;

        match id {
            Some(id) if !ids.contains(&id) => ids.push(id),
            Some(_) => {}
            None => warn!(tag = %name, "skipping unknown tag name"),
        }
    }
    Ok(ids)
}
