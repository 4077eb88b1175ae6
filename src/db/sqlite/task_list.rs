//! SQLite TaskListRepository implementation.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::helpers::map_sqlx_error;
use crate::db::utils::current_timestamp;
use crate::db::{
    DEFAULT_COLOR, DEFAULT_ICON, DbError, DbResult, Id, NewTaskList, TaskList, TaskListRepository,
};

const SELECT_LIST: &str = "SELECT l.id, l.name, l.color, l.icon, l.created_at,
        (SELECT COUNT(*) FROM tasks t WHERE t.list_id = l.id) AS task_count
     FROM lists l";

/// SQLx-backed task list repository.
pub struct SqliteTaskListRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> TaskListRepository for SqliteTaskListRepository<'a> {
    async fn create(&self, list: &NewTaskList) -> DbResult<TaskList> {
        if list.name.trim().is_empty() {
            return Err(DbError::validation("List name cannot be empty"));
        }

        let color = list.color.as_deref().unwrap_or(DEFAULT_COLOR);
        let icon = list.icon.as_deref().unwrap_or(DEFAULT_ICON);
        let created_at = current_timestamp();

        let result =
            sqlx::query("INSERT INTO lists (name, color, icon, created_at) VALUES (?, ?, ?, ?)")
                .bind(&list.name)
                .bind(color)
                .bind(icon)
                .bind(created_at)
                .execute(self.pool)
                .await
                .map_err(|e| map_sqlx_error("TaskList", e))?;

        let id = result.last_insert_rowid();
        debug!(id, name = %list.name, "created task list");

        Ok(TaskList {
            id,
            name: list.name.clone(),
            color: color.to_string(),
            icon: icon.to_string(),
            created_at,
            task_count: 0,
        })
    }

    async fn get(&self, id: Id) -> DbResult<Option<TaskList>> {
        let row = sqlx::query(&format!("{} WHERE l.id = ?", SELECT_LIST))
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| map_sqlx_error("TaskList", e))?;

        row.as_ref()
            .map(row_to_task_list)
            .transpose()
            .map_err(|e| map_sqlx_error("TaskList", e))
    }

    async fn list(&self) -> DbResult<Vec<TaskList>> {
        let rows = sqlx::query(&format!(
            "{} ORDER BY l.created_at DESC, l.id DESC",
            SELECT_LIST
        ))
        .fetch_all(self.pool)
        .await
        .map_err(|e| map_sqlx_error("TaskList", e))?;

        rows.iter()
            .map(row_to_task_list)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("TaskList", e))
    }
}

fn row_to_task_list(row: &SqliteRow) -> Result<TaskList, sqlx::Error> {
    Ok(TaskList {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        color: row.try_get("color")?,
        icon: row.try_get("icon")?,
        created_at: row.try_get("created_at")?,
        task_count: row.try_get("task_count")?,
    })
}
