//! SQLite TaskRepository implementation.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use super::helpers::{
    TASK_COLUMNS, begin_write, map_sqlx_error, push_task_filter, resolve_tag_ids, row_exists,
};
use super::tree::{load_details, row_to_task};
use crate::db::utils::current_timestamp;
use crate::db::{
    DbError, DbResult, Id, NewTask, Task, TaskDetail, TaskFilter, TaskPatch, TaskRepository,
};

/// SQLx-backed task repository.
pub struct SqliteTaskRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> TaskRepository for SqliteTaskRepository<'a> {
    async fn create(&self, task: &NewTask) -> DbResult<TaskDetail> {
        task.validate()?;

        // Start a transaction for atomic operations
        let mut tx = begin_write(self.pool, "Task").await?;

        check_references(&mut tx, task.list_id, task.parent_id).await?;

        let now = current_timestamp();
        let result = sqlx::query(
            r#"
            INSERT INTO tasks (title, description, created_at, updated_at, due_date, completed, completed_at, priority, list_id, parent_id)
            VALUES (?, ?, ?, ?, ?, 0, NULL, ?, ?, ?)
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(now)
        .bind(now)
        .bind(task.due_date)
        .bind(task.priority)
        .bind(task.list_id)
        .bind(task.parent_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("Task", e))?;

        let id = result.last_insert_rowid();
        let tag_ids = resolve_tag_ids(&mut tx, &task.tags).await?;
        attach_tags(&mut tx, id, &tag_ids).await?;

        let detail = fetch_detail(&mut tx, id).await?;

        tx.commit().await.map_err(|e| map_sqlx_error("Task", e))?;

        debug!(id, tags = tag_ids.len(), "created task");
        Ok(detail)
    }

    async fn get(&self, id: Id) -> DbResult<TaskDetail> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("Task", e))?;

        fetch_detail(&mut conn, id).await
    }

    async fn list(&self, filter: &TaskFilter) -> DbResult<Vec<TaskDetail>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("Task", e))?;

        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM tasks t", TASK_COLUMNS));
        push_task_filter(&mut builder, filter);
        builder.push(" ORDER BY t.created_at DESC, t.id DESC");

        let rows = builder
            .build()
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("Task", e))?;

        let tasks = rows
            .iter()
            .map(row_to_task)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("Task", e))?;

        load_details(&mut conn, tasks).await
    }

    async fn update(&self, id: Id, patch: &TaskPatch) -> DbResult<TaskDetail> {
        patch.validate()?;

        let mut tx = begin_write(self.pool, "Task").await?;

        let mut task = fetch_task(&mut tx, id).await?;

        let list_id = patch.list_id.flatten();
        let parent_id = patch.parent_id.flatten();
        check_references(&mut tx, list_id, parent_id).await?;

        patch.merge_into(&mut task, current_timestamp());
        write_task(&mut tx, &task).await?;

        // Tags are replaced wholesale, never merged
        if let Some(names) = &patch.tags {
            sqlx::query("DELETE FROM task_tags WHERE task_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("Task", e))?;

            let tag_ids = resolve_tag_ids(&mut tx, names).await?;
            attach_tags(&mut tx, id, &tag_ids).await?;
        }

        let detail = fetch_detail(&mut tx, id).await?;

        tx.commit().await.map_err(|e| map_sqlx_error("Task", e))?;

        debug!(id, "updated task");
        Ok(detail)
    }

    async fn delete(&self, id: Id) -> DbResult<()> {
        let mut tx = begin_write(self.pool, "Task").await?;

        sqlx::query("DELETE FROM task_tags WHERE task_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("Task", e))?;

        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("Task", e))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Task", id));
        }

        tx.commit().await.map_err(|e| map_sqlx_error("Task", e))?;

        debug!(id, "deleted task");
        Ok(())
    }

    async fn toggle(&self, id: Id, completed: bool) -> DbResult<TaskDetail> {
        let mut tx = begin_write(self.pool, "Task").await?;

        let mut task = fetch_task(&mut tx, id).await?;
        let now = current_timestamp();
        task.set_completed(completed, now);
        task.updated_at = now;
        write_task(&mut tx, &task).await?;

        let detail = fetch_detail(&mut tx, id).await?;

        tx.commit().await.map_err(|e| map_sqlx_error("Task", e))?;

        debug!(id, completed, "toggled task");
        Ok(detail)
    }
}

async fn fetch_task(conn: &mut SqliteConnection, id: Id) -> DbResult<Task> {
    let row = sqlx::query(&format!("SELECT {} FROM tasks t WHERE t.id = ?", TASK_COLUMNS))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("Task", e))?;

    let row = row.ok_or_else(|| DbError::not_found("Task", id))?;
    row_to_task(&row).map_err(|e| map_sqlx_error("Task", e))
}

async fn fetch_detail(conn: &mut SqliteConnection, id: Id) -> DbResult<TaskDetail> {
    let task = fetch_task(conn, id).await?;
    load_details(conn, vec![task])
        .await?
        .pop()
        .ok_or_else(|| DbError::not_found("Task", id))
}

/// Persist every mutable column of `task`.
async fn write_task(conn: &mut SqliteConnection, task: &Task) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE tasks
        SET title = ?, description = ?, updated_at = ?, due_date = ?, completed = ?,
            completed_at = ?, priority = ?, list_id = ?, parent_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.updated_at)
    .bind(task.due_date)
    .bind(task.completed)
    .bind(task.completed_at)
    .bind(task.priority)
    .bind(task.list_id)
    .bind(task.parent_id)
    .bind(task.id)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_sqlx_error("Task", e))?;

    Ok(())
}

async fn attach_tags(conn: &mut SqliteConnection, task_id: Id, tag_ids: &[Id]) -> DbResult<()> {
    for tag_id in tag_ids {
        sqlx::query("INSERT OR IGNORE INTO task_tags (task_id, tag_id) VALUES (?, ?)")
            .bind(task_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("Task", e))?;
    }
    Ok(())
}

/// Validate that referenced list and parent rows exist.
async fn check_references(
    conn: &mut SqliteConnection,
    list_id: Option<Id>,
    parent_id: Option<Id>,
) -> DbResult<()> {
    if let Some(list_id) = list_id
        && !row_exists(conn, "lists", list_id).await?
    {
        return Err(DbError::validation(format!(
            "List with id '{}' not found",
            list_id
        )));
    }

    if let Some(parent_id) = parent_id
        && !row_exists(conn, "tasks", parent_id).await?
    {
        return Err(DbError::validation(format!(
            "Parent task with id '{}' not found",
            parent_id
        )));
    }

    Ok(())
}
