//! SQLite TagRepository implementation.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use super::helpers::map_sqlx_error;
use crate::db::utils::current_timestamp;
use crate::db::{DEFAULT_COLOR, DbError, DbResult, Id, NewTag, Tag, TagRepository};

const SELECT_TAG: &str = "SELECT g.id, g.name, g.color, g.created_at,
        (SELECT COUNT(*) FROM task_tags tt WHERE tt.tag_id = g.id) AS task_count
     FROM tags g";

/// SQLx-backed tag repository.
pub struct SqliteTagRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> TagRepository for SqliteTagRepository<'a> {
    async fn create(&self, tag: &NewTag) -> DbResult<Tag> {
        if tag.name.trim().is_empty() {
            return Err(DbError::validation("Tag name cannot be empty"));
        }

        let color = tag.color.as_deref().unwrap_or(DEFAULT_COLOR);
        let created_at = current_timestamp();

        let result = sqlx::query("INSERT INTO tags (name, color, created_at) VALUES (?, ?, ?)")
            .bind(&tag.name)
            .bind(color)
            .bind(created_at)
            .execute(self.pool)
            .await
            .map_err(|e| match map_sqlx_error("Tag", e) {
                DbError::Conflict { entity_type, .. } => DbError::Conflict {
                    entity_type,
                    message: format!("name '{}' already exists", tag.name),
                },
                other => other,
            })?;

        let id = result.last_insert_rowid();
        debug!(id, name = %tag.name, "created tag");

        Ok(Tag {
            id,
            name: tag.name.clone(),
            color: color.to_string(),
            created_at,
            task_count: 0,
        })
    }

    async fn get(&self, id: Id) -> DbResult<Option<Tag>> {
        let row = sqlx::query(&format!("{} WHERE g.id = ?", SELECT_TAG))
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| map_sqlx_error("Tag", e))?;

        row.as_ref()
            .map(row_to_tag)
            .transpose()
            .map_err(|e| map_sqlx_error("Tag", e))
    }

    async fn list(&self) -> DbResult<Vec<Tag>> {
        let rows = sqlx::query(&format!("{} ORDER BY g.name ASC", SELECT_TAG))
            .fetch_all(self.pool)
            .await
            .map_err(|e| map_sqlx_error("Tag", e))?;

        rows.iter()
            .map(row_to_tag)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("Tag", e))
    }
}

/// Convert a database row to a Tag model.
pub(crate) fn row_to_tag(row: &SqliteRow) -> Result<Tag, sqlx::Error> {
    Ok(Tag {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        color: row.try_get("color")?,
        created_at: row.try_get("created_at")?,
        task_count: row.try_get("task_count")?,
    })
}
