//! SQLite PromptRepository implementation.

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

use super::helpers::map_sqlx_error;
use crate::db::utils::current_timestamp;
use crate::db::{DbError, DbResult, Id, Prompt, PromptInput, PromptRepository, PromptSearch};

const SELECT_PROMPT: &str =
    "SELECT id, prompt_name, ai_selection, prompt_content, created_at, updated_at FROM prompts";

/// SQLx-backed prompt repository.
pub struct SqlitePromptRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> PromptRepository for SqlitePromptRepository<'a> {
    async fn create(&self, input: &PromptInput) -> DbResult<Prompt> {
        input.validate()?;

        let selection_json = encode_selection(input)?;
        let now = current_timestamp();

        let result = sqlx::query(
            "INSERT INTO prompts (prompt_name, ai_selection, prompt_content, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&input.prompt_name)
        .bind(&selection_json)
        .bind(&input.prompt_content)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .map_err(|e| map_sqlx_error("Prompt", e))?;

        let id = result.last_insert_rowid();
        debug!(id, "created prompt");

        Ok(Prompt {
            id,
            prompt_name: input.prompt_name.clone(),
            ai_selection: input.ai_selection.clone(),
            prompt_content: input.prompt_content.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn get(&self, id: Id) -> DbResult<Option<Prompt>> {
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_PROMPT))
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| map_sqlx_error("Prompt", e))?;

        row.as_ref().map(row_to_prompt).transpose()
    }

    async fn list(&self) -> DbResult<Vec<Prompt>> {
        self.search(&PromptSearch::default()).await
    }

    async fn update(&self, id: Id, input: &PromptInput) -> DbResult<Prompt> {
        input.validate()?;

        let selection_json = encode_selection(input)?;

        let result = sqlx::query(
            r#"
            UPDATE prompts
            SET prompt_name = ?, ai_selection = ?, prompt_content = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.prompt_name)
        .bind(&selection_json)
        .bind(&input.prompt_content)
        .bind(current_timestamp())
        .bind(id)
        .execute(self.pool)
        .await
        .map_err(|e| map_sqlx_error("Prompt", e))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Prompt", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Prompt", id))
    }

    async fn delete(&self, id: Id) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM prompts WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| map_sqlx_error("Prompt", e))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Prompt", id));
        }

        debug!(id, "deleted prompt");
        Ok(())
    }

    async fn search(&self, search: &PromptSearch) -> DbResult<Vec<Prompt>> {
        let mut builder = QueryBuilder::<Sqlite>::new(SELECT_PROMPT);
        let mut has_where = false;

        // instr() is case-sensitive, unlike LIKE
        if let Some(term) = search.search_term.as_deref().filter(|s| !s.is_empty()) {
            builder
                .push(" WHERE instr(prompt_name, ")
                .push_bind(term.to_string())
                .push(") > 0");
            has_where = true;
        }

        if let Some(filter) = search.ai_filter.as_deref().filter(|s| !s.is_empty()) {
            builder
                .push(if has_where { " AND " } else { " WHERE " })
                .push("instr(ai_selection, ")
                .push_bind(filter.to_string())
                .push(") > 0");
        }

        builder.push(" ORDER BY created_at DESC, id DESC");

        let rows = builder
            .build()
            .fetch_all(self.pool)
            .await
            .map_err(|e| map_sqlx_error("Prompt", e))?;

        rows.iter().map(row_to_prompt).collect()
    }
}

fn encode_selection(input: &PromptInput) -> DbResult<String> {
    serde_json::to_string(&input.ai_selection).map_err(|e| DbError::Database {
        message: format!("Failed to serialize AI selection: {}", e),
    })
}

fn row_to_prompt(row: &SqliteRow) -> DbResult<Prompt> {
    let decode = |e| map_sqlx_error("Prompt", e);

    let selection_json: String = row.try_get("ai_selection").map_err(decode)?;
    let ai_selection = serde_json::from_str(&selection_json).map_err(|e| DbError::Decode {
        message: format!("Invalid AI selection data in database: {}", e),
    })?;

    Ok(Prompt {
        id: row.try_get("id").map_err(decode)?,
        prompt_name: row.try_get("prompt_name").map_err(decode)?,
        ai_selection,
        prompt_content: row.try_get("prompt_content").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
        updated_at: row.try_get("updated_at").map_err(decode)?,
    })
}
