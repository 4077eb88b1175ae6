//! Assembly of task trees: resolved tags plus nested subtasks.
//!
//! Subtasks are fetched one level at a time and the tree is built in
//! memory with an ancestor set and a depth cap, so a cyclic parent chain
//! cannot recurse without bound.

use std::collections::{HashMap, HashSet};

use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};

use super::helpers::{ID_CHUNK, TASK_COLUMNS, map_sqlx_error, push_id_list};
use super::tag::row_to_tag;
use crate::db::{DbResult, Id, MAX_SUBTASK_DEPTH, Tag, Task, TaskDetail};

/// Convert a database row to a Task model.
pub(crate) fn row_to_task(row: &SqliteRow) -> Result<Task, sqlx::Error> {
    Ok(Task {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        due_date: row.try_get("due_date")?,
        completed: row.try_get("completed")?,
        completed_at: row.try_get("completed_at")?,
        priority: row.try_get("priority")?,
        list_id: row.try_get("list_id")?,
        parent_id: row.try_get("parent_id")?,
    })
}

/// Load tags and subtasks for each root and return them in the same order.
pub(crate) async fn load_details(
    conn: &mut SqliteConnection,
    roots: Vec<Task>,
) -> DbResult<Vec<TaskDetail>> {
    let mut children: HashMap<Id, Vec<Task>> = HashMap::new();
    let mut expanded: HashSet<Id> = HashSet::new();
    let mut all_ids: HashSet<Id> = roots.iter().map(|t| t.id).collect();
    let mut frontier: Vec<Id> = roots.iter().map(|t| t.id).collect();

    for _ in 0..MAX_SUBTASK_DEPTH {
        frontier.retain(|id| expanded.insert(*id));
        if frontier.is_empty() {
            break;
        }

        let level = fetch_children(conn, &frontier).await?;
        frontier = level.iter().map(|t| t.id).collect();
        for child in level {
            all_ids.insert(child.id);
            if let Some(parent_id) = child.parent_id {
                children.entry(parent_id).or_default().push(child);
            }
        }
    }

    let ids: Vec<Id> = all_ids.into_iter().collect();
    let tags = fetch_tags(conn, &ids).await?;

    let mut ancestors = HashSet::new();
    Ok(roots
        .into_iter()
        .map(|task| build(task, &children, &tags, &mut ancestors, 0))
        .collect())
}

fn build(
    task: Task,
    children: &HashMap<Id, Vec<Task>>,
    tags: &HashMap<Id, Vec<Tag>>,
    ancestors: &mut HashSet<Id>,
    depth: usize,
) -> TaskDetail {
    let task_tags = tags.get(&task.id).cloned().unwrap_or_default();

    let mut subtasks = Vec::new();
    if depth < MAX_SUBTASK_DEPTH {
        ancestors.insert(task.id);
        for child in children.get(&task.id).into_iter().flatten() {
            if ancestors.contains(&child.id) {
                continue;
            }
            subtasks.push(build(child.clone(), children, tags, ancestors, depth + 1));
        }
        ancestors.remove(&task.id);
    }

    TaskDetail {
        task,
        tags: task_tags,
        subtasks,
    }
}

async fn fetch_children(conn: &mut SqliteConnection, parent_ids: &[Id]) -> DbResult<Vec<Task>> {
    let mut tasks = Vec::new();
    for chunk in parent_ids.chunks(ID_CHUNK) {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM tasks t WHERE t.parent_id IN ",
            TASK_COLUMNS
        ));
        push_id_list(&mut builder, chunk);
        builder.push(" ORDER BY t.created_at ASC, t.id ASC");

        let rows = builder
            .build()
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("Task", e))?;

        for row in &rows {
            tasks.push(row_to_task(row).map_err(|e| map_sqlx_error("Task", e))?);
        }
    }
    Ok(tasks)
}

async fn fetch_tags(
    conn: &mut SqliteConnection,
    task_ids: &[Id],
) -> DbResult<HashMap<Id, Vec<Tag>>> {
    let mut by_task: HashMap<Id, Vec<Tag>> = HashMap::new();
    for chunk in task_ids.chunks(ID_CHUNK) {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT tt.task_id, g.id, g.name, g.color, g.created_at,
                    (SELECT COUNT(*) FROM task_tags c WHERE c.tag_id = g.id) AS task_count
             FROM task_tags tt JOIN tags g ON g.id = tt.tag_id
             WHERE tt.task_id IN ",
        );
        push_id_list(&mut builder, chunk);
        builder.push(" ORDER BY g.name ASC");

        let rows = builder
            .build()
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("Tag", e))?;

        for row in &rows {
            let task_id: Id = row
                .try_get("task_id")
                .map_err(|e| map_sqlx_error("Tag", e))?;
            let tag = row_to_tag(row).map_err(|e| map_sqlx_error("Tag", e))?;
            by_task.entry(task_id).or_default().push(tag);
        }
    }
    Ok(by_task)
}
