//! Domain models for the task store.
//!
//! These models are storage-agnostic and represent the core entities
//! used throughout the application, plus the filter and patch types the
//! repositories accept.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::DbError;

/// Surrogate key assigned by the store.
pub type Id = i64;

/// Color used for lists and tags when none is given.
pub const DEFAULT_COLOR: &str = "#4a90e2";

/// Icon used for lists when none is given.
pub const DEFAULT_ICON: &str = "list";

/// Priority of a new task (1 = highest, 4 = lowest).
pub const DEFAULT_PRIORITY: i64 = 4;

/// Deepest subtask level included when a task tree is serialized.
pub const MAX_SUBTASK_DEPTH: usize = 32;

// =============================================================================
// Tasks
// =============================================================================

/// A single task row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Task {
    pub id: Id,
    #[schema(example = "Ship release")]
    pub title: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub due_date: Option<NaiveDateTime>,
    pub completed: bool,
    pub completed_at: Option<NaiveDateTime>,
    #[schema(example = 4, minimum = 1, maximum = 4)]
    pub priority: i64,
    /// `None` means the task sits in the Inbox.
    pub list_id: Option<Id>,
    pub parent_id: Option<Id>,
}

impl Task {
    /// Set the completion flag, stamping `completed_at` on the transition to
    /// done and clearing it when reopened.
    pub fn set_completed(&mut self, completed: bool, now: NaiveDateTime) {
        if completed && !self.completed {
            self.completed_at = Some(now);
        } else if !completed {
            self.completed_at = None;
        }
        self.completed = completed;
    }
}

/// A task together with its resolved tags and its subtask tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub tags: Vec<Tag>,
    #[schema(no_recursion)]
    pub subtasks: Vec<TaskDetail>,
}

impl TaskDetail {
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub list_id: Option<Id>,
    pub parent_id: Option<Id>,
    pub priority: i64,
    /// Tag names; names without a matching tag are skipped.
    pub tags: Vec<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date: None,
            list_id: None,
            parent_id: None,
            priority: DEFAULT_PRIORITY,
            tags: Vec::new(),
        }
    }

    pub fn in_list(mut self, list_id: Id) -> Self {
        self.list_id = Some(list_id);
        self
    }

    pub fn with_parent(mut self, parent_id: Id) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn due(mut self, due_date: NaiveDateTime) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn validate(&self) -> Result<(), DbError> {
        validate_title(&self.title)?;
        validate_priority(self.priority)
    }
}

/// Sparse update of a task. `None` leaves a field untouched; for the
/// clearable fields `Some(None)` sets the column to NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due_date: Option<Option<NaiveDateTime>>,
    pub list_id: Option<Option<Id>>,
    pub parent_id: Option<Option<Id>>,
    pub priority: Option<i64>,
    /// Replaces the whole tag set when present.
    pub tags: Option<Vec<String>>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn validate(&self) -> Result<(), DbError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(priority) = self.priority {
            validate_priority(priority)?;
        }
        Ok(())
    }

    /// Apply every scalar field of the patch. Tags are handled by the store.
    pub fn merge_into(&self, target: &mut Task, now: NaiveDateTime) {
        if let Some(title) = &self.title {
            target.title = title.clone();
        }
        if let Some(description) = &self.description {
            target.description = description.clone();
        }
        if let Some(due_date) = self.due_date {
            target.due_date = due_date;
        }
        if let Some(list_id) = self.list_id {
            target.list_id = list_id;
        }
        if let Some(parent_id) = self.parent_id {
            target.parent_id = parent_id;
        }
        if let Some(priority) = self.priority {
            target.priority = priority;
        }
        if let Some(completed) = self.completed {
            target.set_completed(completed, now);
        }
        target.updated_at = now;
    }
}

/// Which list a task query is restricted to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListFilter {
    /// No restriction on list membership.
    #[default]
    Any,
    /// Only tasks without a list.
    Inbox,
    /// Only tasks in the given list.
    List(Id),
}

/// Task query options. All set options must hold (AND).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub list: ListFilter,
    /// Only tasks carrying this tag.
    pub tag_id: Option<Id>,
    /// Only tasks due on this calendar day.
    pub due_date: Option<NaiveDate>,
    /// Only tasks due on or after this calendar day.
    pub due_after: Option<NaiveDate>,
}

impl TaskFilter {
    pub fn inbox() -> Self {
        Self {
            list: ListFilter::Inbox,
            ..Default::default()
        }
    }

    pub fn for_list(list_id: Id) -> Self {
        Self {
            list: ListFilter::List(list_id),
            ..Default::default()
        }
    }

    pub fn for_tag(tag_id: Id) -> Self {
        Self {
            tag_id: Some(tag_id),
            ..Default::default()
        }
    }

    pub fn due_on(day: NaiveDate) -> Self {
        Self {
            due_date: Some(day),
            ..Default::default()
        }
    }

    pub fn due_from(day: NaiveDate) -> Self {
        Self {
            due_after: Some(day),
            ..Default::default()
        }
    }
}

// =============================================================================
// Lists and tags
// =============================================================================

/// A named collection of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaskList {
    pub id: Id,
    #[schema(example = "Work")]
    pub name: String,
    #[schema(example = "#4a90e2")]
    pub color: String,
    #[schema(example = "briefcase")]
    pub icon: String,
    pub created_at: NaiveDateTime,
    /// Number of tasks currently in the list, computed on read.
    pub task_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaskList {
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl NewTaskList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
            icon: None,
        }
    }

    pub fn styled(mut self, color: impl Into<String>, icon: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self.icon = Some(icon.into());
        self
    }
}

/// A label that can be attached to any number of tasks. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Tag {
    pub id: Id,
    #[schema(example = "Urgent")]
    pub name: String,
    #[schema(example = "#e74c3c")]
    pub color: String,
    pub created_at: NaiveDateTime,
    /// Number of tasks carrying the tag, computed on read.
    pub task_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub name: String,
    pub color: Option<String>,
}

impl NewTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
        }
    }

    pub fn colored(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

// =============================================================================
// Prompts
// =============================================================================

/// A stored prompt from the legacy prompt library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Prompt {
    pub id: Id,
    #[schema(example = "Summarize meeting")]
    pub prompt_name: String,
    /// Either a JSON array or a JSON object, returned exactly as stored.
    #[schema(value_type = Object, example = json!(["gpt-4", "claude"]))]
    pub ai_selection: Value,
    pub prompt_content: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// The mutable fields of a prompt, used for both create and full replace.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptInput {
    pub prompt_name: String,
    pub ai_selection: Value,
    pub prompt_content: String,
}

impl PromptInput {
    pub fn validate(&self) -> Result<(), DbError> {
        if self.prompt_name.is_empty() || self.prompt_content.is_empty() {
            return Err(DbError::validation("Prompt name and content are required"));
        }
        if !(self.ai_selection.is_array() || self.ai_selection.is_object()) {
            return Err(DbError::validation(
                "AI selection must be a list or dictionary",
            ));
        }
        Ok(())
    }
}

/// Prompt search options. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptSearch {
    /// Case-sensitive substring of the prompt name.
    pub search_term: Option<String>,
    /// Substring of the encoded AI selection.
    pub ai_filter: Option<String>,
}

// =============================================================================
// Validation
// =============================================================================

fn validate_title(title: &str) -> Result<(), DbError> {
    if title.trim().is_empty() {
        return Err(DbError::validation("Task title cannot be empty"));
    }
    Ok(())
}

fn validate_priority(priority: i64) -> Result<(), DbError> {
    if !(1..=4).contains(&priority) {
        return Err(DbError::validation(format!(
            "Priority must be between 1 and 4, got {}",
            priority
        )));
    }
    Ok(())
}
