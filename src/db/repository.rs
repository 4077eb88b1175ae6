//! Repository traits for data access abstraction.
//!
//! These traits define the contract for data access, allowing different
//! storage backends to be swapped without changing business logic.
//! Every call re-reads from storage; nothing is cached between calls.

use std::future::Future;

use crate::db::{
    DbResult,
    models::{
        Id, NewTag, NewTask, NewTaskList, Prompt, PromptInput, PromptSearch, Tag,
        TaskDetail, TaskFilter, TaskList, TaskPatch,
    },
};

/// Repository for Task operations.
pub trait TaskRepository: Send + Sync {
    /// Create a new task and attach the named tags that exist.
    fn create(&self, task: &NewTask) -> impl Future<Output = DbResult<TaskDetail>> + Send;

    /// Get a task by ID.
    fn get(&self, id: Id) -> impl Future<Output = DbResult<TaskDetail>> + Send;

    /// List tasks matching the filter, newest first.
    fn list(&self, filter: &TaskFilter) -> impl Future<Output = DbResult<Vec<TaskDetail>>> + Send;

    /// Apply a partial update.
    fn update(&self, id: Id, patch: &TaskPatch)
    -> impl Future<Output = DbResult<TaskDetail>> + Send;

    /// Delete a task and its tag associations. Subtasks are left in place.
    fn delete(&self, id: Id) -> impl Future<Output = DbResult<()>> + Send;

    /// Mark a task done or not done.
    fn toggle(&self, id: Id, completed: bool) -> impl Future<Output = DbResult<TaskDetail>> + Send;
}

/// Repository for TaskList operations.
pub trait TaskListRepository: Send + Sync {
    /// Create a new task list.
    fn create(&self, list: &NewTaskList) -> impl Future<Output = DbResult<TaskList>> + Send;

    /// Get a task list by ID, `None` if it does not exist.
    fn get(&self, id: Id) -> impl Future<Output = DbResult<Option<TaskList>>> + Send;

    /// Get all task lists, newest first.
    fn list(&self) -> impl Future<Output = DbResult<Vec<TaskList>>> + Send;
}

/// Repository for Tag operations.
pub trait TagRepository: Send + Sync {
    /// Create a new tag. Fails with `Conflict` if the name is taken.
    fn create(&self, tag: &NewTag) -> impl Future<Output = DbResult<Tag>> + Send;

    /// Get a tag by ID, `None` if it does not exist.
    fn get(&self, id: Id) -> impl Future<Output = DbResult<Option<Tag>>> + Send;

    /// Get all tags ordered by name.
    fn list(&self) -> impl Future<Output = DbResult<Vec<Tag>>> + Send;
}

/// Repository for the legacy prompt library.
pub trait PromptRepository: Send + Sync {
    fn create(&self, input: &PromptInput) -> impl Future<Output = DbResult<Prompt>> + Send;

    /// Get a prompt by ID, `None` if it does not exist.
    fn get(&self, id: Id) -> impl Future<Output = DbResult<Option<Prompt>>> + Send;

    /// Get all prompts, newest first.
    fn list(&self) -> impl Future<Output = DbResult<Vec<Prompt>>> + Send;

    /// Replace name, AI selection and content.
    fn update(&self, id: Id, input: &PromptInput)
    -> impl Future<Output = DbResult<Prompt>> + Send;

    fn delete(&self, id: Id) -> impl Future<Output = DbResult<()>> + Send;

    /// Search by name and/or encoded AI selection, newest first.
    fn search(&self, search: &PromptSearch) -> impl Future<Output = DbResult<Vec<Prompt>>> + Send;
}

/// Result of running schema migrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// Pending migrations were applied.
    Applied { count: usize },
    /// The schema was already up to date.
    AlreadyCurrent,
}

/// Combined database interface.
///
/// Provides access to repositories via associated types, avoiding dynamic dispatch.
pub trait Database: Send + Sync {
    type Tasks<'a>: TaskRepository
    where
        Self: 'a;
    type TaskLists<'a>: TaskListRepository
    where
        Self: 'a;
    type Tags<'a>: TagRepository
    where
        Self: 'a;
    type Prompts<'a>: PromptRepository
    where
        Self: 'a;

    /// Run pending migrations.
    fn migrate(&self) -> impl Future<Output = DbResult<MigrationOutcome>> + Send;

    /// Release every connection. Calls made afterwards fail with a storage error.
    fn close(&self) -> impl Future<Output = ()> + Send;

    /// Get the task repository.
    fn tasks(&self) -> Self::Tasks<'_>;

    /// Get the task list repository.
    fn task_lists(&self) -> Self::TaskLists<'_>;

    /// Get the tag repository.
    fn tags(&self) -> Self::Tags<'_>;

    /// Get the prompt repository.
    fn prompts(&self) -> Self::Prompts<'_>;
}
