//! SQLite implementation of the database traits.
//!
//! This module provides a SQLite-backed implementation of the repository
//! traits defined in the parent module.

mod connection;
mod helpers;
mod prompt;
mod tag;
mod task;
mod task_list;
mod tree;

#[cfg(test)]
mod tag_test;
#[cfg(test)]
mod task_test;

pub use connection::SqliteDatabase;
pub use prompt::SqlitePromptRepository;
pub use tag::SqliteTagRepository;
pub use task::SqliteTaskRepository;
pub use task_list::SqliteTaskListRepository;
