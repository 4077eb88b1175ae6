//! Database abstraction layer.
//!
//! This module provides trait-based abstractions for data access,
//! allowing different storage backends to be swapped without changing
//! business logic.
//!
//! # Architecture
//!
//! - `error`: Storage-agnostic error types
//! - `models`: Domain entities (Task, TaskList, Tag, Prompt) and query types
//! - `repository`: Trait definitions for data access
//! - `sqlite`: SQLite implementation of the repository traits
//! - `seed`: Sample data for a fresh store

mod error;
mod models;
mod repository;
pub mod seed;
pub mod sqlite;
pub mod utils;

#[cfg(test)]
mod models_test;

pub use error::{DbError, DbResult};
pub use models::*;
pub use repository::*;
pub use sqlite::SqliteDatabase;
