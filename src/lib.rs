//! Personal task store: tasks, lists, tags and a legacy prompt library on
//! SQLite, with an axum HTTP front.

pub mod api;
pub mod db;
pub mod paths;
pub mod serde_utils;
