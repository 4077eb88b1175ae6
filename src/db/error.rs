//! Database error types.
//!
//! This module provides abstracted error types for database operations.
//! It uses miette for fancy diagnostic output and thiserror for derive macros.
//! The error types are storage-backend agnostic.

use miette::Diagnostic;
use thiserror::Error;

/// Database operation errors.
///
/// `Validation`, `NotFound` and `Conflict` describe caller mistakes; every
/// other variant is a failure at the storage boundary.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Validation error: {message}")]
    #[diagnostic(code(taskdeck::db::validation_error))]
    Validation { message: String },

    #[error("Entity not found: {entity_type} with id '{id}'")]
    #[diagnostic(code(taskdeck::db::not_found))]
    NotFound { entity_type: String, id: String },

    #[error("Conflict: {entity_type} {message}")]
    #[diagnostic(code(taskdeck::db::conflict))]
    Conflict {
        entity_type: String,
        message: String,
    },

    #[error("Database error: {message}")]
    #[diagnostic(code(taskdeck::db::database_error))]
    Database { message: String },

    #[error("Constraint violation: {message}")]
    #[diagnostic(code(taskdeck::db::constraint))]
    Constraint { message: String },

    #[error("Decode error: {message}")]
    #[diagnostic(code(taskdeck::db::decode))]
    Decode { message: String },

    #[error("Migration error: {message}")]
    #[diagnostic(code(taskdeck::db::migration_error))]
    Migration { message: String },

    #[error("Connection error: {message}")]
    #[diagnostic(code(taskdeck::db::connection_error))]
    Connection { message: String },
}

impl DbError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        DbError::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity_type: &str, id: impl ToString) -> Self {
        DbError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    /// True for failures of the storage engine itself rather than of the input.
    pub fn is_storage(&self) -> bool {
        !matches!(
            self,
            DbError::Validation { .. } | DbError::NotFound { .. } | DbError::Conflict { .. }
        )
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
