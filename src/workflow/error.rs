use thiserror::Error;

use crate::db::DatabaseError;

/// Failure of a workflow operation. The message of the first three
/// variants is shown to the caller as-is.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Persistence failure: {0}")]
    Persistence(DatabaseError),
}

impl WorkflowError {
    /// Map an insert/update failure, turning a UNIQUE violation into
    /// `Conflict` with the given message.
    pub fn from_write(err: DatabaseError, conflict_message: &str) -> Self {
        if err.is_unique_violation() {
            WorkflowError::Conflict(conflict_message.to_string())
        } else {
            WorkflowError::Persistence(err)
        }
    }
}

impl From<DatabaseError> for WorkflowError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConstraintViolation(msg) => WorkflowError::Conflict(msg),
            other => WorkflowError::Persistence(other),
        }
    }
}

impl From<rusqlite::Error> for WorkflowError {
    fn from(err: rusqlite::Error) -> Self {
        WorkflowError::from(DatabaseError::from_write(err))
    }
}
