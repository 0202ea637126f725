//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("could not load {}: {message}", document.display())]
    Load { document: PathBuf, message: String },

    #[error("config error: {message}")]
    Config { message: String },
}

impl ApplicationError {
    /// True for failures while fetching or parsing the input documents.
    pub fn is_load_error(&self) -> bool {
        matches!(self, Self::Load { .. })
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
