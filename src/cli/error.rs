//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::exitcode;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::Application(e.into())
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => exitcode::USAGE,
            CliError::Application(e) => match e {
                ApplicationError::Domain(DomainError::InvalidKeyRange { .. }) => exitcode::DATAERR,
                ApplicationError::Domain(DomainError::CapacityExhausted { .. }) => {
                    exitcode::UNAVAILABLE
                }
                ApplicationError::Config { .. } | ApplicationError::ConfigNotFound(_) => {
                    exitcode::CONFIG
                }
                ApplicationError::Invariant { .. } | ApplicationError::Inconsistent { .. } => {
                    exitcode::SOFTWARE
                }
            },
        }
    }
}
