//! Domain-specific errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("at least one recognized extension is required")]
    EmptyExtensionSet,
    #[error("invalid extension '{0}'")]
    InvalidExtension(String),
    #[error("unknown strip mode '{0}' (expected 'legacy' or 'extension')")]
    UnknownStripMode(String),
}
