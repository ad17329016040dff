//! Error types for shapesheet-core

use crate::address::{AddressKind, SectionIndex};
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or executing a query
#[derive(Debug, Error)]
pub enum Error {
    /// The query being built is invalid. Raised before any host call.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Column lookup by name missed
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Section lookup missed
    #[error("Section not found: {0}")]
    SectionNotFound(SectionIndex),

    /// A result type outside {integer, floating point, text} was requested
    #[error("Unsupported result type: {0}")]
    UnsupportedType(String),

    /// The host returned data inconsistent with the request
    #[error("Malformed result: {0}")]
    MalformedResult(String),

    /// A programming defect inside the engine
    #[error("Internal invariant violated: {0}")]
    InternalInvariant(String),

    /// The host binding failed
    #[error("Host error: {0}")]
    Host(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Query-build errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Column name already present in the list
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    /// Section already added to this query
    #[error("duplicate section {0}")]
    DuplicateSection(SectionIndex),

    /// Section/row columns and cell-index columns in one query
    #[error("cannot add {attempted} columns to a query addressed by {existing}")]
    MixedAddressing {
        existing: AddressKind,
        attempted: AddressKind,
    },

    /// Column address belongs to a different section than its section query
    #[error("column in section {column} cannot be added to section query {section}")]
    SectionMismatch {
        section: SectionIndex,
        column: SectionIndex,
    },
}

impl Error {
    /// Wrap a host binding failure
    pub fn host<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Host(err.into())
    }

    /// Create a malformed-result error with a message
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Error::MalformedResult(msg.into())
    }

    /// True for errors raised while building a query
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    /// True for failed name or section lookups
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ColumnNotFound(_) | Error::SectionNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err: Error = ConfigError::DuplicateColumn("PinX".into()).into();
        assert!(err.is_configuration());
        assert!(!err.is_not_found());

        let err = Error::ColumnNotFound("Width".into());
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Column not found: Width");
    }

    #[test]
    fn test_host_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = Error::host(io);
        assert!(matches!(err, Error::Host(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
