use crate::session::StoreError;
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Every failure surfaced by keyspace, table, query, and CRUD operations.
/// Store errors pass through unchanged; everything else is detected locally
/// before any statement is sent.
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("no row found in table '{table}'")]
    NotFound { table: String },

    #[error("replication options could not be rendered: {0}")]
    Options(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("column '{column}' has no store type for a {kind} value")]
    UnmappableType { column: String, kind: &'static str },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Configuration(_) => ErrorClass::Configuration,
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::Options(_) | Self::Validation(_) => ErrorClass::Validation,
            Self::Store(_) => ErrorClass::Store,
            Self::UnmappableType { .. } => ErrorClass::Unsupported,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}: {self}", self.class())
    }
}

///
/// ConfigurationError
///
/// Programmer errors in a record type's field layout.
/// Raised while the type's metadata is first built and never recovered from.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigurationError {
    #[error("duplicated key '{name}' in record {record}")]
    DuplicateField { record: &'static str, name: &'static str },
}

///
/// ValidationError
///
/// Local invariant violations; the statement is never sent.
///

#[remain::sorted]
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ValidationError {
    #[error("{op} on '{table}' failed due to missing key value (for key '{key}')")]
    MissingKey {
        table: String,
        op: &'static str,
        key: String,
    },

    #[error("table '{table}' has no partition key")]
    MissingPartitionKey { table: String },

    #[error("{op} on '{table}' has no non-key columns to set")]
    NoValueColumns { table: String, op: &'static str },

    #[error("too few key values to {op} row in '{table}' ({found} of the required {required})")]
    TooFewKeys {
        table: String,
        op: &'static str,
        found: usize,
        required: usize,
    },

    #[error("too many key values to {op} row in '{table}' ({found} of the required {required})")]
    TooManyKeys {
        table: String,
        op: &'static str,
        found: usize,
        required: usize,
    },
}

///
/// ErrorClass
/// Stable classification of `Error` for callers that branch on failure kind.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Configuration,
    Validation,
    Unsupported,
    NotFound,
    Store,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Configuration => "configuration",
            Self::Validation => "validation",
            Self::Unsupported => "unsupported",
            Self::NotFound => "not_found",
            Self::Store => "store",
        };
        write!(f, "{label}")
    }
}
