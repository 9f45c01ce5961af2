//! Error types for strata.

use alloc::string::String;
use thiserror::Error;

/// Result type alias for strata operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for record storage, graph construction and formula evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A column could not be resolved among the given sources or record type.
    #[error("column \"{column}\" not found in sources")]
    ColumnNotFound { column: String },
    /// Two record types were expected to match.
    #[error("record type mismatch: expected ({expected}), found ({found})")]
    SchemaMismatch { expected: String, found: String },
    /// Invalid record type definition.
    #[error("invalid record type: {message}")]
    InvalidSchema { message: String },
    /// Wrong number of values or arguments.
    #[error("expected {expected} values, found {found}")]
    Arity { expected: usize, found: usize },
    /// Absolute record addressing beyond the available records.
    #[error("record index {index} out of range ({available} records)")]
    IndexOutOfRange { index: isize, available: usize },
    /// Malformed or disallowed expression text.
    #[error("compile error at {position}: {message}")]
    Compile { message: String, position: usize },
    /// An operator was applied to values it does not support.
    #[error("unsupported operand types for {op}: {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
    /// Runtime failure while evaluating a formula.
    #[error("evaluation failed: {message}")]
    Evaluation { message: String },
    /// Invalid operation.
    #[error("invalid operation: {message}")]
    InvalidOperation { message: String },
}

impl Error {
    /// Creates a column not found error.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Creates a schema mismatch error.
    pub fn schema_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::SchemaMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Error::InvalidSchema {
            message: message.into(),
        }
    }

    /// Creates an arity error.
    pub fn arity(expected: usize, found: usize) -> Self {
        Error::Arity { expected, found }
    }

    /// Creates an index out of range error.
    pub fn index_out_of_range(index: isize, available: usize) -> Self {
        Error::IndexOutOfRange { index, available }
    }

    /// Creates a compile error at the given byte offset.
    pub fn compile(message: impl Into<String>, position: usize) -> Self {
        Error::Compile {
            message: message.into(),
            position,
        }
    }

    /// Creates a type mismatch error for a binary operator.
    pub fn type_mismatch(op: &'static str, left: &'static str, right: &'static str) -> Self {
        Error::TypeMismatch { op, left, right }
    }

    /// Creates an evaluation error.
    pub fn evaluation(message: impl Into<String>) -> Self {
        Error::Evaluation {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Error::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true for errors raised while wiring sources and schemas together.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::ColumnNotFound { .. } | Error::SchemaMismatch { .. } | Error::InvalidSchema { .. }
        )
    }
}
