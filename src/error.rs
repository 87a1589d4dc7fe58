//! Error types shared by the value types, the schema registry and the planner.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A semantic equality check was handed a value of another kind.
    #[error("expected value type {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    /// A JSON document held a value that cannot be read as the attribute type.
    #[error("invalid value for {attr_type}: {reason}")]
    InvalidValue { attr_type: String, reason: String },

    #[error("schema error: {0}")]
    Schema(String),

    #[error("invalid document: {0}")]
    Document(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn type_mismatch(expected: impl ToString, got: impl ToString) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }

    pub(crate) fn invalid_value(attr_type: impl ToString, reason: impl ToString) -> Self {
        Error::InvalidValue {
            attr_type: attr_type.to_string(),
            reason: reason.to_string(),
        }
    }
}
