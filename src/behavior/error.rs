//! Error taxonomy for the metadata behavior.

use std::fmt;
use thiserror::Error;

/// Content operation guarded by a per-row role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Update => f.write_str("update"),
            Operation::Delete => f.write_str("delete"),
        }
    }
}

#[derive(Debug, Error)]
pub enum MetaError {
    /// Setup defect: missing or invalid addressing, unknown model or relation.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("not authorized to {operation} {model} #{id}: role `{role}` required")]
    Authorization {
        operation: Operation,
        model: String,
        id: i64,
        role: String,
    },

    #[error("{model} has no identity yet")]
    MissingIdentity { model: String },

    #[error("not found: {0}")]
    NotFound(String),

    /// The content change went through but the companion metadata step failed.
    #[error("{model} #{id} {operation} succeeded but its metadata was not maintained: {source}")]
    Inconsistent {
        model: String,
        id: i64,
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type MetaResult<T> = std::result::Result<T, MetaError>;

impl MetaError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        MetaError::Configuration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_message_names_role() {
        let err = MetaError::Authorization {
            operation: Operation::Delete,
            model: "Page".to_string(),
            id: 7,
            role: "Editor".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "not authorized to delete Page #7: role `Editor` required"
        );
    }

    #[test]
    fn test_inconsistent_keeps_source() {
        let err = MetaError::Inconsistent {
            model: "Page".to_string(),
            id: 3,
            operation: "save",
            source: sqlx::Error::RowNotFound,
        };
        assert!(err.to_string().starts_with("Page #3 save succeeded"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
