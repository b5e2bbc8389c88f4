use std::path::PathBuf;

use balloon_model::SchemaError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to process CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to process JSON {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing column {column:?} in {path}")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("invalid value in {path}: {message}")]
    InvalidValue { path: PathBuf, message: String },

    #[error("invalid schema in {path}: {source}")]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },

    #[error("failed to move {staged} into place at {target}: {source}")]
    AtomicSwapFailed {
        staged: PathBuf,
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn schema(path: impl Into<PathBuf>, source: SchemaError) -> Self {
        Self::Schema {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
