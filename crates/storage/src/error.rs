use thiserror::Error;

/// Failure reported by a store adapter (MongoDB, Redis or an in-memory fake)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
}

/// Repository-level error. Every store-originated variant carries the name
/// of the operation that produced it.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{operation}: store unavailable: {source}")]
    StoreUnavailable {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("{operation}: document {id} already exists")]
    Duplicate { operation: &'static str, id: String },

    #[error("{operation}: timed out")]
    Timeout { operation: &'static str },

    #[error("{operation}: cancelled")]
    Cancelled { operation: &'static str },

    #[error("{operation}: malformed record: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },
}

impl StorageError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StorageError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Annotate an adapter failure with the operation that hit it
    pub fn store(operation: &'static str, source: StoreError) -> Self {
        match source {
            StoreError::DuplicateKey(id) => StorageError::Duplicate { operation, id },
            source => StorageError::StoreUnavailable { operation, source },
        }
    }

    pub fn decode(operation: &'static str, err: impl std::fmt::Display) -> Self {
        StorageError::Decode {
            operation,
            message: err.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

impl From<validator::ValidationErrors> for StorageError {
    fn from(errors: validator::ValidationErrors) -> Self {
        StorageError::Validation(errors.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
