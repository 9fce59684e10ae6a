//! Store error types.
//!
//! Defined in `semnotes-core` so services can match on uniqueness violations
//! and missing documents without depending on a particular backend.

use thiserror::Error;

/// Errors that can occur when reading or writing the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("duplicate {collection}: {key}")]
    Duplicate {
        collection: &'static str,
        key: String,
    },

    /// The document to update does not exist.
    #[error("{collection} not found: {id}")]
    NotFound {
        collection: &'static str,
        id: String,
    },

    /// The backing file could not be read or written.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot could not be encoded or decoded.
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn duplicate(collection: &'static str, key: impl Into<String>) -> Self {
        StoreError::Duplicate {
            collection,
            key: key.into(),
        }
    }

    pub fn not_found(collection: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            collection,
            id: id.to_string(),
        }
    }

    /// Returns `true` if this error is a uniqueness violation.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::Duplicate { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_message_names_collection_and_key() {
        let err = StoreError::duplicate("users", "alice");
        assert!(err.is_duplicate());
        assert_eq!(err.to_string(), "duplicate users: alice");
    }

    #[test]
    fn not_found_is_not_duplicate() {
        let err = StoreError::not_found("topics", 42);
        assert!(!err.is_duplicate());
        assert!(err.to_string().contains("topics not found"));
    }
}
