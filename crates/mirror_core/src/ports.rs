//! crates/mirror_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete model provider and record store.

use async_trait::async_trait;

use crate::domain::{ContentEntry, NewContentEntry};
use crate::schema::ResponseSchema;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The caller supplied input the operation refuses before doing any work.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The backend call did not complete: connectivity, backend error, or a rejected credential.
    #[error("Analysis backend request failed: {0}")]
    Transport(String),
    /// The backend answered with an empty body or with something that is not JSON.
    #[error("Malformed response from analysis backend: {0}")]
    MalformedResponse(String),
    /// The backend answered with JSON that does not satisfy the declared schema.
    #[error("Incomplete response from analysis backend: {0}")]
    IncompleteResponse(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// Whether re-triggering the same action could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PortError::Transport(_)
                | PortError::MalformedResponse(_)
                | PortError::IncompleteResponse(_)
        )
    }

    /// A stable machine-readable name for the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            PortError::NotFound(_) => "not_found",
            PortError::InvalidInput(_) => "invalid_input",
            PortError::Transport(_) => "transport_failure",
            PortError::MalformedResponse(_) => "malformed_response",
            PortError::IncompleteResponse(_) => "incomplete_response",
            PortError::Unexpected(_) => "unexpected",
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait StructuredGenerationService: Send + Sync {
    /// Sends one prompt to the remote model, constrained to `schema`, and returns
    /// the raw response text. Decoding is the caller's job.
    async fn generate_structured(&self, prompt: &str, schema: &ResponseSchema)
        -> PortResult<String>;
}

/// The append-only collection of historical content records.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Returns every record in insertion order.
    async fn list(&self) -> PortResult<Vec<ContentEntry>>;

    /// Stores a new record under a freshly assigned id and returns it.
    async fn append(&self, entry: NewContentEntry) -> PortResult<ContentEntry>;

    async fn get(&self, id: &str) -> PortResult<ContentEntry>;

    /// Number of stored records.
    async fn count(&self) -> PortResult<usize>;
}
