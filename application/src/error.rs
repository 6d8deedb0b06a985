//! Application-level error type

use crate::ports::store::StoreError;
use agora_domain::DomainError;
use thiserror::Error;

/// Errors surfaced by the engine use cases
#[derive(Error, Debug)]
pub enum EngineError {
    /// A domain invariant rejected the operation
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The persistence boundary failed or detected a conflict
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Whether this is an optimistic-concurrency conflict, which ticks
    /// treat as "someone else already did the work"
    pub fn is_conflict(&self) -> bool {
        matches!(self, EngineError::Store(StoreError::Conflict(_)))
    }
}
