//! Discussion persistence port
//!
//! The store holds one `DiscussionState` aggregate per discussion and
//! enforces optimistic concurrency: a save carries the version the caller
//! loaded, and the store rejects it with `Conflict` if another writer got
//! there first. That single rule is what keeps concurrent ticks from
//! double-advancing a round or double-awarding credits.

use agora_domain::{DiscussionId, DiscussionState};
use async_trait::async_trait;
use thiserror::Error;

/// Errors from the persistence boundary
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("discussion {0} not found")]
    NotFound(DiscussionId),

    #[error("discussion {0} already exists")]
    AlreadyExists(DiscussionId),

    #[error("discussion {0} was modified concurrently")]
    Conflict(DiscussionId),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Persistence for discussion aggregates
///
/// Implementations live in the infrastructure layer.
#[async_trait]
pub trait DiscussionStore: Send + Sync {
    /// Insert a new aggregate; fails if the id is taken
    async fn insert(&self, state: DiscussionState) -> Result<(), StoreError>;

    /// Load the current aggregate, version included
    async fn load(&self, id: DiscussionId) -> Result<DiscussionState, StoreError>;

    /// Save an aggregate loaded at `state.version`
    ///
    /// Succeeds only if the stored version still matches; the stored copy
    /// then carries `state.version + 1`.
    async fn save(&self, state: DiscussionState) -> Result<(), StoreError>;

    /// Ids of every discussion still active, for the periodic tick
    async fn list_active(&self) -> Result<Vec<DiscussionId>, StoreError>;
}
