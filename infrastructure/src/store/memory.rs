//! In-memory discussion store
//!
//! Version-checked map of aggregates. The mutex is held only across the
//! map operation itself, never across an await on caller code, so the
//! compare-and-swap on the version is genuinely atomic.

use agora_application::ports::store::{DiscussionStore, StoreError};
use agora_domain::{DiscussionId, DiscussionState};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Store backed by a process-local map
#[derive(Default)]
pub struct MemoryStore {
    states: Mutex<HashMap<DiscussionId, DiscussionState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of discussions held, active or archived
    pub async fn len(&self) -> usize {
        self.states.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.lock().await.is_empty()
    }
}

#[async_trait]
impl DiscussionStore for MemoryStore {
    async fn insert(&self, state: DiscussionState) -> Result<(), StoreError> {
        let mut states = self.states.lock().await;
        let id = state.discussion.id;
        if states.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        states.insert(id, state);
        Ok(())
    }

    async fn load(&self, id: DiscussionId) -> Result<DiscussionState, StoreError> {
        self.states
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn save(&self, mut state: DiscussionState) -> Result<(), StoreError> {
        let mut states = self.states.lock().await;
        let id = state.discussion.id;
        let stored = states.get(&id).ok_or(StoreError::NotFound(id))?;
        if stored.version != state.version {
            return Err(StoreError::Conflict(id));
        }
        state.version += 1;
        states.insert(id, state);
        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<DiscussionId>, StoreError> {
        Ok(self
            .states
            .lock()
            .await
            .values()
            .filter(|s| s.discussion.is_active())
            .map(|s| s.discussion.id)
            .collect())
    }
}
