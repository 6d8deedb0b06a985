//! In-memory fakes for use case tests

use crate::ports::clock::Clock;
use crate::ports::event_sink::{EngineEvent, EventSink};
use crate::ports::store::{DiscussionStore, StoreError};
use agora_domain::{DiscussionId, DiscussionState};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Version-checked in-memory store
#[derive(Default)]
pub struct FakeStore {
    states: Mutex<HashMap<DiscussionId, DiscussionState>>,
}

#[async_trait]
impl DiscussionStore for FakeStore {
    async fn insert(&self, state: DiscussionState) -> Result<(), StoreError> {
        let mut states = self.states.lock().unwrap();
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
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn save(&self, mut state: DiscussionState) -> Result<(), StoreError> {
        let mut states = self.states.lock().unwrap();
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
            .unwrap()
            .values()
            .filter(|s| s.discussion.is_active())
            .map(|s| s.discussion.id)
            .collect())
    }
}

/// Clock advanced by hand from tests
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance_minutes(&self, minutes: i64) {
        *self.now.lock().unwrap() += Duration::minutes(minutes);
    }

    pub fn advance_days(&self, days: i64) {
        *self.now.lock().unwrap() += Duration::days(days);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Sink that records every published event
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl CollectingSink {
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for CollectingSink {
    fn publish(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}
