//! Discussion entity and its tunable response parameters

use crate::config::EngineConfig;
use crate::core::ids::{DiscussionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three per-discussion response parameters adjusted by voting
///
/// - MRL: max response length in characters
/// - RTM: response time multiplier applied to the median
/// - MRM: minimum response time, the floor under every MRP
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseParams {
    pub max_response_length_chars: u32,
    pub response_time_multiplier: f64,
    pub min_response_time_minutes: u32,
}

impl ResponseParams {
    /// Clamp every parameter into the configured bounds
    pub fn clamped(self, config: &EngineConfig) -> Self {
        Self {
            max_response_length_chars: self
                .max_response_length_chars
                .clamp(config.mrl_min_chars, config.mrl_max_chars),
            response_time_multiplier: self
                .response_time_multiplier
                .clamp(config.rtm_min, config.rtm_max),
            min_response_time_minutes: self
                .min_response_time_minutes
                .clamp(config.mrm_min_minutes, config.mrm_max_minutes),
        }
    }

    pub fn within_bounds(&self, config: &EngineConfig) -> bool {
        *self == self.clamped(config)
    }
}

/// Whether a discussion still accepts activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscussionStatus {
    Active,
    Archived,
}

/// A deliberation topic with its tunable parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discussion {
    pub id: DiscussionId,
    pub topic: String,
    pub initiator: UserId,
    pub params: ResponseParams,
    pub status: DiscussionStatus,
    pub created_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl Discussion {
    pub fn new(
        topic: impl Into<String>,
        initiator: UserId,
        params: ResponseParams,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DiscussionId::new(),
            topic: topic.into(),
            initiator,
            params,
            status: DiscussionStatus::Active,
            created_at: now,
            archived_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == DiscussionStatus::Active
    }

    /// Move to archived status; idempotent
    pub fn archive(&mut self, now: DateTime<Utc>) {
        if self.status == DiscussionStatus::Active {
            self.status = DiscussionStatus::Archived;
            self.archived_at = Some(now);
        }
    }
}
