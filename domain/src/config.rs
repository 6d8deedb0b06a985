//! Engine configuration
//!
//! A single `EngineConfig` value is passed explicitly into every core
//! function that needs a tunable. There is no global config singleton; the
//! application layer obtains a snapshot per tick from its `ConfigProvider`
//! port and the snapshot stays immutable for the duration of that tick.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which historical response-time samples feed the MRP calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MrpScope {
    /// Samples from the current round only
    #[default]
    CurrentRound,
    /// Samples from the current round plus the previous n-1 rounds
    LastRounds(u32),
    /// Samples from every round up to and including the current one
    AllRounds,
}

/// Platform-wide tunables, validated at the configuration boundary
///
/// Out-of-range values are rejected by [`EngineConfig::validate`] before a
/// config ever reaches the core, so resolvers and calculators can assume the
/// bounds are coherent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Percentage applied by a winning increase/decrease vote
    pub vote_increment_pct: u32,
    /// Fraction of the electorate that must vote for removal (strict)
    pub removal_vote_threshold: f64,

    /// Sample scope for the MRP calculator
    pub mrp_scope: MrpScope,
    /// Responses required before a round's MRP is finalized
    pub responses_before_mrp: u32,

    // Response parameter bounds
    pub mrl_min_chars: u32,
    pub mrl_max_chars: u32,
    pub rtm_min: f64,
    pub rtm_max: f64,
    pub mrm_min_minutes: u32,
    pub mrm_max_minutes: u32,

    // Discussion termination caps; 0 disables a cap
    pub max_discussion_duration_days: u32,
    pub max_discussion_rounds: u32,
    pub max_discussion_responses: u32,

    /// Days a first round may sit below its response threshold before the
    /// discussion is archived
    pub round_one_timeout_days: u32,

    // Voting participation credits
    pub platform_credit_per_vote: f64,
    pub discussion_credit_per_vote: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vote_increment_pct: 20,
            removal_vote_threshold: 0.5,
            mrp_scope: MrpScope::CurrentRound,
            responses_before_mrp: 2,
            mrl_min_chars: 100,
            mrl_max_chars: 5000,
            rtm_min: 0.5,
            rtm_max: 2.0,
            mrm_min_minutes: 5,
            mrm_max_minutes: 1440,
            max_discussion_duration_days: 90,
            max_discussion_rounds: 50,
            max_discussion_responses: 500,
            round_one_timeout_days: 7,
            platform_credit_per_vote: 0.2,
            discussion_credit_per_vote: 1,
        }
    }
}

/// Violations found while validating an [`EngineConfig`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("vote_increment_pct must be between 1 and 100 (got {0})")]
    InvalidIncrement(u32),

    #[error("removal_vote_threshold must be within (0, 1] (got {0})")]
    InvalidRemovalThreshold(f64),

    #[error("{name} bounds are inverted: min {min} > max {max}")]
    InvertedBounds {
        name: &'static str,
        min: f64,
        max: f64,
    },

    #[error("mrp scope window must cover at least one round")]
    EmptyScopeWindow,

    #[error("responses_before_mrp must be at least 1")]
    ZeroResponseThreshold,
}

impl EngineConfig {
    /// Reject incoherent tunables before they reach the core
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.vote_increment_pct == 0 || self.vote_increment_pct > 100 {
            return Err(ConfigValidationError::InvalidIncrement(
                self.vote_increment_pct,
            ));
        }
        if self.removal_vote_threshold <= 0.0 || self.removal_vote_threshold > 1.0 {
            return Err(ConfigValidationError::InvalidRemovalThreshold(
                self.removal_vote_threshold,
            ));
        }
        if self.mrl_min_chars > self.mrl_max_chars {
            return Err(ConfigValidationError::InvertedBounds {
                name: "mrl",
                min: self.mrl_min_chars as f64,
                max: self.mrl_max_chars as f64,
            });
        }
        if self.rtm_min > self.rtm_max {
            return Err(ConfigValidationError::InvertedBounds {
                name: "rtm",
                min: self.rtm_min,
                max: self.rtm_max,
            });
        }
        if self.mrm_min_minutes > self.mrm_max_minutes {
            return Err(ConfigValidationError::InvertedBounds {
                name: "mrm",
                min: self.mrm_min_minutes as f64,
                max: self.mrm_max_minutes as f64,
            });
        }
        if let MrpScope::LastRounds(0) = self.mrp_scope {
            return Err(ConfigValidationError::EmptyScopeWindow);
        }
        if self.responses_before_mrp == 0 {
            return Err(ConfigValidationError::ZeroResponseThreshold);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_increment() {
        let config = EngineConfig {
            vote_increment_pct: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidIncrement(0))
        );
    }

    #[test]
    fn test_rejects_threshold_above_one() {
        let config = EngineConfig {
            removal_vote_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidRemovalThreshold(_))
        ));
    }

    #[test]
    fn test_rejects_inverted_mrl_bounds() {
        let config = EngineConfig {
            mrl_min_chars: 6000,
            mrl_max_chars: 5000,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvertedBounds { name: "mrl", .. })
        ));
    }

    #[test]
    fn test_rejects_empty_scope_window() {
        let config = EngineConfig {
            mrp_scope: MrpScope::LastRounds(0),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::EmptyScopeWindow)
        );
    }
}
