//! Minimum response period (MRP) calculator
//!
//! The deadline for a round is derived from how quickly participants have
//! actually been responding: take the median of the historical gap samples
//! in scope, scale it by the discussion's RTM, and never go below the MRM
//! floor. A discussion with no samples yet simply gets the floor.

use crate::config::MrpScope;
use crate::discussion::ResponseParams;
use crate::round::Round;

/// Gather the response-time samples the scope setting selects
///
/// Rounds are matched by number, so the slice may be in any order and may
/// include rounds after `current_round` (they are ignored).
pub fn sample_pool(rounds: &[Round], current_round: u32, scope: MrpScope) -> Vec<f64> {
    let in_scope = |number: u32| match scope {
        MrpScope::CurrentRound => number == current_round,
        MrpScope::LastRounds(n) => {
            number <= current_round && number > current_round.saturating_sub(n)
        }
        MrpScope::AllRounds => number <= current_round,
    };

    rounds
        .iter()
        .filter(|r| in_scope(r.number))
        .flat_map(|r| r.response_times())
        .collect()
}

/// Median of a non-empty sample list; even-length pools average the middle
/// pair
fn median(samples: &mut [f64]) -> f64 {
    samples.sort_by(|a, b| a.total_cmp(b));
    let mid = samples.len() / 2;
    if samples.len() % 2 == 1 {
        samples[mid]
    } else {
        (samples[mid - 1] + samples[mid]) / 2.0
    }
}

/// Compute the deadline length in minutes for `current_round`
///
/// Empty pool yields the MRM unmodified; otherwise the scaled median,
/// clamped upward to MRM. There is no upper clamp here - the bounds on RTM
/// itself keep the result in range.
pub fn calculate_mrp(
    rounds: &[Round],
    current_round: u32,
    params: &ResponseParams,
    scope: MrpScope,
) -> f64 {
    let mut pool = sample_pool(rounds, current_round, scope);
    let floor = params.min_response_time_minutes as f64;
    if pool.is_empty() {
        return floor;
    }
    let scaled = median(&mut pool) * params.response_time_multiplier;
    scaled.max(floor)
}
