//! The placement transition rule
//!
//! Pure decision logic, no I/O and no state. The placement service only
//! consults the rule once a window has satisfied the level's criterion.

use gradus_common::{Verdict, PROGRESSION_THRESHOLD, RATIO_DECIMALS, REGRESSION_THRESHOLD};

/// Maps a window's success ratio and neighbor availability to a verdict
///
/// Both thresholds are strict: exactly 0.95 does not progress and exactly
/// 0.5 does not regress. A missing neighbor clamps the verdict to
/// stagnation, so the top and bottom of a track absorb would-be moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionRule;

impl TransitionRule {
    pub fn decide(&self, ratio: f64, has_prev: bool, has_next: bool) -> Verdict {
        if ratio > PROGRESSION_THRESHOLD && has_next {
            Verdict::Progression
        } else if ratio < REGRESSION_THRESHOLD && has_prev {
            Verdict::Regression
        } else {
            Verdict::Stagnation
        }
    }
}

/// Round a success ratio to the persisted precision
pub fn round_ratio(ratio: f64) -> f64 {
    let scale = 10f64.powi(RATIO_DECIMALS as i32);
    (ratio * scale).round() / scale
}
