//! Percentage arithmetic shared by tasks and sprints.

use serde::{Deserialize, Serialize};
use sprintboard_core::Seconds;

pub const PERCENT_DECIMALS: i32 = 2;

pub fn round_percent(value: f64) -> f64 {
    let factor = 10f64.powi(PERCENT_DECIMALS);
    (value * factor).round() / factor
}

/// `100 × part / whole`, rounded; 0 when `whole` is 0.
pub fn percent(part: Seconds, whole: Seconds) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_percent(100.0 * part as f64 / whole as f64)
}

/// Progress of logged time against an estimate. `progress` never exceeds 100;
/// the excess goes to `over_logged_time` and `over_progress`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressFigures {
    pub progress: f64,
    pub over_progress: f64,
    pub over_logged_time: Seconds,
}

pub fn compute_progress(logged: Seconds, estimate: Seconds) -> ProgressFigures {
    let over_logged_time = logged.saturating_sub(estimate);
    ProgressFigures {
        progress: percent(logged.min(estimate), estimate),
        over_progress: percent(over_logged_time, estimate),
        over_logged_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_logged() {
        let figures = compute_progress(18_000, 36_000);
        assert_eq!(figures.progress, 50.0);
        assert_eq!(figures.over_progress, 0.0);
        assert_eq!(figures.over_logged_time, 0);
    }

    #[test]
    fn test_over_logged_clamps_progress() {
        let figures = compute_progress(43_200, 36_000);
        assert_eq!(figures.progress, 100.0);
        assert_eq!(figures.over_logged_time, 7_200);
        assert_eq!(figures.over_progress, 20.0);
    }

    #[test]
    fn test_zero_estimate_displays_zero() {
        let figures = compute_progress(3_600, 0);
        assert_eq!(figures.progress, 0.0);
        assert_eq!(figures.over_progress, 0.0);
        assert_eq!(figures.over_logged_time, 3_600);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(percent(1, 3), 33.33);
        assert_eq!(percent(2, 3), 66.67);
    }
}
