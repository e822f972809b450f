//! Posture quality classification with edge-triggered alerting.
//!
//! Classification is a pure function of the delta magnitude against the
//! medical thresholds; the alert edge detection is the only state carried
//! across evaluations.

use serde::{Deserialize, Serialize};

/// Deltas at or below this magnitude (degrees) are good posture.
pub const GOOD_POSTURE_THRESHOLD: f32 = 15.0;
/// Deltas at or below this magnitude (degrees) warrant a correction.
pub const WARNING_THRESHOLD: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PostureState {
    Good,
    Warning,
    Bad,
}

impl PostureState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostureState::Good => "Good",
            PostureState::Warning => "Warning",
            PostureState::Bad => "Bad",
        }
    }
}

/// Classify a posture delta (degrees from the calibration baseline).
/// Boundaries are inclusive: exactly 15 is Good, exactly 20 is Warning.
pub fn classify(delta_deg: f32) -> PostureState {
    let magnitude = delta_deg.abs();
    if magnitude <= GOOD_POSTURE_THRESHOLD {
        PostureState::Good
    } else if magnitude <= WARNING_THRESHOLD {
        PostureState::Warning
    } else {
        PostureState::Bad
    }
}

/// Outcome of one monitoring evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub state: PostureState,
    /// True only on a transition into Warning or Bad. Entering Good never
    /// alerts, and repeated ticks in the same non-Good state do not
    /// re-alert.
    pub should_alert: bool,
}

/// Tracks the previously emitted state for alert edge detection.
#[derive(Debug, Default)]
pub struct PostureTracker {
    previous: Option<PostureState>,
}

impl PostureTracker {
    pub fn new() -> Self {
        Self { previous: None }
    }

    /// Re-derive the state from the current delta and record it. The
    /// previous state is updated on every evaluation, including into
    /// Good, so re-entering Warning or Bad after passing through Good
    /// triggers again.
    pub fn evaluate(&mut self, delta_deg: f32) -> Evaluation {
        let state = classify(delta_deg);
        let should_alert = state != PostureState::Good && self.previous != Some(state);
        self.previous = Some(state);
        Evaluation {
            state,
            should_alert,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_inclusive() {
        assert_eq!(classify(15.0), PostureState::Good);
        assert_eq!(classify(15.01), PostureState::Warning);
        assert_eq!(classify(20.0), PostureState::Warning);
        assert_eq!(classify(20.01), PostureState::Bad);
    }

    #[test]
    fn classification_uses_delta_magnitude() {
        assert_eq!(classify(-10.0), PostureState::Good);
        assert_eq!(classify(-18.0), PostureState::Warning);
        assert_eq!(classify(-45.0), PostureState::Bad);
    }

    #[test]
    fn repeated_warning_alerts_once() {
        let mut tracker = PostureTracker::new();
        let deltas = [5.0, 17.0, 18.0, 19.0];
        let alerts: Vec<bool> = deltas
            .iter()
            .map(|&d| tracker.evaluate(d).should_alert)
            .collect();
        assert_eq!(alerts, vec![false, true, false, false]);
    }

    #[test]
    fn passing_through_good_rearms_the_alert() {
        let mut tracker = PostureTracker::new();
        assert!(tracker.evaluate(17.0).should_alert);
        assert!(!tracker.evaluate(3.0).should_alert);
        assert!(tracker.evaluate(17.0).should_alert);
    }

    #[test]
    fn warning_to_bad_is_a_new_edge() {
        let mut tracker = PostureTracker::new();
        assert!(tracker.evaluate(18.0).should_alert);
        assert!(tracker.evaluate(25.0).should_alert);
        assert!(!tracker.evaluate(30.0).should_alert);
    }

    #[test]
    fn first_evaluation_in_good_never_alerts() {
        let mut tracker = PostureTracker::new();
        let eval = tracker.evaluate(0.0);
        assert_eq!(eval.state, PostureState::Good);
        assert!(!eval.should_alert);
    }
}
