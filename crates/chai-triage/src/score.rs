use chai_core::model::todo::MAX_PRIORITY_MARKERS;
use serde::{Deserialize, Serialize};

/// Days of waiting after which the wait signal saturates.
const WAIT_WINDOW_DAYS: f64 = 14.0;

/// Days before the due date over which due pressure ramps up.
const DUE_HORIZON_DAYS: f64 = 7.0;

/// Days past the due date at which overdue pressure saturates.
const OVERDUE_SATURATION_DAYS: f64 = 7.0;

/// Raw signal values for one pending task.
///
/// Component functions clamp everything to `[0, 1]`, so the weighted sum
/// stays in `[0, 1]` for unit-sum weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalInputs {
    /// Days until the due date; negative when overdue, `None` when the
    /// task has no due date.
    pub days_until_due: Option<f64>,
    /// Days since the task was created.
    pub age_days: f64,
    /// Trailing `!` markers in the task text (0-3).
    pub priority: u8,
}

/// Configurable weights for the scoring formula:
///
/// `S(t) = alpha*DUE + beta*WAIT + gamma*PRIORITY`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalWeights<T = f64> {
    pub alpha: T,
    pub beta: T,
    pub gamma: T,
}

impl Default for SignalWeights<f64> {
    fn default() -> Self {
        Self {
            alpha: 0.55,
            beta: 0.20,
            gamma: 0.25,
        }
    }
}

/// Compute the recommendation score for one task from its signals.
#[must_use]
pub fn signal_score(inputs: &SignalInputs, weights: &SignalWeights) -> f64 {
    (weights.alpha * due_component(inputs.days_until_due))
        + (weights.beta * wait_component(inputs.age_days))
        + (weights.gamma * priority_component(inputs.priority))
}

/// Due pressure in `[0, 1]`.
///
/// No due date contributes nothing. An upcoming due date ramps from 0
/// (a horizon away) to 0.5 (due today); past due it climbs from 0.5
/// toward 1.0, saturating after [`OVERDUE_SATURATION_DAYS`].
pub(crate) fn due_component(days_until_due: Option<f64>) -> f64 {
    let Some(days) = days_until_due else {
        return 0.0;
    };
    if !days.is_finite() {
        return 0.0;
    }

    if days <= 0.0 {
        let overdue = (-days / OVERDUE_SATURATION_DAYS).clamp(0.0, 1.0);
        0.5 + 0.5 * overdue
    } else {
        0.5 * (1.0 - days / DUE_HORIZON_DAYS).clamp(0.0, 1.0)
    }
}

/// Waiting-time signal in `[0, 1]`: ramps over [`WAIT_WINDOW_DAYS`] so
/// old tasks are not starved by a stream of new ones.
pub(crate) fn wait_component(age_days: f64) -> f64 {
    if !age_days.is_finite() {
        return 0.0;
    }
    (age_days.max(0.0) / WAIT_WINDOW_DAYS).clamp(0.0, 1.0)
}

/// Priority-marker signal in `[0, 1]`.
pub(crate) fn priority_component(priority: u8) -> f64 {
    f64::from(priority.min(MAX_PRIORITY_MARKERS)) / f64::from(MAX_PRIORITY_MARKERS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_approx_eq(actual: f64, expected: f64) {
        let tolerance = 1e-10;
        assert!(
            (actual - expected).abs() <= tolerance,
            "actual ({actual}) != expected ({expected})"
        );
    }

    #[test]
    fn due_component_orders_overdue_above_upcoming() {
        let overdue = due_component(Some(-3.0));
        let today = due_component(Some(0.0));
        let tomorrow = due_component(Some(1.0));
        let far = due_component(Some(30.0));

        assert!(overdue > today);
        assert!(today > tomorrow);
        assert!(tomorrow > far);
        assert_approx_eq(today, 0.5);
        assert_approx_eq(far, 0.0);
    }

    #[test]
    fn due_component_saturates_when_long_overdue() {
        assert_approx_eq(due_component(Some(-7.0)), 1.0);
        assert_approx_eq(due_component(Some(-700.0)), 1.0);
    }

    #[test]
    fn due_component_handles_missing_and_nonfinite() {
        assert_approx_eq(due_component(None), 0.0);
        assert_approx_eq(due_component(Some(f64::NAN)), 0.0);
        assert_approx_eq(due_component(Some(f64::NEG_INFINITY)), 0.0);
    }

    #[test]
    fn wait_component_ramps_and_saturates() {
        assert_approx_eq(wait_component(0.0), 0.0);
        assert_approx_eq(wait_component(7.0), 0.5);
        assert_approx_eq(wait_component(14.0), 1.0);
        assert_approx_eq(wait_component(100.0), 1.0);
        assert_approx_eq(wait_component(-5.0), 0.0);
    }

    #[test]
    fn priority_component_caps_at_three_markers() {
        assert_approx_eq(priority_component(0), 0.0);
        assert_approx_eq(priority_component(3), 1.0);
        assert_approx_eq(priority_component(9), 1.0);
    }

    #[test]
    fn signal_score_applies_weighted_sum() {
        let score = signal_score(
            &SignalInputs {
                days_until_due: Some(0.0),
                age_days: 7.0,
                priority: 3,
            },
            &SignalWeights::default(),
        );
        // 0.55*0.5 + 0.20*0.5 + 0.25*1.0
        assert_approx_eq(score, 0.625);
    }

    proptest! {
        #[test]
        fn score_stays_in_unit_range_for_default_weights(
            days in proptest::option::of(-1000.0f64..1000.0),
            age in -10.0f64..5000.0,
            priority in 0u8..=10,
        ) {
            let score = signal_score(
                &SignalInputs {
                    days_until_due: days,
                    age_days: age,
                    priority,
                },
                &SignalWeights::default(),
            );
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn overdue_tasks_outscore_equal_tasks_due_later() {
        let weights = SignalWeights::default();
        let overdue = signal_score(
            &SignalInputs {
                days_until_due: Some(-2.0),
                age_days: 3.0,
                priority: 0,
            },
            &weights,
        );
        let upcoming = signal_score(
            &SignalInputs {
                days_until_due: Some(4.0),
                age_days: 3.0,
                priority: 0,
            },
            &weights,
        );
        assert!(overdue > upcoming);
    }
}
