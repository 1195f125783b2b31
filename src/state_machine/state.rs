use std::fmt;

use serde::{Deserialize, Serialize};

use super::cycle::{CycleOutcome, FailureKind, Tracker};

/// The three states of the order tracker.
///
/// `Idle ⇄ Tracking`, and either may fall into the terminal `Crashed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackerState {
    /// No share link is being tracked.
    Idle,
    /// A link is present and the order is not delivered yet.
    Tracking,
    /// Too many failures in a row; the process is about to exit.
    Crashed,
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerState::Idle => write!(f, "IDLE"),
            TrackerState::Tracking => write!(f, "TRACKING"),
            TrackerState::Crashed => write!(f, "CRASHED"),
        }
    }
}

/// The result of evaluating a cycle outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Move to (or stay in) a live state and wait for the next poll.
    Next(TrackerState),
    /// The cycle failed but the failure budget is not spent.
    Retry { attempt: u32, reason: FailureKind },
    /// Terminal; the poller must stop.
    Crash(FailureKind),
}

/// Drives a [`Tracker`] from one cycle to the next.
pub struct StateMachine;

impl StateMachine {
    /// Compute and apply the transition for `outcome`.
    ///
    /// - A successful cycle moves to `Idle` when there is nothing to track
    ///   or the link was just cleared, otherwise to `Tracking`. The failure
    ///   counter resets.
    /// - A failed cycle keeps the current state and retries while the
    ///   counter is within `max_retries`; past that it crashes.
    /// - `Crashed` is terminal and always returns `Crash`.
    pub fn next(tracker: &mut Tracker, outcome: CycleOutcome) -> Transition {
        tracker.cycles += 1;

        if tracker.state == TrackerState::Crashed {
            let reason = match outcome {
                CycleOutcome::Failed(kind) => kind,
                _ => FailureKind::AlreadyCrashed,
            };
            return Transition::Crash(reason);
        }

        match outcome {
            CycleOutcome::NoTrackedLink => Self::settle(tracker, TrackerState::Idle),
            CycleOutcome::StatusWritten { cleared: true, .. } => {
                Self::settle(tracker, TrackerState::Idle)
            }
            CycleOutcome::StatusWritten { cleared: false, .. } => {
                Self::settle(tracker, TrackerState::Tracking)
            }
            CycleOutcome::Failed(kind) => Self::handle_failure(tracker, kind),
        }
    }

    fn settle(tracker: &mut Tracker, state: TrackerState) -> Transition {
        tracker.consecutive_failures = 0;
        tracker.state = state;
        Transition::Next(state)
    }

    fn handle_failure(tracker: &mut Tracker, kind: FailureKind) -> Transition {
        tracker.consecutive_failures += 1;
        if tracker.consecutive_failures <= tracker.retry_config.max_retries {
            Transition::Retry {
                attempt: tracker.consecutive_failures,
                reason: kind,
            }
        } else {
            tracker.state = TrackerState::Crashed;
            Transition::Crash(kind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::RetryConfig;
    use crate::ubereats::OrderStatus;

    fn make_tracker(max_retries: u32) -> Tracker {
        Tracker::new(RetryConfig {
            max_retries,
            ..Default::default()
        })
    }

    fn written(status: OrderStatus, cleared: bool) -> CycleOutcome {
        CycleOutcome::StatusWritten { status, cleared }
    }

    fn vendor_failure() -> CycleOutcome {
        CycleOutcome::Failed(FailureKind::Vendor("request failed with status code 500".into()))
    }

    #[test]
    fn order_lifecycle_walks_idle_tracking_idle() {
        let mut tracker = make_tracker(0);

        let t = StateMachine::next(&mut tracker, CycleOutcome::NoTrackedLink);
        assert_eq!(t, Transition::Next(TrackerState::Idle));

        let t = StateMachine::next(&mut tracker, written(OrderStatus::Vendor("preparing".into()), false));
        assert_eq!(t, Transition::Next(TrackerState::Tracking));

        let t = StateMachine::next(&mut tracker, written(OrderStatus::EnrouteToEater, false));
        assert_eq!(t, Transition::Next(TrackerState::Tracking));

        let t = StateMachine::next(&mut tracker, written(OrderStatus::Delivered, true));
        assert_eq!(t, Transition::Next(TrackerState::Idle));
        assert_eq!(tracker.cycles, 4);
    }

    #[test]
    fn zero_retries_crashes_immediately() {
        let mut tracker = make_tracker(0);
        StateMachine::next(&mut tracker, written(OrderStatus::Unknown, false));

        let t = StateMachine::next(&mut tracker, vendor_failure());
        assert!(matches!(t, Transition::Crash(FailureKind::Vendor(_))));
        assert_eq!(tracker.state, TrackerState::Crashed);
    }

    #[test]
    fn failures_retry_then_crash() {
        let mut tracker = make_tracker(2);
        StateMachine::next(&mut tracker, written(OrderStatus::Unknown, false));

        let t = StateMachine::next(&mut tracker, vendor_failure());
        assert!(matches!(t, Transition::Retry { attempt: 1, .. }));
        assert_eq!(tracker.state, TrackerState::Tracking);

        let t = StateMachine::next(&mut tracker, vendor_failure());
        assert!(matches!(t, Transition::Retry { attempt: 2, .. }));

        let t = StateMachine::next(&mut tracker, vendor_failure());
        assert!(matches!(t, Transition::Crash(_)));
        assert_eq!(tracker.state, TrackerState::Crashed);
    }

    #[test]
    fn success_resets_failure_count() {
        let mut tracker = make_tracker(1);

        let t = StateMachine::next(&mut tracker, vendor_failure());
        assert!(matches!(t, Transition::Retry { attempt: 1, .. }));

        StateMachine::next(&mut tracker, CycleOutcome::NoTrackedLink);
        assert_eq!(tracker.consecutive_failures, 0);

        let t = StateMachine::next(&mut tracker, vendor_failure());
        assert!(matches!(t, Transition::Retry { attempt: 1, .. }));
    }

    #[test]
    fn crashed_is_terminal() {
        let mut tracker = make_tracker(0);
        StateMachine::next(&mut tracker, vendor_failure());
        assert_eq!(tracker.state, TrackerState::Crashed);

        let t = StateMachine::next(&mut tracker, CycleOutcome::NoTrackedLink);
        assert_eq!(t, Transition::Crash(FailureKind::AlreadyCrashed));
        assert_eq!(tracker.state, TrackerState::Crashed);

        let t = StateMachine::next(&mut tracker, written(OrderStatus::Delivered, true));
        assert_eq!(t, Transition::Crash(FailureKind::AlreadyCrashed));
        assert_eq!(tracker.consecutive_failures, 1);
    }

    #[test]
    fn crashed_keeps_the_reported_failure() {
        let mut tracker = make_tracker(0);
        StateMachine::next(&mut tracker, vendor_failure());

        let store = FailureKind::Store("Home Assistant rejected the access token".into());
        let t = StateMachine::next(&mut tracker, CycleOutcome::Failed(store.clone()));
        assert_eq!(t, Transition::Crash(store));
    }

    #[test]
    fn state_display() {
        assert_eq!(TrackerState::Idle.to_string(), "IDLE");
        assert_eq!(TrackerState::Tracking.to_string(), "TRACKING");
        assert_eq!(TrackerState::Crashed.to_string(), "CRASHED");
    }
}
