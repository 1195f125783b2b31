mod cycle;
mod state;

pub use cycle::{CycleOutcome, CycleRecord, FailureKind, RetryConfig, Tracker};
pub use state::{StateMachine, Transition};
