use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::TrackerState;
use crate::error::TrackerError;
use crate::ubereats::{OrderStatus, UberEatsError};

/// Classifies a failed cycle for logging. Every kind counts toward the
/// consecutive failure limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The tracked link has no order UUID. Needs a human to fix the link.
    ShareLink(String),
    /// Uber Eats rejected the request or answered with something unexpected.
    Vendor(String),
    /// Home Assistant was unreachable or refused the call.
    Store(String),
    /// A cycle outcome arrived after the tracker had already crashed.
    AlreadyCrashed,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::ShareLink(msg) => write!(f, "Share link failure: {msg}"),
            FailureKind::Vendor(msg) => write!(f, "Vendor failure: {msg}"),
            FailureKind::Store(msg) => write!(f, "Store failure: {msg}"),
            FailureKind::AlreadyCrashed => write!(f, "Tracker already crashed"),
        }
    }
}

impl From<&TrackerError> for FailureKind {
    fn from(err: &TrackerError) -> Self {
        match err {
            TrackerError::UberEats(e @ UberEatsError::Extraction { .. }) => {
                FailureKind::ShareLink(e.to_string())
            }
            TrackerError::UberEats(e) => FailureKind::Vendor(e.to_string()),
            TrackerError::HomeAssistant(e) => FailureKind::Store(e.to_string()),
        }
    }
}

/// What one poll cycle did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleOutcome {
    /// The URL entity was empty or `unknown`; nothing was called.
    NoTrackedLink,
    /// The sensor was updated, and the link cleared if `cleared`.
    StatusWritten { status: OrderStatus, cleared: bool },
    Failed(FailureKind),
}

/// Configuration for retry behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Consecutive failures tolerated before the tracker crashes.
    pub max_retries: u32,
    /// Base delay in milliseconds for exponential backoff.
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 1000,
        }
    }
}

impl RetryConfig {
    /// delay = base_delay_ms * 2^(attempt - 1)
    pub fn delay_for_attempt(&self, attempt: u32) -> u64 {
        self.base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Mutable state carried between cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tracker {
    pub state: TrackerState,
    pub consecutive_failures: u32,
    pub cycles: u64,
    pub retry_config: RetryConfig,
}

impl Tracker {
    pub fn new(retry_config: RetryConfig) -> Self {
        Self {
            state: TrackerState::Idle,
            consecutive_failures: 0,
            cycles: 0,
            retry_config,
        }
    }
}

/// Structured record of one cycle, emitted at debug level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleRecord {
    pub cycle: u64,
    pub from: TrackerState,
    pub to: TrackerState,
    pub outcome: CycleOutcome,
    pub consecutive_failures: u32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl CycleRecord {
    /// Build the record after `StateMachine::next` has been applied.
    pub fn new(
        tracker: &Tracker,
        from: TrackerState,
        outcome: CycleOutcome,
        started_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            cycle: tracker.cycles,
            from,
            to: tracker.state,
            outcome,
            consecutive_failures: tracker.consecutive_failures,
            started_at,
            completed_at: now,
            duration_ms: (now - started_at).num_milliseconds(),
        }
    }
}
