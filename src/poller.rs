use std::convert::Infallible;
use std::time::Duration;

use chrono::Utc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::bridge::{Entities, StateBridge};
use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::home_assistant::StoreConnector;
use crate::state_machine::{
    CycleOutcome, CycleRecord, FailureKind, RetryConfig, StateMachine, Tracker, Transition,
};
use crate::ubereats::StatusResolver;

/// Value Home Assistant reports for an `input_text` that has never been set.
const UNKNOWN_SENTINEL: &str = "unknown";

/// Polls the tracked order on a fixed interval and mirrors its status into
/// Home Assistant.
pub struct Poller<R, C> {
    resolver: R,
    connector: C,
    entities: Entities,
    poll_interval: Duration,
    retry: RetryConfig,
}

impl<R: StatusResolver, C: StoreConnector> Poller<R, C> {
    pub fn new(
        resolver: R,
        connector: C,
        entities: Entities,
        poll_interval: Duration,
        retry: RetryConfig,
    ) -> Self {
        Self {
            resolver,
            connector,
            entities,
            poll_interval,
            retry,
        }
    }

    pub fn from_config(config: &TrackerConfig, resolver: R, connector: C) -> Self {
        Self::new(
            resolver,
            connector,
            Entities {
                sensor: config.sensor_entity_id.clone(),
                url: config.url_entity_id.clone(),
            },
            config.poll_interval(),
            config.retry_config(),
        )
    }

    /// Run one poll cycle.
    ///
    /// The store session lives for this call only and is dropped on every
    /// return path, including errors.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, TrackerError> {
        let session = self.connector.connect().await?;
        let bridge = StateBridge::new(&session, &self.entities);

        let link = bridge.read_tracked_link().await?;
        if !is_tracked(&link) {
            info!(
                "No order URL found, sleeping for {} seconds",
                self.poll_interval.as_secs()
            );
            return Ok(CycleOutcome::NoTrackedLink);
        }

        let status = self.resolver.resolve(&link).await?;
        bridge.write_status(&status).await?;
        let cleared = bridge.clear_link_if_delivered(&status).await?;
        Ok(CycleOutcome::StatusWritten { status, cleared })
    }

    /// Poll forever. Only returns once the tracker crashes, with the error
    /// of the cycle that crashed it.
    pub async fn run(&self) -> Result<Infallible, TrackerError> {
        let mut tracker = Tracker::new(self.retry.clone());
        info!(
            sensor = %self.entities.sensor,
            url = %self.entities.url,
            interval_secs = self.poll_interval.as_secs(),
            "order tracker started"
        );

        loop {
            let started_at = Utc::now();
            let from = tracker.state;
            let result = self.run_cycle().await;
            let outcome = match &result {
                Ok(outcome) => outcome.clone(),
                Err(err) => CycleOutcome::Failed(FailureKind::from(err)),
            };

            let transition = StateMachine::next(&mut tracker, outcome.clone());
            let record = CycleRecord::new(&tracker, from, outcome, started_at);
            debug!(
                record = %serde_json::to_string(&record).unwrap_or_default(),
                "cycle complete"
            );

            let delay = match (transition, result) {
                (Transition::Next(_), _) => self.poll_interval,
                (Transition::Retry { attempt, reason }, _) => {
                    let delay_ms = self.retry.delay_for_attempt(attempt);
                    warn!(
                        attempt,
                        max = self.retry.max_retries,
                        delay_ms,
                        "{reason}, retrying"
                    );
                    Duration::from_millis(delay_ms)
                }
                (Transition::Crash(reason), Err(err)) => {
                    error!(state = %tracker.state, "{reason}");
                    return Err(err);
                }
                // Only a failed cycle can crash a live tracker, and this loop
                // returns on the first crash.
                (Transition::Crash(reason), Ok(_)) => {
                    unreachable!("tracker crashed after a successful cycle: {reason}")
                }
            };
            sleep(delay).await;
        }
    }
}

fn is_tracked(link: &str) -> bool {
    !link.is_empty() && link != UNKNOWN_SENTINEL
}
