//! Presence sweeper.
//!
//! Periodically evicts participants whose last heartbeat is older than the
//! inactivity threshold and records a leave notice for each of them.
//!
//! The snapshot and the delete are not atomic with heartbeats: a heartbeat
//! landing between the two is lost and that participant is evicted anyway.

use chrono::{DateTime, Utc};
use lobby_database::NewMessage;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::clock::{display_time, Clock};
use crate::services::{MessageLog, ParticipantRegistry};
use crate::types::RoomError;

/// Text of the status notice appended for an evicted participant.
pub const LEFT_TEXT: &str = "left the room";

/// Outcome of one successful sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub swept_at: DateTime<Utc>,
    pub evicted: Vec<String>,
    pub remaining: usize,
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Sweep aborted: {0}")]
    Registry(#[from] RoomError),

    #[error("Evicted {} participants but lost their leave notices: {source}", .evicted.len())]
    LeaveNoticesLost { evicted: Vec<String>, source: RoomError },
}

#[derive(Clone)]
pub struct PresenceSweeper {
    registry: ParticipantRegistry,
    log: MessageLog,
    clock: Arc<dyn Clock>,
    threshold: Duration,
}

impl PresenceSweeper {
    pub fn new(
        registry: ParticipantRegistry,
        log: MessageLog,
        clock: Arc<dyn Clock>,
        threshold: Duration,
    ) -> Self {
        Self {
            registry,
            log,
            clock,
            threshold,
        }
    }

    /// Run a single sweep at the clock's current time.
    pub async fn sweep_once(&self) -> Result<SweepReport, SweepError> {
        let swept_at = self.clock.now();
        let threshold_ms = i64::try_from(self.threshold.as_millis()).unwrap_or(i64::MAX);

        let (stale, live): (Vec<_>, Vec<_>) = self
            .registry
            .list()
            .await?
            .into_iter()
            .partition(|p| (swept_at - p.last_seen).num_milliseconds() > threshold_ms);

        if stale.is_empty() {
            return Ok(SweepReport {
                swept_at,
                evicted: Vec::new(),
                remaining: live.len(),
            });
        }

        let evicted: Vec<String> = stale.into_iter().map(|p| p.name).collect();
        self.registry.remove_many(&evicted).await?;

        let time = display_time(swept_at);
        let notices = evicted
            .iter()
            .map(|name| NewMessage::status(name.as_str(), LEFT_TEXT, time.as_str()))
            .collect();

        if let Err(source) = self.log.append_many(notices).await {
            return Err(SweepError::LeaveNoticesLost { evicted, source });
        }

        Ok(SweepReport {
            swept_at,
            evicted,
            remaining: live.len(),
        })
    }

    /// Run `sweep_once` every `period` on a background task.
    ///
    /// The first sweep happens one full period after spawning. Failed sweeps
    /// are logged and the loop carries on. Dropping the returned handle also
    /// stops the task.
    pub fn spawn(self, period: Duration) -> SweeperHandle {
        let period = period.max(Duration::from_millis(1));
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            info!(
                period_ms = period.as_millis() as u64,
                threshold_ms = self.threshold.as_millis() as u64,
                "Presence sweeper started"
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => self.run_iteration().await,
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Presence sweeper stopped");
        });

        SweeperHandle { shutdown, task }
    }

    async fn run_iteration(&self) {
        match self.sweep_once().await {
            Ok(report) if report.evicted.is_empty() => {
                debug!(remaining = report.remaining, "Sweep found no stale participants");
            }
            Ok(report) => {
                info!(
                    evicted = ?report.evicted,
                    remaining = report.remaining,
                    "Evicted inactive participants"
                );
            }
            Err(SweepError::LeaveNoticesLost { evicted, source }) => {
                error!(
                    evicted = ?evicted,
                    error = %source,
                    "Participants evicted without leave notices"
                );
            }
            Err(err) => warn!(error = %err, "Sweep failed"),
        }
    }
}

/// Controls a running sweeper task.
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the loop to stop and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(err) = self.task.await {
            error!(error = %err, "Presence sweeper task failed");
        }
    }
}
