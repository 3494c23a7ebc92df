//! Participant registry service.

use lobby_database::{DatabaseError, NewMessage, Participant};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::clock::{display_time, Clock};
use crate::repositories::ParticipantStore;
use crate::services::MessageLog;
use crate::types::{RoomError, RoomResult};

/// Text of the status notice appended when someone joins.
pub const JOINED_TEXT: &str = "entered the room";

/// Tracks who is in the room and when they were last heard from.
#[derive(Clone)]
pub struct ParticipantRegistry {
    store: Arc<dyn ParticipantStore>,
    log: MessageLog,
    clock: Arc<dyn Clock>,
}

impl ParticipantRegistry {
    pub fn new(store: Arc<dyn ParticipantStore>, log: MessageLog, clock: Arc<dyn Clock>) -> Self {
        Self { store, log, clock }
    }

    /// Register `name` and announce it to everyone.
    ///
    /// The insert and the join notice succeed or fail together: when the
    /// notice cannot be appended the participant is removed again and the
    /// storage error is returned.
    pub async fn join(&self, name: &str) -> RoomResult<Participant> {
        let now = self.clock.now();
        let participant = Participant::new(name, now);

        match self.store.insert(&participant).await {
            Ok(()) => {}
            Err(DatabaseError::Duplicate(_)) => return Err(RoomError::conflict(name)),
            Err(error) => return Err(error.into()),
        }

        let notice = NewMessage::status(name, JOINED_TEXT, display_time(now));
        if let Err(append_error) = self.log.append(notice).await {
            if let Err(remove_error) = self.store.remove(name).await {
                error!(
                    participant = %name,
                    error = %remove_error,
                    "Failed to roll back participant after join notice failure"
                );
            }
            return Err(append_error);
        }

        info!(participant = %name, "Participant joined");
        Ok(participant)
    }

    /// Refresh liveness for `name` without touching the log.
    pub async fn heartbeat(&self, name: &str) -> RoomResult<()> {
        match self.store.touch(name, self.clock.now()).await {
            Ok(()) => {
                debug!(participant = %name, "Heartbeat");
                Ok(())
            }
            Err(DatabaseError::NotFound(_)) => Err(RoomError::participant_not_found(name)),
            Err(error) => Err(error.into()),
        }
    }

    pub async fn list(&self) -> RoomResult<Vec<Participant>> {
        Ok(self.store.list().await?)
    }

    pub async fn exists(&self, name: &str) -> RoomResult<bool> {
        Ok(self.store.exists(name).await?)
    }

    /// Remove every participant named in `names`. Unknown names are ignored.
    pub async fn remove_many(&self, names: &[String]) -> RoomResult<u64> {
        if names.is_empty() {
            return Ok(0);
        }
        Ok(self.store.remove_many(names).await?)
    }
}
