//! The chat room facade used by the HTTP layer.

use lobby_database::{
    ChatMessage, MessageKind, MessageRepository, NewMessage, Participant, ParticipantRepository,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::clock::{display_time, Clock};
use crate::repositories::{MessageStore, ParticipantStore};
use crate::services::{MessageLog, ParticipantRegistry, PresenceSweeper};
use crate::types::{RoomError, RoomResult};
use crate::visibility::visible;

/// Registry, log and clock bundled together.
#[derive(Clone)]
pub struct ChatRoom {
    registry: ParticipantRegistry,
    log: MessageLog,
    clock: Arc<dyn Clock>,
}

impl ChatRoom {
    pub fn new(
        participants: Arc<dyn ParticipantStore>,
        messages: Arc<dyn MessageStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let log = MessageLog::new(messages);
        let registry = ParticipantRegistry::new(participants, log.clone(), clock.clone());
        Self {
            registry,
            log,
            clock,
        }
    }

    /// A room persisted in the given SQLite pool.
    pub fn with_sqlite(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Arc::new(ParticipantRepository::new(pool.clone())),
            Arc::new(MessageRepository::new(pool)),
            clock,
        )
    }

    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    /// Build a sweeper evicting participants silent for longer than `threshold`.
    pub fn sweeper(&self, threshold: Duration) -> PresenceSweeper {
        PresenceSweeper::new(
            self.registry.clone(),
            self.log.clone(),
            self.clock.clone(),
            threshold,
        )
    }

    pub async fn join(&self, name: &str) -> RoomResult<Participant> {
        self.registry.join(name).await
    }

    pub async fn heartbeat(&self, name: &str) -> RoomResult<()> {
        self.registry.heartbeat(name).await
    }

    pub async fn participants(&self) -> RoomResult<Vec<Participant>> {
        self.registry.list().await
    }

    /// Post a message on behalf of a registered participant.
    ///
    /// Status messages are reserved for the room itself and are rejected.
    pub async fn post_message(
        &self,
        from: &str,
        to: &str,
        text: &str,
        kind: MessageKind,
    ) -> RoomResult<ChatMessage> {
        if kind == MessageKind::Status {
            return Err(RoomError::validation(
                "type must be one of: message, private_message",
            ));
        }
        if !self.registry.exists(from).await? {
            return Err(RoomError::unauthorized(from));
        }

        let message = NewMessage::new(from, to, text, kind, display_time(self.clock.now()));
        let message = self.log.append(message).await?;
        info!(id = message.id, from = %from, to = %to, kind = %kind, "Message posted");
        Ok(message)
    }

    /// Messages `requester` may read, oldest first.
    pub async fn messages_for(
        &self,
        requester: Option<&str>,
        limit: Option<usize>,
    ) -> RoomResult<Vec<ChatMessage>> {
        let log = self.log.list_all().await?;
        Ok(visible(&log, requester, limit))
    }

    /// Delete a message. Any registered participant may delete any message.
    pub async fn delete_message(&self, requester: &str, id: i64) -> RoomResult<()> {
        if !self.registry.exists(requester).await? {
            return Err(RoomError::unauthorized(requester));
        }
        self.log.delete_by_id(id).await?;
        info!(id, requester = %requester, "Message deleted");
        Ok(())
    }
}
