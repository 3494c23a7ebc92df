//! Message log service.

use lobby_database::{ChatMessage, DatabaseError, NewMessage};
use std::sync::Arc;

use crate::repositories::MessageStore;
use crate::types::{RoomError, RoomResult};

/// Ordered, append-only record of everything said in the room.
#[derive(Clone)]
pub struct MessageLog {
    store: Arc<dyn MessageStore>,
}

impl MessageLog {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// Append one message. The store assigns the id; content is never rejected here.
    pub async fn append(&self, message: NewMessage) -> RoomResult<ChatMessage> {
        Ok(self.store.append(message).await?)
    }

    pub async fn append_many(&self, messages: Vec<NewMessage>) -> RoomResult<Vec<ChatMessage>> {
        if messages.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.append_many(messages).await?)
    }

    /// Snapshot of the whole log in ascending id order.
    pub async fn list_all(&self) -> RoomResult<Vec<ChatMessage>> {
        Ok(self.store.list_all().await?)
    }

    pub async fn delete_by_id(&self, id: i64) -> RoomResult<()> {
        match self.store.delete_by_id(id).await {
            Ok(()) => Ok(()),
            Err(DatabaseError::NotFound(_)) => Err(RoomError::message_not_found(id)),
            Err(error) => Err(error.into()),
        }
    }
}
