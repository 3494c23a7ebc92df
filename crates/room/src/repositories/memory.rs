//! In-memory store implementations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lobby_database::{ChatMessage, DatabaseError, DatabaseResult, NewMessage, Participant};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{MessageStore, ParticipantStore};

/// Participant store backed by a map; check-and-insert happens under one write lock.
#[derive(Debug, Default)]
pub struct MemoryParticipantStore {
    participants: RwLock<BTreeMap<String, DateTime<Utc>>>,
}

impl MemoryParticipantStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParticipantStore for MemoryParticipantStore {
    async fn insert(&self, participant: &Participant) -> DatabaseResult<()> {
        let mut participants = self.participants.write().await;
        if participants.contains_key(&participant.name) {
            return Err(DatabaseError::Duplicate(format!(
                "participant {}",
                participant.name
            )));
        }
        participants.insert(participant.name.clone(), participant.last_seen);
        Ok(())
    }

    async fn touch(&self, name: &str, seen_at: DateTime<Utc>) -> DatabaseResult<()> {
        let mut participants = self.participants.write().await;
        let last_seen = participants
            .get_mut(name)
            .ok_or_else(|| DatabaseError::NotFound(format!("participant {name}")))?;
        *last_seen = (*last_seen).max(seen_at);
        Ok(())
    }

    async fn list(&self) -> DatabaseResult<Vec<Participant>> {
        let participants = self.participants.read().await;
        Ok(participants
            .iter()
            .map(|(name, last_seen)| Participant::new(name.clone(), *last_seen))
            .collect())
    }

    async fn exists(&self, name: &str) -> DatabaseResult<bool> {
        Ok(self.participants.read().await.contains_key(name))
    }

    async fn remove(&self, name: &str) -> DatabaseResult<bool> {
        Ok(self.participants.write().await.remove(name).is_some())
    }

    async fn remove_many(&self, names: &[String]) -> DatabaseResult<u64> {
        let mut participants = self.participants.write().await;
        let removed = names
            .iter()
            .filter(|name| participants.remove(name.as_str()).is_some())
            .count();
        Ok(removed as u64)
    }
}

#[derive(Debug)]
struct MemoryLog {
    next_id: i64,
    messages: Vec<ChatMessage>,
}

/// Message log backed by a vector. Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct MemoryMessageStore {
    log: RwLock<MemoryLog>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self {
            log: RwLock::new(MemoryLog {
                next_id: 1,
                messages: Vec::new(),
            }),
        }
    }
}

impl Default for MemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLog {
    fn push(&mut self, message: NewMessage) -> ChatMessage {
        let stored = ChatMessage {
            id: self.next_id,
            from: message.from,
            to: message.to,
            text: message.text,
            kind: message.kind,
            time: message.time,
        };
        self.next_id += 1;
        self.messages.push(stored.clone());
        stored
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn append(&self, message: NewMessage) -> DatabaseResult<ChatMessage> {
        Ok(self.log.write().await.push(message))
    }

    async fn append_many(&self, messages: Vec<NewMessage>) -> DatabaseResult<Vec<ChatMessage>> {
        let mut log = self.log.write().await;
        Ok(messages.into_iter().map(|message| log.push(message)).collect())
    }

    async fn list_all(&self) -> DatabaseResult<Vec<ChatMessage>> {
        Ok(self.log.read().await.messages.clone())
    }

    async fn delete_by_id(&self, id: i64) -> DatabaseResult<()> {
        let mut log = self.log.write().await;
        let position = log
            .messages
            .iter()
            .position(|message| message.id == id)
            .ok_or_else(|| DatabaseError::NotFound(format!("message {id}")))?;
        log.messages.remove(position);
        Ok(())
    }
}
