//! Storage seams for the room.
//!
//! The registry and the log only talk to these traits. The SQLite
//! repositories from `lobby-database` implement them for production, the
//! in-memory stores back unit tests and throwaway rooms.

mod memory;
mod sqlite;

pub use memory::{MemoryMessageStore, MemoryParticipantStore};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lobby_database::{ChatMessage, DatabaseResult, NewMessage, Participant};

/// Authoritative set of participants keyed by name.
#[async_trait]
pub trait ParticipantStore: Send + Sync {
    /// Insert atomically with respect to the name; a taken name must yield
    /// `DatabaseError::Duplicate`.
    async fn insert(&self, participant: &Participant) -> DatabaseResult<()>;

    /// Refresh liveness; `DatabaseError::NotFound` for an unknown name.
    async fn touch(&self, name: &str, seen_at: DateTime<Utc>) -> DatabaseResult<()>;

    async fn list(&self) -> DatabaseResult<Vec<Participant>>;

    async fn exists(&self, name: &str) -> DatabaseResult<bool>;

    async fn remove(&self, name: &str) -> DatabaseResult<bool>;

    async fn remove_many(&self, names: &[String]) -> DatabaseResult<u64>;
}

/// Append-only, id-ordered message log.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append(&self, message: NewMessage) -> DatabaseResult<ChatMessage>;

    async fn append_many(&self, messages: Vec<NewMessage>) -> DatabaseResult<Vec<ChatMessage>>;

    async fn list_all(&self) -> DatabaseResult<Vec<ChatMessage>>;

    /// `DatabaseError::NotFound` when no message carries `id`.
    async fn delete_by_id(&self, id: i64) -> DatabaseResult<()>;
}
