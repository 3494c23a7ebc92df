use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lobby_database::{
    ChatMessage, DatabaseResult, MessageRepository, NewMessage, Participant, ParticipantRepository,
};

use super::{MessageStore, ParticipantStore};

#[async_trait]
impl ParticipantStore for ParticipantRepository {
    async fn insert(&self, participant: &Participant) -> DatabaseResult<()> {
        ParticipantRepository::insert(self, participant).await
    }

    async fn touch(&self, name: &str, seen_at: DateTime<Utc>) -> DatabaseResult<()> {
        ParticipantRepository::touch(self, name, seen_at).await
    }

    async fn list(&self) -> DatabaseResult<Vec<Participant>> {
        ParticipantRepository::list(self).await
    }

    async fn exists(&self, name: &str) -> DatabaseResult<bool> {
        ParticipantRepository::exists(self, name).await
    }

    async fn remove(&self, name: &str) -> DatabaseResult<bool> {
        ParticipantRepository::remove(self, name).await
    }

    async fn remove_many(&self, names: &[String]) -> DatabaseResult<u64> {
        ParticipantRepository::remove_many(self, names).await
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn append(&self, message: NewMessage) -> DatabaseResult<ChatMessage> {
        MessageRepository::append(self, message).await
    }

    async fn append_many(&self, messages: Vec<NewMessage>) -> DatabaseResult<Vec<ChatMessage>> {
        MessageRepository::append_many(self, messages).await
    }

    async fn list_all(&self) -> DatabaseResult<Vec<ChatMessage>> {
        MessageRepository::list_all(self).await
    }

    async fn delete_by_id(&self, id: i64) -> DatabaseResult<()> {
        MessageRepository::delete_by_id(self, id).await
    }
}
