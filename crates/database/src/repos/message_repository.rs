//! Repository for message data access operations.

use crate::entities::{ChatMessage, MessageKind, NewMessage};
use crate::types::{DatabaseError, DatabaseResult};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};

#[derive(FromRow)]
struct MessageRow {
    id: i64,
    sender: String,
    recipient: String,
    body: String,
    kind: String,
    time: String,
}

impl TryFrom<MessageRow> for ChatMessage {
    type Error = DatabaseError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let kind = row
            .kind
            .parse::<MessageKind>()
            .map_err(|e| DatabaseError::CorruptRow(format!("message {}: {e}", row.id)))?;

        Ok(ChatMessage {
            id: row.id,
            from: row.sender,
            to: row.recipient,
            text: row.body,
            kind,
            time: row.time,
        })
    }
}

const INSERT_MESSAGE: &str =
    "INSERT INTO messages (sender, recipient, body, kind, time) VALUES (?, ?, ?, ?, ?)";

/// Repository for the append-only message log
#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one message. `AUTOINCREMENT` guarantees ids are strictly
    /// increasing and never reused after a delete.
    pub async fn append(&self, message: NewMessage) -> DatabaseResult<ChatMessage> {
        let id = sqlx::query(INSERT_MESSAGE)
            .bind(&message.from)
            .bind(&message.to)
            .bind(&message.text)
            .bind(message.kind.as_str())
            .bind(&message.time)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        debug!(id, from = %message.from, kind = %message.kind, "appended message");
        Ok(message.into_message(id))
    }

    /// Append a batch of messages in order, inside one transaction.
    pub async fn append_many(&self, messages: Vec<NewMessage>) -> DatabaseResult<Vec<ChatMessage>> {
        if messages.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = self.pool.begin().await?;
        let mut appended = Vec::with_capacity(messages.len());
        for message in messages {
            let id = sqlx::query(INSERT_MESSAGE)
                .bind(&message.from)
                .bind(&message.to)
                .bind(&message.text)
                .bind(message.kind.as_str())
                .bind(&message.time)
                .execute(&mut *tx)
                .await?
                .last_insert_rowid();
            appended.push(message.into_message(id));
        }
        tx.commit().await?;

        info!(count = appended.len(), "appended message batch");
        Ok(appended)
    }

    /// Snapshot of the whole log in insertion order
    pub async fn list_all(&self) -> DatabaseResult<Vec<ChatMessage>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, sender, recipient, body, kind, time FROM messages ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ChatMessage::try_from).collect()
    }

    /// Find a message by its id
    #[cfg(test)]
    pub(crate) async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<ChatMessage>> {
        let row = sqlx::query_as::<_, MessageRow>(
            "SELECT id, sender, recipient, body, kind, time FROM messages WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ChatMessage::try_from).transpose()
    }

    /// Delete exactly one message by id
    pub async fn delete_by_id(&self, id: i64) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("message {id}")));
        }

        info!(id, "deleted message");
        Ok(())
    }

    /// Delete every message
    pub async fn clear(&self) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM messages")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EVERYONE;
    use crate::test_support::create_test_database;

    fn normal(from: &str, text: &str) -> NewMessage {
        NewMessage::new(from, EVERYONE, text, MessageKind::Normal, "12:00:00")
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_ids() {
        let (pool, _temp_dir) = create_test_database().await;
        let repo = MessageRepository::new(pool);

        let first = repo.append(normal("Ann", "one")).await.unwrap();
        let second = repo.append(normal("Bob", "two")).await.unwrap();

        assert!(second.id > first.id);
        assert_eq!(first.text, "one");
        assert_eq!(first.kind, MessageKind::Normal);
    }

    #[tokio::test]
    async fn test_append_many_preserves_order() {
        let (pool, _temp_dir) = create_test_database().await;
        let repo = MessageRepository::new(pool);

        repo.append(normal("Ann", "before")).await.unwrap();
        let batch = repo
            .append_many(vec![
                NewMessage::status("Bob", "left the room", "12:00:15"),
                NewMessage::status("Cid", "left the room", "12:00:15"),
            ])
            .await
            .unwrap();

        assert_eq!(batch.len(), 2);
        assert!(batch[0].id < batch[1].id);

        let all = repo.list_all().await.unwrap();
        let senders: Vec<&str> = all.iter().map(|m| m.from.as_str()).collect();
        assert_eq!(senders, vec!["Ann", "Bob", "Cid"]);
    }

    #[tokio::test]
    async fn test_delete_by_id_is_not_repeatable() {
        let (pool, _temp_dir) = create_test_database().await;
        let repo = MessageRepository::new(pool);

        let first = repo.append(normal("Ann", "one")).await.unwrap();
        let second = repo.append(normal("Ann", "two")).await.unwrap();

        repo.delete_by_id(first.id).await.unwrap();
        let error = repo.delete_by_id(first.id).await.unwrap_err();
        assert!(matches!(error, DatabaseError::NotFound(_)));

        let all = repo.list_all().await.unwrap();
        assert_eq!(all, vec![second]);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let (pool, _temp_dir) = create_test_database().await;
        let repo = MessageRepository::new(pool);

        let first = repo.append(normal("Ann", "one")).await.unwrap();
        repo.delete_by_id(first.id).await.unwrap();
        let next = repo.append(normal("Ann", "two")).await.unwrap();

        assert!(next.id > first.id);
        assert!(repo.find_by_id(first.id).await.unwrap().is_none());
    }
}
