//! Repository for participant data access operations.

use crate::entities::Participant;
use crate::types::{DatabaseError, DatabaseResult};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};

#[derive(FromRow)]
struct ParticipantRow {
    name: String,
    last_seen_ms: i64,
}

impl TryFrom<ParticipantRow> for Participant {
    type Error = DatabaseError;

    fn try_from(row: ParticipantRow) -> Result<Self, Self::Error> {
        let last_seen = DateTime::<Utc>::from_timestamp_millis(row.last_seen_ms).ok_or_else(|| {
            DatabaseError::CorruptRow(format!(
                "participant {} has out-of-range last_seen_ms {}",
                row.name, row.last_seen_ms
            ))
        })?;

        Ok(Participant {
            name: row.name,
            last_seen,
        })
    }
}

/// Repository for participant database operations
#[derive(Clone)]
pub struct ParticipantRepository {
    pool: SqlitePool,
}

impl ParticipantRepository {
    /// Create a new participant repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a participant. The primary key on `name` makes the
    /// check-and-insert atomic; a taken name yields `Duplicate`.
    pub async fn insert(&self, participant: &Participant) -> DatabaseResult<()> {
        sqlx::query("INSERT INTO participants (name, last_seen_ms) VALUES (?, ?)")
            .bind(&participant.name)
            .bind(participant.last_seen.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_sqlx(e, format!("participant {}", participant.name)))?;

        info!(name = %participant.name, "registered participant");
        Ok(())
    }

    /// Refresh `last_seen`, never moving it backwards.
    pub async fn touch(&self, name: &str, seen_at: DateTime<Utc>) -> DatabaseResult<()> {
        let result = sqlx::query(
            "UPDATE participants SET last_seen_ms = MAX(last_seen_ms, ?) WHERE name = ?",
        )
        .bind(seen_at.timestamp_millis())
        .bind(name)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("participant {name}")));
        }

        debug!(name, "refreshed participant liveness");
        Ok(())
    }

    /// Find a participant by name
    #[cfg(test)]
    pub(crate) async fn find_by_name(&self, name: &str) -> DatabaseResult<Option<Participant>> {
        let row = sqlx::query_as::<_, ParticipantRow>(
            "SELECT name, last_seen_ms FROM participants WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Participant::try_from).transpose()
    }

    pub async fn exists(&self, name: &str) -> DatabaseResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM participants WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Snapshot of every registered participant
    pub async fn list(&self) -> DatabaseResult<Vec<Participant>> {
        let rows = sqlx::query_as::<_, ParticipantRow>(
            "SELECT name, last_seen_ms FROM participants ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Participant::try_from).collect()
    }

    /// Remove a single participant, returning whether it existed
    pub async fn remove(&self, name: &str) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM participants WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove every participant whose name is in `names`, in one transaction.
    /// Returns the number of rows actually deleted.
    pub async fn remove_many(&self, names: &[String]) -> DatabaseResult<u64> {
        if names.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut removed = 0;
        for name in names {
            removed += sqlx::query("DELETE FROM participants WHERE name = ?")
                .bind(name)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }
        tx.commit().await?;

        info!(requested = names.len(), removed, "removed participants");
        Ok(removed)
    }

    /// Delete every participant
    pub async fn clear(&self) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM participants")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
