//! Lobby Database Crate
//!
//! This crate provides the SQLite persistence layer for the Lobby chat backend:
//! connection management, embedded migrations, entity definitions, and the
//! participant and message repositories.

use sqlx::SqlitePool;
use lobby_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;

pub use repos::{MessageRepository, ParticipantRepository};

pub use entities::{
    message::{ChatMessage, MessageKind, NewMessage, EVERYONE},
    participant::Participant,
};

pub use types::{errors::DatabaseError, DatabaseResult};

/// Connect to the configured database and bring its schema up to date.
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}
