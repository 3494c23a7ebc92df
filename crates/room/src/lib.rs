//! # Lobby Room Crate
//!
//! Core presence and messaging logic for the Lobby chat backend.
//!
//! ## Architecture
//!
//! - **Clock**: injected time source; renders the display timestamp stamped on messages
//! - **Repositories**: storage traits, implemented over SQLite and in memory
//! - **Services**: participant registry, message log, presence sweeper and the
//!   [`ChatRoom`] facade the HTTP layer talks to
//! - **Visibility**: the pure filter deciding which messages a requester may read
//!
//! ## Usage
//!
//! ```rust,no_run
//! # async fn run(pool: sqlx::SqlitePool) -> Result<(), lobby_room::RoomError> {
//! use std::{sync::Arc, time::Duration};
//! use lobby_room::{ChatRoom, SystemClock};
//!
//! let room = ChatRoom::with_sqlite(pool, Arc::new(SystemClock));
//! room.join("Ann").await?;
//! let sweeper = room.sweeper(Duration::from_secs(10)).spawn(Duration::from_secs(15));
//! # sweeper.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod repositories;
pub mod services;
pub mod types;
pub mod visibility;

pub use clock::{display_time, Clock, ManualClock, SystemClock};
pub use repositories::{
    MemoryMessageStore, MemoryParticipantStore, MessageStore, ParticipantStore,
};
pub use services::{
    ChatRoom, MessageLog, ParticipantRegistry, PresenceSweeper, SweepError, SweepReport,
    SweeperHandle, JOINED_TEXT, LEFT_TEXT,
};
pub use types::{RoomError, RoomResult};
pub use visibility::{is_visible_to, visible};

pub use lobby_database::{ChatMessage, MessageKind, NewMessage, Participant, EVERYONE};
