//! Domain entities for the database layer

pub mod message;
pub mod participant;

pub use message::{ChatMessage, MessageKind, NewMessage, EVERYONE};
pub use participant::Participant;
