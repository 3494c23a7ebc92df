//! Shared types for the room crate.

pub mod errors;

pub use errors::{RoomError, RoomResult};
