//! Room services.

pub mod message_log;
pub mod registry;
pub mod room;
pub mod sweeper;

pub use message_log::MessageLog;
pub use registry::{ParticipantRegistry, JOINED_TEXT};
pub use room::ChatRoom;
pub use sweeper::{PresenceSweeper, SweepError, SweepReport, SweeperHandle, LEFT_TEXT};
