//! Database repository implementations

pub mod message_repository;
pub mod participant_repository;

pub use message_repository::MessageRepository;
pub use participant_repository::ParticipantRepository;
