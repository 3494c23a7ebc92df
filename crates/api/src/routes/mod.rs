pub mod health;
pub mod messages;
pub mod models;
pub mod participants;
pub mod status;
