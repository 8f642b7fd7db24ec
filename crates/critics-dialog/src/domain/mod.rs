//! Domain model for the Dialog context.

pub mod events;
pub mod messages;
pub mod programs;
pub mod records;
pub mod session;
pub mod submission;
