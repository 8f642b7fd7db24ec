//! Application services for the Dialog context.

pub mod conversation;
pub mod gateway;
pub mod query_handlers;
pub mod registry;
pub mod state_machine;
