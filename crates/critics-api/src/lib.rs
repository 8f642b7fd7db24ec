//! TV critics bot — read-only query API.

pub mod error;
pub mod routes;
pub mod state;
