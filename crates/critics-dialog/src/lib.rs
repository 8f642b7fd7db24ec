//! TV critics bot — Dialog bounded context.
//!
//! Responsible for the per-user conversation that registers critics and game
//! players, collects program critiques, and for the read-only queries the
//! HTTP API serves over the same records.

pub mod application;
pub mod domain;
