//! Critics Core — shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that the dialog,
//! storage and API crates depend on. It contains no infrastructure code.

pub mod blob;
pub mod clock;
pub mod error;
pub mod repository;
pub mod rng;
pub mod transport;
