//! Route modules, one per resource.

use serde::Deserialize;

pub mod critics;
pub mod critiques;
pub mod game_registrants;
pub mod health;
pub mod indices;
pub mod search;

/// `?size=` on listing endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SizeParams {
    /// Maximum number of records to return.
    pub size: Option<usize>,
}
