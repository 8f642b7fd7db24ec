//! Blob sink abstraction for raw submission payloads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The kind of payload a critique carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// A typed text critique.
    Text,
    /// A recorded voice critique (OGG/Opus).
    Voice,
}

impl ContentKind {
    /// File extension used when the payload is written to storage.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Voice => "ogg",
        }
    }
}

/// Directory name for a program: spaces become underscores.
#[must_use]
pub fn program_dir_name(program: &str) -> String {
    program.replace(' ', "_")
}

/// Durable sink for submitted payloads.
#[async_trait]
pub trait BlobSink: Send + Sync {
    /// Write `bytes` as `{submission_id}.{txt|ogg}` under the program's
    /// directory, creating it if absent, and return the stored path.
    async fn store(
        &self,
        program: &str,
        submission_id: &str,
        kind: ContentKind,
        bytes: &[u8],
    ) -> Result<String, DomainError>;
}
