//! Test blob sinks — mock `BlobSink` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use critics_core::blob::{BlobSink, ContentKind, program_dir_name};
use critics_core::error::DomainError;

/// A blob written to a [`MemoryBlobSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// The path that would have been written.
    pub path: String,
    /// The payload kind.
    pub kind: ContentKind,
    /// The raw payload.
    pub bytes: Vec<u8>,
}

/// A blob sink that keeps payloads in memory, reporting the same relative
/// paths the filesystem sink would produce.
#[derive(Debug, Default)]
pub struct MemoryBlobSink {
    stored: Mutex<Vec<StoredBlob>>,
}

impl MemoryBlobSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all stored blobs.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn stored(&self) -> Vec<StoredBlob> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobSink for MemoryBlobSink {
    async fn store(
        &self,
        program: &str,
        submission_id: &str,
        kind: ContentKind,
        bytes: &[u8],
    ) -> Result<String, DomainError> {
        let path = format!(
            "assets/{}/{submission_id}.{}",
            program_dir_name(program),
            kind.extension()
        );
        self.stored.lock().unwrap().push(StoredBlob {
            path: path.clone(),
            kind,
            bytes: bytes.to_vec(),
        });
        Ok(path)
    }
}

/// A blob sink that always fails, as if the disk were full.
#[derive(Debug)]
pub struct FailingBlobSink;

#[async_trait]
impl BlobSink for FailingBlobSink {
    async fn store(
        &self,
        _program: &str,
        _submission_id: &str,
        _kind: ContentKind,
        _bytes: &[u8],
    ) -> Result<String, DomainError> {
        Err(DomainError::Storage("no space left on device".into()))
    }
}
