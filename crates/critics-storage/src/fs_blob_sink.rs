//! Filesystem implementation of `BlobSink`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use critics_core::blob::{BlobSink, ContentKind, program_dir_name};
use critics_core::error::DomainError;

/// Writes submissions to `{root}/{program_dir}/{submission_id}.{ext}`.
#[derive(Debug, Clone)]
pub struct FsBlobSink {
    root: PathBuf,
}

impl FsBlobSink {
    /// Creates a sink rooted at `root`. The directory is created lazily.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The assets directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl BlobSink for FsBlobSink {
    async fn store(
        &self,
        program: &str,
        submission_id: &str,
        kind: ContentKind,
        bytes: &[u8],
    ) -> Result<String, DomainError> {
        let dir = self.root.join(program_dir_name(program));
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            DomainError::Storage(format!("failed to create {}: {e}", dir.display()))
        })?;

        let path = dir.join(format!("{submission_id}.{}", kind.extension()));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| DomainError::Storage(format!("failed to write {}: {e}", path.display())))?;

        debug!(path = %path.display(), len = bytes.len(), "blob stored");
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_creates_program_directory_and_writes_text() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let sink = FsBlobSink::new(dir.path().join("assets"));

        // Act
        let path = sink
            .store("Love Island", "abc123", ContentKind::Text, b"Great episode!")
            .await
            .unwrap();

        // Assert
        let expected = dir.path().join("assets/Love_Island/abc123.txt");
        assert_eq!(path, expected.display().to_string());
        assert_eq!(std::fs::read(&expected).unwrap(), b"Great episode!");
    }

    #[tokio::test]
    async fn test_store_voice_uses_ogg_extension() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsBlobSink::new(dir.path());

        let path = sink
            .store("Cooking Show", "ff00", ContentKind::Voice, &[0x4F, 0x67])
            .await
            .unwrap();

        assert!(path.ends_with("Cooking_Show/ff00.ogg"));
    }

    #[tokio::test]
    async fn test_store_reuses_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsBlobSink::new(dir.path());

        sink.store("Turkish News", "one", ContentKind::Text, b"1")
            .await
            .unwrap();
        sink.store("Turkish News", "two", ContentKind::Text, b"2")
            .await
            .unwrap();

        let entries = std::fs::read_dir(dir.path().join("Turkish_News"))
            .unwrap()
            .count();
        assert_eq!(entries, 2);
    }

    #[tokio::test]
    async fn test_unwritable_root_is_a_storage_error() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let sink = FsBlobSink::new(&blocker);

        // Act
        let result = sink
            .store("Love Island", "abc", ContentKind::Text, b"x")
            .await;

        // Assert
        assert!(matches!(result, Err(DomainError::Storage(_))));
    }
}
