//! Persisted records.
//!
//! Field names on the wire match the existing Elasticsearch indices, which is
//! why several Rust field names are renamed during serialization.

use chrono::{DateTime, Utc};
use critics_core::blob::ContentKind;
use critics_core::error::DomainError;
use critics_core::repository::Document;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Stable user identity assigned by the messaging platform.
pub type UserId = i64;

/// Longest text excerpt stored on a critique document.
pub const TEXT_EXCERPT_LIMIT: usize = 1000;

/// A registered critic. Stored under the document id `user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Critic {
    /// Messaging-platform user id.
    pub user_id: UserId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact phone number, as typed.
    pub phone: String,
    /// When registration completed.
    #[serde(rename = "timestamp", with = "timestamp")]
    pub registered_at: DateTime<Utc>,
}

/// A submitted critique. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Critique {
    /// The submitting critic.
    pub user_id: UserId,
    /// Program name, drawn from the catalog at submission time.
    pub program: String,
    /// Opaque submission token returned to the user.
    #[serde(rename = "received_id")]
    pub submission_id: String,
    /// Where the raw payload was written.
    #[serde(rename = "file_path")]
    pub stored_path: String,
    /// When the critique was accepted.
    #[serde(rename = "timestamp", with = "timestamp")]
    pub submitted_at: DateTime<Utc>,
    /// Text or voice.
    #[serde(rename = "content_type")]
    pub content_kind: ContentKind,
    /// Leading part of a text critique.
    #[serde(rename = "text_content", default)]
    pub text_excerpt: Option<String>,
    /// Length of a voice critique.
    #[serde(rename = "voice_duration", default)]
    pub voice_duration_seconds: Option<u32>,
}

/// A game registration. Users may register any number of times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRegistrant {
    /// Messaging-platform user id.
    pub user_id: UserId,
    /// Display name the player chose.
    pub player_name: String,
    /// When the registration was made.
    #[serde(rename = "registration_date", with = "timestamp")]
    pub registered_at: DateTime<Utc>,
}

/// Truncates `text` to at most [`TEXT_EXCERPT_LIMIT`] characters.
#[must_use]
pub fn excerpt(text: &str) -> String {
    text.chars().take(TEXT_EXCERPT_LIMIT).collect()
}

/// Serializes a record into a store document.
///
/// # Errors
///
/// Returns `DomainError::Unexpected` if serialization fails.
pub fn to_document<T: Serialize>(record: &T) -> Result<Document, DomainError> {
    serde_json::to_value(record)
        .map_err(|e| DomainError::Unexpected(format!("record serialization failed: {e}")))
}

/// Deserializes a store document into a record.
///
/// # Errors
///
/// Returns `DomainError::Storage` if the document does not have the
/// record's shape.
pub fn from_document<T: DeserializeOwned>(document: Document) -> Result<T, DomainError> {
    serde_json::from_value(document)
        .map_err(|e| DomainError::Storage(format!("malformed stored document: {e}")))
}

/// Timestamps are written as RFC 3339. Older documents carry naive UTC
/// timestamps without an offset, which are accepted on read.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_critique_serializes_with_index_field_names() {
        // Arrange
        let critique = Critique {
            user_id: 42,
            program: "Cooking Show".to_owned(),
            submission_id: "abc".to_owned(),
            stored_path: "assets/Cooking_Show/abc.txt".to_owned(),
            submitted_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
            content_kind: ContentKind::Text,
            text_excerpt: Some("tasty".to_owned()),
            voice_duration_seconds: None,
        };

        // Act
        let doc = to_document(&critique).unwrap();

        // Assert
        assert_eq!(doc["received_id"], "abc");
        assert_eq!(doc["file_path"], "assets/Cooking_Show/abc.txt");
        assert_eq!(doc["content_type"], "text");
        assert_eq!(doc["text_content"], "tasty");
        assert_eq!(doc["voice_duration"], serde_json::Value::Null);
        assert_eq!(doc["timestamp"], "2026-01-15T10:00:00+00:00");
    }

    #[test]
    fn test_critic_reads_naive_timestamps() {
        let doc = json!({
            "user_id": 7,
            "first_name": "Ana",
            "last_name": "Lee",
            "phone": "+15551234",
            "timestamp": "2025-03-01T08:30:15.123456"
        });

        let critic: Critic = from_document(doc).unwrap();

        assert_eq!(
            critic.registered_at,
            Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 15).unwrap()
                + chrono::Duration::microseconds(123_456)
        );
    }

    #[test]
    fn test_from_document_reports_storage_error_for_wrong_shape() {
        let result: Result<GameRegistrant, _> = from_document(json!({ "user_id": "nope" }));

        assert!(matches!(result, Err(DomainError::Storage(_))));
    }

    #[test]
    fn test_excerpt_truncates_on_character_boundaries() {
        let long = "é".repeat(TEXT_EXCERPT_LIMIT + 5);

        let cut = excerpt(&long);

        assert_eq!(cut.chars().count(), TEXT_EXCERPT_LIMIT);
    }
}
