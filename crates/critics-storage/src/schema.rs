//! Index mappings.
//!
//! String fields are mapped the way Elasticsearch's dynamic mapping would
//! map them (`text` plus a `keyword` sub-field), so indices created by
//! earlier deployments and indices created here answer the same queries.
//! Exact-match lookups on strings go through the `.keyword` sub-field.

use critics_core::repository::Collection;
use serde_json::{Value, json};

/// Name of the exact-match sub-field on every string field.
pub const KEYWORD_SUBFIELD: &str = "keyword";

fn text_field() -> Value {
    json!({
        "type": "text",
        "fields": { "keyword": { "type": "keyword", "ignore_above": 256 } }
    })
}

fn date_field() -> Value {
    json!({ "type": "date" })
}

fn long_field() -> Value {
    json!({ "type": "long" })
}

/// The `mappings` object for `collection`'s index.
#[must_use]
pub fn mappings(collection: Collection) -> Value {
    let properties = match collection {
        Collection::Critics => json!({
            "user_id": long_field(),
            "first_name": text_field(),
            "last_name": text_field(),
            "phone": text_field(),
            "timestamp": date_field(),
        }),
        Collection::Critiques => json!({
            "user_id": long_field(),
            "program": text_field(),
            "received_id": text_field(),
            "file_path": text_field(),
            "timestamp": date_field(),
            "content_type": text_field(),
            "text_content": text_field(),
            "voice_duration": long_field(),
        }),
        Collection::GameRegistrants => json!({
            "user_id": long_field(),
            "player_name": text_field(),
            "registration_date": date_field(),
        }),
    };
    json!({ "properties": properties })
}

/// Request body that creates `collection`'s index.
#[must_use]
pub fn create_index_body(collection: Collection) -> Value {
    json!({ "mappings": mappings(collection) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critique_program_has_keyword_subfield() {
        let mappings = mappings(Collection::Critiques);

        assert_eq!(
            mappings["properties"]["program"]["fields"]["keyword"]["type"],
            "keyword"
        );
    }

    #[test]
    fn test_timestamps_are_dates_and_ids_are_longs() {
        let critics = mappings(Collection::Critics);
        let registrants = mappings(Collection::GameRegistrants);

        assert_eq!(critics["properties"]["timestamp"]["type"], "date");
        assert_eq!(critics["properties"]["user_id"]["type"], "long");
        assert_eq!(
            registrants["properties"]["registration_date"]["type"],
            "date"
        );
    }

    #[test]
    fn test_create_index_body_wraps_mappings() {
        let body = create_index_body(Collection::GameRegistrants);

        assert!(body["mappings"]["properties"]["player_name"].is_object());
    }
}
