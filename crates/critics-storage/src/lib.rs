//! Persistence adapters for the TV critics bot.
//!
//! [`elasticsearch::EsDocumentStore`] implements the document store traits
//! over the Elasticsearch REST API, and [`fs_blob_sink::FsBlobSink`] writes
//! raw submissions below an assets directory.

pub mod elasticsearch;
pub mod fs_blob_sink;
pub mod schema;
