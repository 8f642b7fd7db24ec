//! Shared test mocks and utilities for the TV critics bot.

mod blob;
mod clock;
mod repository;
mod rng;
mod transport;

pub use blob::{FailingBlobSink, MemoryBlobSink, StoredBlob};
pub use clock::{FixedClock, ManualClock};
pub use repository::{FailingDocumentStore, InMemoryDocumentStore, ReadOnlyDocumentStore};
pub use rng::{MockRng, SequenceRng};
pub use transport::{RecordingTransport, TransportCall};
