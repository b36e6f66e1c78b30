//! Persistence layer for soko.
//!
//! The entire dataset lives in one JSON [`Document`] owned by a
//! [`DocumentStore`]. There is no partial write: mutations run through a
//! single-writer critical section and land as one atomic
//! write-temp-then-rename save. Snapshots handed to readers are deep copies
//! of the last successfully saved state.

pub mod document;
pub mod entities;
pub mod store;

pub use document::Document;
pub use store::DocumentStore;
