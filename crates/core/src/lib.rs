//! Core business logic for soko.
//!
//! Services over the shared document store: the social graph, the
//! subscription policy, the collaboration/campaign workflow engine, the
//! admin approval gate, notification dispatch, and the product catalog.

pub mod services;

pub use services::*;
