//! Persistence: a simple key-value blob store holding JSON documents.
//!
//! # Invariants
//! - Values are JSON text; there is no schema versioning.
//! - A write either fully replaces the previous value or leaves it intact.
//! - Keys are restricted to `[A-Za-z0-9_-]` so they map safely onto file names.

pub mod records;
pub mod store;

pub use records::{PendingFeedback, PendingPreferences, keys};
pub use store::{BlobStore, FileBlobStore, MemoryBlobStore, StoreError};

/// Returns crate version info.
pub fn crate_info() -> &'static str {
    concat!("serenpaths-persist v", env!("CARGO_PKG_VERSION"))
}
