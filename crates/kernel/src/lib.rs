//! Journal Kernel: authoritative experience state, challenge generation.
//!
//! # Invariants
//! - Every experience has a unique id.
//! - Completed experiences are immutable except for feedback attachment.
//! - All state mutations flow through explicit operations and are logged.

pub mod challenge;
pub mod journal;
pub mod samples;

pub use challenge::LocalChallengeGenerator;
pub use journal::{Journal, JournalEntry, JournalError, JournalEvent};
