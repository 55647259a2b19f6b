//! Developer tooling: journal inspector and user statistics.
//!
//! # Invariants
//! - Tools are read-only; they never mutate the journal.

pub mod inspector;
pub mod stats;

pub use inspector::{ExperienceInfo, JournalInspector, JournalSummary};
pub use stats::UserStats;

pub fn crate_info() -> &'static str {
    concat!("serenpaths-tools v", env!("CARGO_PKG_VERSION"))
}
