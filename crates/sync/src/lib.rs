//! Remote sync: recommendations, feedback and preference updates.
//!
//! Every remote call is best-effort. The client tries an authenticated call,
//! then a public one, then falls back locally (a generated challenge, or a
//! queued write in the blob store that `SyncClient::sync_pending` retries).
//!
//! # Invariants
//! - At most one remote call per `ApiConfig::min_interval`; the client waits
//!   out the remainder instead of failing.
//! - A recommendation request always yields a challenge.
//! - Feedback and preference updates are never lost: on failure they are
//!   queued under `pendingFeedback` / `pendingPreferences`.

pub mod auth;
pub mod backend;
pub mod clock;
pub mod client;
pub mod config;

pub use auth::{AuthState, Session, SubscriptionId};
pub use backend::{ApiError, Backend, HttpBackend, endpoints};
pub use clock::{Clock, ManualClock, SystemClock};
pub use client::{
    FeedbackOutcome, InitReport, PreferencesOutcome, Recommendation, RecommendationSource,
    SyncClient, SyncReport,
};
pub use config::ApiConfig;

/// Returns crate version info.
pub fn crate_info() -> &'static str {
    concat!("serenpaths-sync v", env!("CARGO_PKG_VERSION"))
}
