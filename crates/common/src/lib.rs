//! Shared types for the serenpaths workspace.
//!
//! Everything that crosses a crate boundary (or the wire, or the blob store)
//! is defined here so that the kernel, persistence, sync and scene crates agree
//! on one shape.

pub mod category;
pub mod challenge;
pub mod color;
pub mod preferences;
pub mod seed;
pub mod types;

pub use category::Category;
pub use challenge::{Challenge, ChallengeLevel, LevelError};
pub use color::{Rgb, theme_color};
pub use preferences::UserPreferences;
pub use types::{Experience, ExperienceId, Feedback, FeedbackParseError};
