//! Interaction layer: pointer input mapped to scene picks and actions.
//!
//! # Invariants
//! - Only completed and floating nodes are interactable; threads and
//!   particles never receive hover or click.
//! - Hover changes are reported on transitions only.
//! - Consumers react to `Action`s, never to raw pointer events.

pub mod action;
pub mod hover;
pub mod pick;

pub use action::{Action, Interaction, PointerEvent};
pub use hover::{HOVER_RELEASE_GRACE, HoverChanged, HoverTracker};
pub use pick::{PickHit, pick, pick_at, pointer_to_ndc};

pub fn crate_info() -> &'static str {
    concat!("serenpaths-input v", env!("CARGO_PKG_VERSION"))
}
