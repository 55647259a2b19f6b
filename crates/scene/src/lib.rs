//! Scene management for the 3D experience web.
//!
//! Completed experiences sit on a spiral joined by threads; ongoing missions
//! float behind it. The scene is derived from the experience list and kept
//! current with `Scene::sync`, which applies only the difference.
//!
//! # Invariants
//! - Layout is a pure function of the ordered id lists: same ids, same
//!   placements.
//! - The renderer never mutates the scene.
//! - After any sequence of syncs the scene equals a fresh scene synced once
//!   with the final list.

pub mod animate;
pub mod camera;
pub mod frame;
pub mod graph;
pub mod layout;
pub mod pool;
mod renderer;

pub use animate::{HoverState, NodeVisual, animate};
pub use camera::{Ray, SceneCamera};
pub use frame::FrameThrottle;
pub use graph::{EdgeKey, NodeKind, Scene, SceneDiff, SceneEdge, SceneNode};
pub use layout::Placement;
pub use pool::{GeometryKind, MaterialHandle, MaterialKind, MeshHandle, PoolStats, ResourcePool};
pub use renderer::{DebugTextRenderer, Renderer};

pub fn crate_info() -> &'static str {
    concat!("serenpaths-scene v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("scene"));
    }
}
