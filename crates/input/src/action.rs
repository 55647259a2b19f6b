use std::time::Duration;

use glam::Vec2;
use serenpaths_common::ExperienceId;
use serenpaths_scene::{Scene, SceneCamera};

use crate::hover::{HoverChanged, HoverTracker};
use crate::pick::pick_at;

/// A high-level action produced by pointer interaction.
///
/// The application consumes actions, never raw pointer events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Show the detail view for an experience.
    OpenExperience(ExperienceId),
    /// The hovered node changed.
    Hover(HoverChanged),
    /// Wheel zoom by a raw wheel delta; apply with `SceneCamera::zoom`.
    Zoom(f32),
}

/// Raw pointer input in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move { x: f32, y: f32 },
    Click { x: f32, y: f32 },
    Wheel { delta: f32 },
    Leave,
}

/// Turns pointer events into actions for one viewport.
#[derive(Debug, Clone)]
pub struct Interaction {
    viewport: Vec2,
    hover: HoverTracker,
}

impl Interaction {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            viewport: Vec2::new(width, height),
            hover: HoverTracker::new(),
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    pub fn hover(&self) -> &HoverTracker {
        &self.hover
    }

    pub fn handle(
        &mut self,
        event: PointerEvent,
        scene: &Scene,
        camera: &SceneCamera,
        now: Duration,
    ) -> Option<Action> {
        match event {
            PointerEvent::Move { x, y } => {
                let hit = pick_at(scene, camera, Vec2::new(x, y), self.viewport);
                self.hover.update(hit.as_ref(), now).map(Action::Hover)
            }
            PointerEvent::Click { x, y } => {
                let hit = pick_at(scene, camera, Vec2::new(x, y), self.viewport)?;
                tracing::debug!(id = %hit.id, "experience clicked");
                Some(Action::OpenExperience(hit.id))
            }
            PointerEvent::Wheel { delta } => Some(Action::Zoom(delta)),
            PointerEvent::Leave => self.hover.clear(now).map(Action::Hover),
        }
    }
}
