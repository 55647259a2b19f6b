use std::time::Duration;

use serenpaths_common::ExperienceId;
use serenpaths_scene::{HoverState, NodeKind};

use crate::pick::PickHit;

/// How long a released floating mission keeps its hover start time. Hovering
/// it again within this window resumes the animation instead of restarting it.
pub const HOVER_RELEASE_GRACE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverChanged {
    pub previous: Option<ExperienceId>,
    pub current: Option<ExperienceId>,
}

#[derive(Debug, Clone, Copy)]
struct Released {
    id: ExperienceId,
    since: Duration,
    at: Duration,
}

/// Tracks which node is under the pointer.
#[derive(Debug, Default, Clone)]
pub struct HoverTracker {
    current: Option<(ExperienceId, Duration)>,
    released: Option<Released>,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<ExperienceId> {
        self.current.map(|(id, _)| id)
    }

    /// Hover state for the animation step.
    pub fn state(&self) -> Option<HoverState> {
        self.current.map(|(id, since)| HoverState { id, since })
    }

    /// Feed the latest pick result. Returns a change only on transitions.
    pub fn update(&mut self, hit: Option<&PickHit>, now: Duration) -> Option<HoverChanged> {
        let next = hit.map(|h| h.id);
        let previous = self.hovered();
        if next == previous {
            return None;
        }

        if let Some((id, since)) = self.current.take() {
            self.released = Some(Released { id, since, at: now });
        }

        self.current = hit.map(|h| {
            let since = match (h.kind, self.released) {
                (NodeKind::Floating, Some(r))
                    if r.id == h.id && now.saturating_sub(r.at) <= HOVER_RELEASE_GRACE =>
                {
                    r.since
                }
                _ => now,
            };
            (h.id, since)
        });

        tracing::trace!(?previous, current = ?next, "hover changed");
        Some(HoverChanged {
            previous,
            current: next,
        })
    }

    /// Forget everything, e.g. when the pointer leaves the viewport.
    pub fn clear(&mut self, now: Duration) -> Option<HoverChanged> {
        self.update(None, now)
    }
}
