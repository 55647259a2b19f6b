//! Per-frame visual state, computed purely from time and hover state.

use std::time::Duration;

use glam::Vec3;
use serenpaths_common::ExperienceId;

use crate::graph::{NodeKind, Scene, SceneNode};

/// Spin of an idle floating mission, radians per second around x.
const FLOAT_SPIN: f32 = 0.6;

/// The node currently shown as hovered and when its hover began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverState {
    pub id: ExperienceId,
    pub since: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeVisual {
    pub id: ExperienceId,
    /// Absolute scale, including the node's base scale.
    pub scale: f32,
    pub emissive_intensity: f32,
    /// Euler angles in radians.
    pub rotation: Vec3,
}

/// Visual state of one node at `time`.
pub fn node_visual(node: &SceneNode, hover: Option<HoverState>, time: Duration) -> NodeVisual {
    let seconds = time.as_secs_f32();
    let index = node.order as f32;
    let hovered_since = hover.filter(|h| h.id == node.id).map(|h| h.since);
    let hover_ms = |since: Duration| time.saturating_sub(since).as_secs_f32() * 1000.0;

    let (scale, emissive_intensity, rotation) = match (node.kind, hovered_since) {
        (NodeKind::Completed, Some(since)) => {
            let h = hover_ms(since) * 0.005;
            (
                node.scale * (1.3 + (h * 3.0).sin() * 0.2),
                0.6 + (h * 4.0).sin() * 0.2,
                Vec3::new(h * 0.6, h * 1.2, 0.0),
            )
        }
        (NodeKind::Completed, None) => (
            node.scale * (1.0 + (seconds * 2.0 + index * 0.5).sin() * 0.05),
            0.3 + (seconds * 3.0 + index).sin() * 0.1,
            Vec3::ZERO,
        ),
        (NodeKind::Floating, Some(since)) => {
            let h = hover_ms(since) * 0.008;
            (
                1.5 + (h * 4.0).sin() * 0.3,
                0.8 + (h * 4.0).sin() * 0.2,
                float_rotation(seconds) + Vec3::new(h * 3.0, h * 2.4, h * 3.6),
            )
        }
        (NodeKind::Floating, None) => (
            1.0 + (seconds * 2.0 + index * 2.0).sin() * 0.2,
            0.3 + (seconds * 4.0 + index).sin() * 0.2,
            float_rotation(seconds),
        ),
    };

    NodeVisual {
        id: node.id,
        scale,
        emissive_intensity,
        rotation,
    }
}

fn float_rotation(seconds: f32) -> Vec3 {
    Vec3::new(1.0, 0.7, 0.4) * FLOAT_SPIN * seconds
}

/// Visual state of every node, in id order.
pub fn animate(scene: &Scene, hover: Option<HoverState>, time: Duration) -> Vec<NodeVisual> {
    scene
        .nodes()
        .map(|node| node_visual(node, hover, time))
        .collect()
}
