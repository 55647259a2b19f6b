use std::fmt::Write as _;

use crate::camera::SceneCamera;
use crate::graph::{NodeKind, Scene};

/// Renderer-agnostic interface.
///
/// A renderer reads the scene and a camera and produces output. It never
/// mutates the scene; scene state is derived from the journal by `Scene::sync`.
pub trait Renderer {
    type Output;

    fn render(&self, scene: &Scene, camera: &SceneCamera) -> Self::Output;
}

/// Human-readable dump of the scene, for the CLI and for tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// Also list threads between completed nodes.
    pub show_edges: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self { show_edges: true }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, camera: &SceneCamera) -> String {
        let mut out = String::new();
        let floating = scene.len() - scene.completed_count();
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "=== Scene (revision={}, completed={}, floating={}) ===",
            scene.revision(),
            scene.completed_count(),
            floating
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            camera.position.x,
            camera.position.y,
            camera.position.z,
            camera.target.x,
            camera.target.y,
            camera.target.z,
            camera.fov.to_degrees()
        );
        let _ = writeln!(out, "Pool: {}", scene.pool().stats());

        for node in scene.nodes() {
            let p = node.position;
            let marker = match node.kind {
                NodeKind::Completed => '*',
                NodeKind::Floating => 'o',
            };
            let _ = writeln!(
                out,
                "  {marker} [{}] pos=({:.2}, {:.2}, {:.2}) scale={:.2} color=#{:06x} {}",
                node.id,
                p.x,
                p.y,
                p.z,
                node.scale,
                node.color.to_hex(),
                node.title
            );
        }

        if self.show_edges {
            for edge in scene.edges() {
                let _ = writeln!(
                    out,
                    "  ~ {} -> {} length={:.2} particles={}",
                    edge.from,
                    edge.to,
                    edge.curve.distance,
                    edge.particles.len()
                );
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serenpaths_common::{ChallengeLevel, Experience, ExperienceId};

    fn exp(id: u64, completed: bool) -> Experience {
        Experience {
            id: ExperienceId(id),
            title: format!("Walk {id}"),
            category: "Lifestyle".into(),
            level: ChallengeLevel::Petit,
            completed,
            date: Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
            kind: "test".into(),
            description: None,
            feedback: None,
            emotion: None,
        }
    }

    #[test]
    fn debug_renderer_empty_scene() {
        let output = DebugTextRenderer::new().render(&Scene::new(), &SceneCamera::default());
        assert!(output.contains("revision=0"));
        assert!(output.contains("completed=0, floating=0"));
        assert!(output.contains("fov=75"));
    }

    #[test]
    fn debug_renderer_lists_nodes_and_edges() {
        let mut scene = Scene::new();
        scene.sync(&[exp(1, true), exp(2, true), exp(3, false)]);
        let output = DebugTextRenderer::new().render(&scene, &SceneCamera::default());
        assert!(output.contains("completed=2, floating=1"));
        assert!(output.contains("* [1]"));
        assert!(output.contains("o [3]"));
        assert!(output.contains("~ 1 -> 2"));

        let quiet = DebugTextRenderer::default().render(&scene, &SceneCamera::default());
        assert!(!quiet.contains("~ 1 -> 2"));
    }
}
