use glam::{Vec2, Vec3};
use serenpaths_common::ExperienceId;
use serenpaths_scene::{NodeKind, Ray, Scene, SceneCamera};

/// Map a pointer position in pixels (origin top-left) to normalized device
/// coordinates (`[-1, 1]`, y up).
pub fn pointer_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    if width <= 0.0 || height <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(x / width * 2.0 - 1.0, -(y / height) * 2.0 + 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub id: ExperienceId,
    pub kind: NodeKind,
    /// Distance along the ray.
    pub distance: f32,
    pub point: Vec3,
}

/// Nearest interactable node hit by `ray`.
pub fn pick(scene: &Scene, ray: &Ray) -> Option<PickHit> {
    scene
        .nodes()
        .filter_map(|node| {
            ray.intersect_sphere(node.position, node.pick_radius())
                .map(|distance| PickHit {
                    id: node.id,
                    kind: node.kind,
                    distance,
                    point: ray.at(distance),
                })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Pick from pixel coordinates.
pub fn pick_at(
    scene: &Scene,
    camera: &SceneCamera,
    pointer: Vec2,
    viewport: Vec2,
) -> Option<PickHit> {
    let ndc = pointer_to_ndc(pointer.x, pointer.y, viewport.x, viewport.y);
    pick(scene, &camera.ray(ndc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serenpaths_common::{ChallengeLevel, Experience};

    fn exp(id: u64, completed: bool) -> Experience {
        Experience {
            id: ExperienceId(id),
            title: format!("E{id}"),
            category: "Social".into(),
            level: ChallengeLevel::Weekend,
            completed,
            date: Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
            kind: "test".into(),
            description: None,
            feedback: None,
            emotion: None,
        }
    }

    #[test]
    fn ndc_corners_and_center() {
        assert_eq!(pointer_to_ndc(0.0, 0.0, 800.0, 600.0), Vec2::new(-1.0, 1.0));
        assert_eq!(pointer_to_ndc(800.0, 600.0, 800.0, 600.0), Vec2::new(1.0, -1.0));
        assert_eq!(pointer_to_ndc(400.0, 300.0, 800.0, 600.0), Vec2::ZERO);
        assert_eq!(pointer_to_ndc(5.0, 5.0, 0.0, 600.0), Vec2::ZERO);
    }

    #[test]
    fn picking_through_a_projected_node_hits_it() {
        let mut scene = Scene::new();
        scene.sync(&[exp(1, true), exp(2, true), exp(3, false)]);
        let camera = SceneCamera::default();

        for node in scene.nodes() {
            let Some(ndc) = camera.project(node.position) else {
                continue;
            };
            let hit = pick(&scene, &camera.ray(ndc)).unwrap();
            // Either this node or one in front of it.
            let target = ray_distance(&camera, node.position);
            assert!(hit.distance <= target + 1e-3);
        }
    }

    fn ray_distance(camera: &SceneCamera, point: Vec3) -> f32 {
        let ray = camera.ray(camera.project(point).unwrap());
        (point - ray.origin).length()
    }

    #[test]
    fn nearest_node_wins() {
        let mut scene = Scene::new();
        scene.sync(&[exp(1, true), exp(2, true)]);
        let a = scene.node(ExperienceId(1)).unwrap().position;
        let b = scene.node(ExperienceId(2)).unwrap().position;

        // A ray through both centres: the closer one must be returned.
        let origin = a + (a - b).normalize() * 5.0;
        let ray = Ray::new(origin, b - a);
        let hit = pick(&scene, &ray).unwrap();
        assert_eq!(hit.id, ExperienceId(1));
        assert_eq!(hit.kind, NodeKind::Completed);
    }

    #[test]
    fn empty_space_misses() {
        let mut scene = Scene::new();
        scene.sync(&[exp(1, true)]);
        let ray = Ray::new(Vec3::new(100.0, 100.0, 5.0), Vec3::NEG_Z);
        assert!(pick(&scene, &ray).is_none());
    }
}
