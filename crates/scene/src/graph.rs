//! Scene graph with differential updates.
//!
//! `Scene::sync` diffs the incoming experience list against the nodes it
//! already holds and only touches what changed. Existing nodes keep their
//! pooled resources; positions are rewritten in place when the layout moves.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;
use serenpaths_common::seed;
use serenpaths_common::{Experience, ExperienceId, Rgb, theme_color};

use crate::layout::{
    self, ConnectionCurve, Placement, STAR_COUNT, Star, connection_curve, floating_positions,
    mission_particles, octahedron_radius, spiral_positions, thread_particles,
};
use crate::pool::{GeometryKind, MaterialHandle, MaterialKind, MeshHandle, ResourcePool};

/// Radius of the octahedron used for every floating mission.
pub const FLOATING_RADIUS: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Completed,
    Floating,
}

impl NodeKind {
    pub fn of(experience: &Experience) -> Self {
        if experience.completed {
            NodeKind::Completed
        } else {
            NodeKind::Floating
        }
    }
}

/// Edges are keyed by the ordered pair of completed node ids they join.
pub type EdgeKey = (ExperienceId, ExperienceId);

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: ExperienceId,
    pub kind: NodeKind,
    pub title: String,
    pub category: String,
    /// Index along the spiral (completed) or among floating missions.
    pub order: usize,
    pub position: Vec3,
    pub scale: f32,
    pub color: Rgb,
    pub geometry: GeometryKind,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    /// Particle cloud around floating missions; empty for completed nodes.
    pub particles: Vec<Vec3>,
    pub particle_material: Option<MaterialHandle>,
}

impl SceneNode {
    /// Radius used for ray picking.
    pub fn pick_radius(&self) -> f32 {
        self.geometry.radius() * self.scale
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneEdge {
    pub from: ExperienceId,
    pub to: ExperienceId,
    pub curve: ConnectionCurve,
    /// One thread material per curve segment, graded from `from` to `to`.
    pub segment_materials: Vec<MaterialHandle>,
    pub particles: Vec<(Vec3, MaterialHandle)>,
    colors: (Rgb, Rgb),
}

/// What a `Scene::sync` call changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneDiff {
    pub added: Vec<ExperienceId>,
    pub removed: Vec<ExperienceId>,
    pub moved: Vec<ExperienceId>,
    /// Nodes whose completed flag flipped.
    pub retyped: Vec<ExperienceId>,
    /// Title or category changed in place.
    pub updated: Vec<ExperienceId>,
    pub edges_added: Vec<EdgeKey>,
    pub edges_removed: Vec<EdgeKey>,
}

impl SceneDiff {
    pub fn is_empty(&self) -> bool {
        self.change_count() == 0
    }

    pub fn change_count(&self) -> usize {
        self.added.len()
            + self.removed.len()
            + self.moved.len()
            + self.retyped.len()
            + self.updated.len()
            + self.edges_added.len()
            + self.edges_removed.len()
    }
}

pub fn edge_seed(key: EdgeKey) -> u64 {
    seed::combine(key.0.0, key.1.0)
}

/// Renderable state derived from the experience list.
#[derive(Debug)]
pub struct Scene {
    nodes: BTreeMap<ExperienceId, SceneNode>,
    edges: BTreeMap<EdgeKey, SceneEdge>,
    pool: ResourcePool,
    stars: Vec<Star>,
    revision: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            pool: ResourcePool::new(),
            stars: layout::starfield(STAR_COUNT),
            revision: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of `sync` calls applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn node(&self, id: ExperienceId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }

    pub fn edge(&self, key: EdgeKey) -> Option<&SceneEdge> {
        self.edges.get(&key)
    }

    pub fn edges(&self) -> impl Iterator<Item = &SceneEdge> {
        self.edges.values()
    }

    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn completed_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|n| n.kind == NodeKind::Completed)
            .count()
    }

    /// Bring the scene in line with `experiences`.
    ///
    /// Completed experiences are laid out on the spiral in list order;
    /// consecutive completed nodes are joined by an edge. Duplicate ids after
    /// the first occurrence are ignored.
    pub fn sync(&mut self, experiences: &[Experience]) -> SceneDiff {
        let _span = tracing::info_span!("scene_sync", experiences = experiences.len()).entered();

        let mut seen = BTreeSet::new();
        let mut completed = Vec::new();
        let mut floating = Vec::new();
        for exp in experiences {
            if !seen.insert(exp.id) {
                tracing::warn!(id = %exp.id, "duplicate experience id ignored by scene");
                continue;
            }
            match NodeKind::of(exp) {
                NodeKind::Completed => completed.push(exp),
                NodeKind::Floating => floating.push(exp),
            }
        }

        let completed_ids: Vec<ExperienceId> = completed.iter().map(|e| e.id).collect();
        let floating_ids: Vec<ExperienceId> = floating.iter().map(|e| e.id).collect();
        let spiral = spiral_positions(&completed_ids);
        let drifting = floating_positions(&floating_ids, &spiral);

        let mut diff = SceneDiff::default();

        let stale: Vec<ExperienceId> = self
            .nodes
            .keys()
            .filter(|id| !seen.contains(*id))
            .copied()
            .collect();
        for id in stale {
            self.nodes.remove(&id);
            diff.removed.push(id);
        }

        let count = completed.len();
        for (order, (exp, placement)) in completed.iter().zip(&spiral).enumerate() {
            let geometry = GeometryKind::octahedron(octahedron_radius(order, count));
            self.upsert(exp, NodeKind::Completed, order, placement, geometry, &mut diff);
        }
        for (order, (exp, placement)) in floating.iter().zip(&drifting).enumerate() {
            let geometry = GeometryKind::octahedron(FLOATING_RADIUS);
            self.upsert(exp, NodeKind::Floating, order, placement, geometry, &mut diff);
        }

        self.sync_edges(&completed_ids, &mut diff);
        self.revision += 1;

        tracing::debug!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            moved = diff.moved.len(),
            retyped = diff.retyped.len(),
            edges_added = diff.edges_added.len(),
            edges_removed = diff.edges_removed.len(),
            "scene synced"
        );
        diff
    }

    fn upsert(
        &mut self,
        exp: &Experience,
        kind: NodeKind,
        order: usize,
        placement: &Placement,
        geometry: GeometryKind,
        diff: &mut SceneDiff,
    ) {
        let particles = match kind {
            NodeKind::Floating => mission_particles(placement.position, exp.id.0).to_vec(),
            NodeKind::Completed => Vec::new(),
        };

        if let Some(node) = self.nodes.get_mut(&exp.id) {
            if node.kind != kind {
                *node = build_node(&mut self.pool, exp, kind, order, placement, geometry, particles);
                diff.retyped.push(exp.id);
                return;
            }

            let moved = node.position != placement.position
                || node.scale != placement.scale
                || node.order != order
                || node.geometry != geometry;
            if moved {
                node.position = placement.position;
                node.scale = placement.scale;
                node.order = order;
                node.particles = particles;
                if node.geometry != geometry {
                    node.geometry = geometry;
                    node.mesh = self.pool.geometry(geometry);
                }
                diff.moved.push(exp.id);
            }

            if node.title != exp.title || node.category != exp.category {
                node.title = exp.title.clone();
                node.category = exp.category.clone();
                let color = theme_color(exp.id, Some(&exp.category));
                if color != node.color {
                    node.color = color;
                    node.material = self.pool.material(material_kind(kind), color);
                    node.particle_material = node
                        .particle_material
                        .map(|_| self.pool.material(MaterialKind::Particle, color));
                }
                diff.updated.push(exp.id);
            }
            return;
        }

        let node = build_node(&mut self.pool, exp, kind, order, placement, geometry, particles);
        self.nodes.insert(exp.id, node);
        diff.added.push(exp.id);
    }

    fn sync_edges(&mut self, completed_ids: &[ExperienceId], diff: &mut SceneDiff) {
        let wanted: BTreeSet<EdgeKey> = completed_ids.windows(2).map(|w| (w[0], w[1])).collect();

        let stale: Vec<EdgeKey> = self
            .edges
            .keys()
            .filter(|k| !wanted.contains(*k))
            .copied()
            .collect();
        for key in stale {
            self.edges.remove(&key);
            diff.edges_removed.push(key);
        }

        for key in wanted {
            let (Some(from), Some(to)) = (self.nodes.get(&key.0), self.nodes.get(&key.1)) else {
                continue;
            };
            let (start, end) = (from.position, to.position);
            let colors = (from.color, to.color);
            let unchanged = self.edges.get(&key).map(|edge| {
                edge.curve.start == start && edge.curve.end == end && edge.colors == colors
            });
            match unchanged {
                Some(true) => {}
                Some(false) => {
                    let edge = build_edge(&mut self.pool, key, start, end, colors);
                    self.edges.insert(key, edge);
                }
                None => {
                    let edge = build_edge(&mut self.pool, key, start, end, colors);
                    self.edges.insert(key, edge);
                    diff.edges_added.push(key);
                }
            }
        }
    }

    /// Drop every node and edge and release pooled resources.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.pool.reset();
    }
}

fn material_kind(kind: NodeKind) -> MaterialKind {
    match kind {
        NodeKind::Completed => MaterialKind::CompletedSphere,
        NodeKind::Floating => MaterialKind::FloatingMission,
    }
}

fn build_node(
    pool: &mut ResourcePool,
    exp: &Experience,
    kind: NodeKind,
    order: usize,
    placement: &Placement,
    geometry: GeometryKind,
    particles: Vec<Vec3>,
) -> SceneNode {
    let color = theme_color(exp.id, Some(&exp.category));
    let particle_material = match kind {
        NodeKind::Floating => Some(pool.material(MaterialKind::Particle, color)),
        NodeKind::Completed => None,
    };
    SceneNode {
        id: exp.id,
        kind,
        title: exp.title.clone(),
        category: exp.category.clone(),
        order,
        position: placement.position,
        scale: placement.scale,
        color,
        geometry,
        mesh: pool.geometry(geometry),
        material: pool.material(material_kind(kind), color),
        particles,
        particle_material,
    }
}

fn build_edge(
    pool: &mut ResourcePool,
    key: EdgeKey,
    start: Vec3,
    end: Vec3,
    colors: (Rgb, Rgb),
) -> SceneEdge {
    let curve = connection_curve(start, end, edge_seed(key));
    let last = (curve.points.len() - 1) as f32;
    let segment_materials = (0..curve.points.len() - 1)
        .map(|j| pool.material(MaterialKind::Thread, colors.0.lerp(colors.1, j as f32 / last)))
        .collect();
    let particles = thread_particles(&curve)
        .into_iter()
        .map(|(t, p)| (p, pool.material(MaterialKind::Particle, colors.0.lerp(colors.1, t))))
        .collect();
    SceneEdge {
        from: key.0,
        to: key.1,
        curve,
        segment_materials,
        particles,
        colors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serenpaths_common::ChallengeLevel;

    fn exp(id: u64, completed: bool, category: &str) -> Experience {
        Experience {
            id: ExperienceId(id),
            title: format!("Experience {id}"),
            category: category.into(),
            level: ChallengeLevel::Weekend,
            completed,
            date: Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
            kind: "test".into(),
            description: None,
            feedback: None,
            emotion: None,
        }
    }

    type NodeSig = (ExperienceId, NodeKind, Vec3, f32, u32, GeometryKind, Vec<Vec3>);
    type EdgeSig = (EdgeKey, Vec<Vec3>, usize);

    fn signature(scene: &Scene) -> (Vec<NodeSig>, Vec<EdgeSig>) {
        let nodes = scene
            .nodes()
            .map(|n| {
                (
                    n.id,
                    n.kind,
                    n.position,
                    n.scale,
                    n.color.to_hex(),
                    n.geometry,
                    n.particles.clone(),
                )
            })
            .collect();
        let edges = scene
            .edges()
            .map(|e| ((e.from, e.to), e.curve.points.clone(), e.particles.len()))
            .collect();
        (nodes, edges)
    }

    fn fresh(list: &[Experience]) -> Scene {
        let mut scene = Scene::new();
        scene.sync(list);
        scene
    }

    #[test]
    fn first_sync_adds_nodes_and_edges() {
        let list = vec![
            exp(1, true, "Social"),
            exp(2, true, "Lifestyle"),
            exp(3, true, "Social"),
            exp(4, false, "Art & Creative"),
        ];
        let mut scene = Scene::new();
        let diff = scene.sync(&list);
        assert_eq!(diff.added.len(), 4);
        assert_eq!(
            diff.edges_added,
            vec![
                (ExperienceId(1), ExperienceId(2)),
                (ExperienceId(2), ExperienceId(3))
            ]
        );
        assert_eq!(scene.len(), 4);
        assert_eq!(scene.completed_count(), 3);
        assert_eq!(scene.stars().len(), STAR_COUNT);
        let floating = scene.node(ExperienceId(4)).unwrap();
        assert_eq!(floating.particles.len(), layout::MISSION_PARTICLES);
    }

    #[test]
    fn repeated_sync_is_empty() {
        let list = vec![exp(1, true, "Social"), exp(2, false, "Social")];
        let mut scene = Scene::new();
        scene.sync(&list);
        let stats = scene.pool().stats();
        let diff = scene.sync(&list);
        assert!(diff.is_empty(), "{diff:?}");
        assert_eq!(scene.revision(), 2);
        assert_eq!(scene.pool().stats().materials, stats.materials);
    }

    #[test]
    fn accepting_a_mission_does_not_touch_completed_nodes() {
        let mut list = vec![exp(1, true, "Social"), exp(2, true, "Lifestyle")];
        let mut scene = Scene::new();
        scene.sync(&list);
        let before = scene.node(ExperienceId(1)).unwrap().clone();

        list.push(exp(3, false, "Social"));
        let diff = scene.sync(&list);
        assert_eq!(diff.added, vec![ExperienceId(3)]);
        assert!(diff.moved.is_empty());
        assert!(diff.edges_added.is_empty());
        let after = scene.node(ExperienceId(1)).unwrap();
        assert_eq!(after.mesh, before.mesh);
        assert_eq!(after.material, before.material);
    }

    #[test]
    fn completing_a_mission_retypes_and_extends_the_thread() {
        let mut list = vec![
            exp(1, true, "Social"),
            exp(2, true, "Social"),
            exp(3, false, "Social"),
        ];
        let mut scene = Scene::new();
        scene.sync(&list);

        list[2].completed = true;
        let diff = scene.sync(&list);
        assert_eq!(diff.retyped, vec![ExperienceId(3)]);
        assert_eq!(diff.edges_added, vec![(ExperienceId(2), ExperienceId(3))]);
        // Spiral parameter of node 2 changed from 1.0 to 0.5.
        assert!(diff.moved.contains(&ExperienceId(2)));
        assert_eq!(scene.node(ExperienceId(3)).unwrap().kind, NodeKind::Completed);
        assert!(scene.node(ExperienceId(3)).unwrap().particles.is_empty());
    }

    #[test]
    fn removing_a_node_removes_its_edges() {
        let mut list = vec![
            exp(1, true, "Social"),
            exp(2, true, "Social"),
            exp(3, true, "Social"),
        ];
        let mut scene = Scene::new();
        scene.sync(&list);
        list.remove(1);
        let diff = scene.sync(&list);
        assert_eq!(diff.removed, vec![ExperienceId(2)]);
        assert_eq!(diff.edges_removed.len(), 2);
        assert_eq!(diff.edges_added, vec![(ExperienceId(1), ExperienceId(3))]);
        assert!(scene.edge((ExperienceId(1), ExperienceId(2))).is_none());
    }

    #[test]
    fn incremental_sync_matches_full_rebuild() {
        let mut scene = Scene::new();
        let mut list = vec![exp(1, true, "Social"), exp(2, true, "Lifestyle")];
        scene.sync(&list);

        list.push(exp(3, false, "Food & Gourmet"));
        list.push(exp(4, false, "Entertainment"));
        scene.sync(&list);

        list[2].completed = true;
        scene.sync(&list);

        list.retain(|e| e.id != ExperienceId(4));
        list[0].category = "Nature & Outdoor".into();
        list.push(exp(5, false, "Other"));
        let diff = scene.sync(&list);
        assert_eq!(diff.updated, vec![ExperienceId(1)]);

        assert_eq!(signature(&scene), signature(&fresh(&list)));
    }

    #[test]
    fn same_category_shares_material() {
        let list = vec![exp(1, true, "Social"), exp(2, true, "Social")];
        let scene = fresh(&list);
        let a = scene.node(ExperienceId(1)).unwrap();
        let b = scene.node(ExperienceId(2)).unwrap();
        assert_eq!(a.material, b.material);
        assert_ne!(a.mesh, b.mesh); // octahedron radius differs along the spiral
    }

    #[test]
    fn duplicate_ids_are_ignored() {
        let list = vec![exp(1, true, "Social"), exp(1, false, "Social")];
        let scene = fresh(&list);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.node(ExperienceId(1)).unwrap().kind, NodeKind::Completed);
    }

    #[test]
    fn clear_empties_the_scene() {
        let mut scene = fresh(&[exp(1, true, "Social"), exp(2, true, "Social")]);
        scene.clear();
        assert!(scene.is_empty());
        assert_eq!(scene.edges().count(), 0);
        let diff = scene.sync(&[exp(1, true, "Social")]);
        assert_eq!(diff.added, vec![ExperienceId(1)]);
    }

    #[test]
    fn clear_does_not_reuse_material_handles() {
        let mut scene = fresh(&[exp(1, true, "Social")]);
        let old = scene.node(ExperienceId(1)).unwrap().material;
        scene.clear();
        scene.sync(&[exp(2, true, "Entertainment")]);
        let new = scene.node(ExperienceId(2)).unwrap().material;
        assert_ne!(old, new);
        assert!(scene.pool().material_params(old).is_none());
    }

    #[test]
    fn edge_seed_depends_on_order() {
        let a = (ExperienceId(1), ExperienceId(2));
        let b = (ExperienceId(2), ExperienceId(1));
        assert_ne!(edge_seed(a), edge_seed(b));
    }
}
