//! Deterministic procedural placement.
//!
//! Every jitter value is drawn from `unit_random(entity_id, salt)`, so the
//! same ids always produce the same scene.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use serenpaths_common::{ExperienceId, Rgb};

pub use serenpaths_common::seed::unit_random;

pub const SPIRAL_TURNS: f32 = 2.0;
pub const DEPTH_RANGE: f32 = 6.0;
pub const BASE_RADIUS: f32 = 2.0;
/// Radius of the ring used for floating missions when nothing is completed.
pub const FLOATING_RING_RADIUS: f32 = 2.0;
pub const CURVE_SEGMENTS: usize = 30;
pub const MISSION_PARTICLES: usize = 5;
pub const STAR_COUNT: usize = 1000;

// Salts: one independent stream per jitter parameter.
const SALT_ANGLE: u64 = 1;
const SALT_DISTANCE: u64 = 2;
const SALT_HEIGHT: u64 = 3;
const SALT_SCALE: u64 = 4;
const SALT_RING_Z: u64 = 5;
const SALT_FLOAT_ANGLE: u64 = 6;
const SALT_FLOAT_HEIGHT: u64 = 7;
const SALT_BULGE: u64 = 10;
const SALT_PARTICLE: u64 = 20;
const SALT_STAR: u64 = 40;

/// Where a node sits and how big it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub id: ExperienceId,
    pub position: Vec3,
    pub scale: f32,
}

/// Spiral progress of index `i` out of `n`, in `[0, 1]`.
pub fn spiral_t(index: usize, count: usize) -> f32 {
    index as f32 / count.saturating_sub(1).max(1) as f32
}

/// Place completed nodes along a two-turn spiral receding from the camera.
pub fn spiral_positions(ids: &[ExperienceId]) -> Vec<Placement> {
    let n = ids.len();
    ids.iter()
        .enumerate()
        .map(|(i, &id)| {
            let seed = id.0;
            let t = spiral_t(i, n);
            let angle = t * SPIRAL_TURNS * TAU;
            let depth = -DEPTH_RANGE / 2.0 + t * DEPTH_RANGE;
            let radius = BASE_RADIUS + t * 0.8;

            let angle_offset = (unit_random(seed, SALT_ANGLE) - 0.5) * PI / 3.0;
            let distance = 0.8 + unit_random(seed, SALT_DISTANCE) * 0.4;
            let height = (unit_random(seed, SALT_HEIGHT) - 0.5) * 1.5;
            let final_angle = angle + angle_offset;

            Placement {
                id,
                position: Vec3::new(
                    final_angle.cos() * radius * distance,
                    final_angle.sin() * radius * distance + height,
                    depth,
                ),
                scale: 0.8 + unit_random(seed, SALT_SCALE) * 0.4,
            }
        })
        .collect()
}

/// Place ongoing missions.
///
/// With no completed nodes they form a ring around the origin; otherwise
/// they continue the spiral behind the last completed node.
pub fn floating_positions(ids: &[ExperienceId], completed: &[Placement]) -> Vec<Placement> {
    let m = ids.len();
    match completed.last() {
        None => ids
            .iter()
            .enumerate()
            .map(|(i, &id)| {
                let angle = i as f32 / m.max(1) as f32 * TAU;
                Placement {
                    id,
                    position: Vec3::new(
                        angle.cos() * FLOATING_RING_RADIUS,
                        angle.sin() * FLOATING_RING_RADIUS,
                        unit_random(id.0, SALT_RING_Z) * 2.0 - 1.0,
                    ),
                    scale: 1.0,
                }
            })
            .collect(),
        Some(last) => {
            let n = completed.len();
            // Same angular step as the completed spiral.
            let step = SPIRAL_TURNS * TAU / n.saturating_sub(1).max(1) as f32;
            ids.iter()
                .enumerate()
                .map(|(i, &id)| {
                    let seed = id.0;
                    let angle = (n + i) as f32 * step
                        + (unit_random(seed, SALT_FLOAT_ANGLE) - 0.5) * PI / 4.0;
                    let radius = 2.5 + 0.5 * i as f32 / m.max(1) as f32;
                    let height = unit_random(seed, SALT_FLOAT_HEIGHT) - 0.5;
                    Placement {
                        id,
                        position: Vec3::new(
                            angle.cos() * radius,
                            angle.sin() * radius + height,
                            last.position.z + 0.8 * (i + 1) as f32,
                        ),
                        scale: 1.0,
                    }
                })
                .collect()
        }
    }
}

/// Octahedron radius for the `index`-th of `count` completed nodes.
pub fn octahedron_radius(index: usize, count: usize) -> f32 {
    0.2 + spiral_t(index, count) * 0.1
}

/// A sampled thread between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionCurve {
    pub start: Vec3,
    pub mid: Vec3,
    pub end: Vec3,
    /// `CURVE_SEGMENTS + 1` samples from `start` to `end`.
    pub points: Vec<Vec3>,
    /// Straight-line distance between the endpoints.
    pub distance: f32,
}

impl ConnectionCurve {
    /// Point on the curve at `t` in `[0, 1]`.
    pub fn point_at(&self, t: f32) -> Vec3 {
        catmull_rom3([self.start, self.mid, self.end], t)
    }

    /// Segment endpoints, one pair per thread cylinder.
    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }
}

fn catmull_rom_segment(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * (2.0 * p1
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}

/// Uniform Catmull-Rom through three control points, with mirrored phantom
/// endpoints.
fn catmull_rom3(points: [Vec3; 3], t: f32) -> Vec3 {
    let [a, b, c] = points;
    let t = t.clamp(0.0, 1.0);
    if t == 0.0 {
        return a;
    }
    if t == 1.0 {
        return c;
    }
    let before = 2.0 * a - b;
    let after = 2.0 * c - b;
    let scaled = t * 2.0;
    if scaled < 1.0 {
        catmull_rom_segment(before, a, b, c, scaled)
    } else {
        catmull_rom_segment(a, b, c, after, scaled - 1.0)
    }
}

/// Build the thread between two nodes. The midpoint bulges sideways by up
/// to `0.3 * distance`, seeded so the thread keeps its shape across frames.
pub fn connection_curve(start: Vec3, end: Vec3, seed: u64) -> ConnectionCurve {
    let distance = start.distance(end);
    let bulge = distance * 0.3;
    let offset = Vec3::new(
        unit_random(seed, SALT_BULGE) - 0.5,
        unit_random(seed, SALT_BULGE + 1) - 0.5,
        unit_random(seed, SALT_BULGE + 2) - 0.5,
    ) * bulge;
    let mid = (start + end) * 0.5 + offset;

    let control = [start, mid, end];
    let points = (0..=CURVE_SEGMENTS)
        .map(|i| catmull_rom3(control, i as f32 / CURVE_SEGMENTS as f32))
        .collect();

    ConnectionCurve {
        start,
        mid,
        end,
        points,
        distance,
    }
}

pub fn thread_particle_count(distance: f32) -> usize {
    ((distance * 2.0).floor() as usize).max(3)
}

/// Particles spread evenly along a thread, with their curve parameter.
pub fn thread_particles(curve: &ConnectionCurve) -> Vec<(f32, Vec3)> {
    let count = thread_particle_count(curve.distance);
    (0..count)
        .map(|j| {
            let t = j as f32 / count as f32;
            (t, curve.point_at(t))
        })
        .collect()
}

/// Fixed particle cloud around a floating mission.
pub fn mission_particles(center: Vec3, seed: u64) -> [Vec3; MISSION_PARTICLES] {
    std::array::from_fn(|p| {
        let salt = SALT_PARTICLE + 3 * p as u64;
        let offset = Vec3::new(
            unit_random(seed, salt) * 0.8 - 0.4,
            unit_random(seed, salt + 1) * 0.8 - 0.4,
            unit_random(seed, salt + 2) * 0.8 - 0.4,
        );
        center + offset
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec3,
    pub color: Rgb,
}

/// Background stars, deterministic for a given count.
pub fn starfield(count: usize) -> Vec<Star> {
    (0..count as u64)
        .map(|i| {
            let r1 = unit_random(i, SALT_STAR);
            let r2 = unit_random(i, SALT_STAR + 1);
            let r3 = unit_random(i, SALT_STAR + 2);
            Star {
                position: Vec3::new((r1 - 0.5) * 50.0, (r2 - 0.5) * 50.0, -20.0 + r3 * 20.0),
                color: Rgb::from_hsl(r1 * 360.0, 0.5, 0.5 + r2 * 0.5),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(range: std::ops::RangeInclusive<u64>) -> Vec<ExperienceId> {
        range.map(ExperienceId).collect()
    }

    #[test]
    fn spiral_is_deterministic() {
        let a = spiral_positions(&ids(1..=8));
        let b = spiral_positions(&ids(1..=8));
        assert_eq!(a, b);
    }

    #[test]
    fn spiral_depth_spans_range_and_scales_stay_bounded() {
        let placed = spiral_positions(&ids(1..=5));
        assert_eq!(placed.len(), 5);
        assert_eq!(placed[0].position.z, -3.0);
        assert_eq!(placed[4].position.z, 3.0);
        for p in &placed {
            assert!((0.8..1.2).contains(&p.scale));
            let planar = p.position.truncate().length();
            // radius * distance in [1.6, 3.36), height jitter ±0.75
            assert!(planar < 2.8 * 1.2 + 0.75 + 1e-4, "{planar}");
        }
    }

    #[test]
    fn single_completed_node_sits_at_spiral_start() {
        let placed = spiral_positions(&ids(9..=9));
        assert_eq!(placed[0].position.z, -3.0);
    }

    #[test]
    fn floating_ring_without_completed_nodes() {
        let placed = floating_positions(&ids(1..=4), &[]);
        for p in &placed {
            let planar = p.position.truncate().length();
            assert!((planar - FLOATING_RING_RADIUS).abs() < 1e-4);
            assert!((-1.0..1.0).contains(&p.position.z));
        }
    }

    #[test]
    fn floating_continues_behind_last_completed() {
        let completed = spiral_positions(&ids(1..=3));
        let last_z = completed[2].position.z;
        let placed = floating_positions(&ids(4..=6), &completed);
        for (i, p) in placed.iter().enumerate() {
            assert!((p.position.z - (last_z + 0.8 * (i + 1) as f32)).abs() < 1e-5);
        }
    }

    #[test]
    fn curve_passes_through_control_points() {
        let start = Vec3::new(-1.0, 0.0, -2.0);
        let end = Vec3::new(2.0, 1.0, 0.5);
        let curve = connection_curve(start, end, 77);
        assert_eq!(curve.points.len(), CURVE_SEGMENTS + 1);
        assert_eq!(curve.points[0], start);
        assert_eq!(curve.points[CURVE_SEGMENTS], end);
        assert!(curve.points[CURVE_SEGMENTS / 2].distance(curve.mid) < 1e-5);
        assert_eq!(curve.segments().count(), CURVE_SEGMENTS);

        let straight_mid = (start + end) * 0.5;
        assert!(curve.mid.distance(straight_mid) <= curve.distance * 0.3);
        assert_eq!(curve, connection_curve(start, end, 77));
    }

    #[test]
    fn particle_counts() {
        assert_eq!(thread_particle_count(0.0), 3);
        assert_eq!(thread_particle_count(1.4), 3);
        assert_eq!(thread_particle_count(2.6), 5);

        let curve = connection_curve(Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), 1);
        let particles = thread_particles(&curve);
        assert_eq!(particles.len(), 6);
        assert_eq!(particles[0].1, Vec3::ZERO);
    }

    #[test]
    fn mission_particles_stay_close() {
        let center = Vec3::new(1.0, 2.0, 3.0);
        let cloud = mission_particles(center, 5);
        for p in cloud {
            let d = p - center;
            assert!(d.abs().max_element() <= 0.4);
        }
        assert_eq!(cloud, mission_particles(center, 5));
    }

    #[test]
    fn starfield_bounds() {
        let stars = starfield(STAR_COUNT);
        assert_eq!(stars.len(), 1000);
        for s in &stars {
            assert!(s.position.x.abs() <= 25.0 && s.position.y.abs() <= 25.0);
            assert!((-20.0..0.0).contains(&s.position.z));
        }
        assert_eq!(stars[17], starfield(20)[17]);
    }
}
