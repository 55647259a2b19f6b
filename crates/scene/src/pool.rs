//! Shared geometry and material resources.
//!
//! Handles are stable until `dispose`: asking twice for the same geometry or
//! the same (material kind, colour) returns the same handle.

use std::collections::BTreeMap;
use std::fmt;

use serenpaths_common::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometryKind {
    SphereSmall,
    SphereMedium,
    SphereLarge,
    CylinderThread,
    ParticleSmall,
    ParticleTiny,
    /// Octahedron keyed by radius in thousandths.
    Octahedron { radius_milli: u32 },
}

impl GeometryKind {
    /// Geometries created up front by `ResourcePool::new`.
    pub const FIXED: [GeometryKind; 6] = [
        GeometryKind::SphereSmall,
        GeometryKind::SphereMedium,
        GeometryKind::SphereLarge,
        GeometryKind::CylinderThread,
        GeometryKind::ParticleSmall,
        GeometryKind::ParticleTiny,
    ];

    pub fn octahedron(radius: f32) -> Self {
        GeometryKind::Octahedron {
            radius_milli: (radius.max(0.0) * 1000.0).round() as u32,
        }
    }

    /// Bounding radius, used for pick tests.
    pub fn radius(self) -> f32 {
        match self {
            GeometryKind::SphereSmall => 0.2,
            GeometryKind::SphereMedium => 0.25,
            GeometryKind::SphereLarge => 0.3,
            GeometryKind::CylinderThread => 0.05,
            GeometryKind::ParticleSmall => 0.03,
            GeometryKind::ParticleTiny => 0.02,
            GeometryKind::Octahedron { radius_milli } => radius_milli as f32 / 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MaterialKind {
    CompletedSphere,
    FloatingMission,
    Thread,
    Particle,
}

/// Surface parameters handed to a renderer backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub color: Rgb,
    pub emissive: Rgb,
    pub emissive_intensity: f32,
    pub opacity: f32,
    pub metalness: f32,
    pub roughness: f32,
    pub additive: bool,
}

impl MaterialKind {
    pub fn params(self, color: Rgb) -> MaterialParams {
        match self {
            MaterialKind::CompletedSphere => MaterialParams {
                color,
                emissive: color,
                emissive_intensity: 0.8,
                opacity: 0.95,
                metalness: 0.4,
                roughness: 0.05,
                additive: false,
            },
            MaterialKind::FloatingMission => MaterialParams {
                color,
                emissive: color.scale(0.6),
                emissive_intensity: 0.7,
                opacity: 0.95,
                metalness: 0.1,
                roughness: 0.05,
                additive: false,
            },
            MaterialKind::Thread => MaterialParams {
                color,
                emissive: color,
                emissive_intensity: 0.2,
                opacity: 0.8,
                metalness: 0.0,
                roughness: 1.0,
                additive: false,
            },
            MaterialKind::Particle => MaterialParams {
                color,
                emissive: color,
                emissive_intensity: 0.5,
                opacity: 0.9,
                metalness: 0.0,
                roughness: 1.0,
                additive: true,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialHandle(pub u32);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub hits: u64,
    pub misses: u64,
    pub geometries: usize,
    pub materials: usize,
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "geometries={} materials={} hits={} misses={}",
            self.geometries, self.materials, self.hits, self.misses
        )
    }
}

#[derive(Debug, Default)]
pub struct ResourcePool {
    geometries: BTreeMap<GeometryKind, MeshHandle>,
    materials: BTreeMap<(MaterialKind, u32), MaterialHandle>,
    params: BTreeMap<MaterialHandle, MaterialParams>,
    next_handle: u32,
    hits: u64,
    misses: u64,
}

impl ResourcePool {
    pub fn new() -> Self {
        let mut pool = Self::default();
        pool.preload();
        pool
    }

    fn preload(&mut self) {
        for kind in GeometryKind::FIXED {
            let handle = MeshHandle(self.alloc());
            self.geometries.insert(kind, handle);
        }
    }

    fn alloc(&mut self) -> u32 {
        let id = self.next_handle;
        self.next_handle += 1;
        id
    }

    pub fn geometry(&mut self, kind: GeometryKind) -> MeshHandle {
        if let Some(&handle) = self.geometries.get(&kind) {
            self.hits += 1;
            return handle;
        }
        self.misses += 1;
        let handle = MeshHandle(self.alloc());
        self.geometries.insert(kind, handle);
        handle
    }

    /// Material for a kind and colour. Colours are keyed by their 8-bit hex
    /// value.
    pub fn material(&mut self, kind: MaterialKind, color: Rgb) -> MaterialHandle {
        let key = (kind, color.to_hex());
        if let Some(&handle) = self.materials.get(&key) {
            self.hits += 1;
            return handle;
        }
        self.misses += 1;
        let handle = MaterialHandle(self.alloc());
        self.materials.insert(key, handle);
        self.params.insert(handle, kind.params(color));
        handle
    }

    pub fn material_params(&self, handle: MaterialHandle) -> Option<&MaterialParams> {
        self.params.get(&handle)
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            hits: self.hits,
            misses: self.misses,
            geometries: self.geometries.len(),
            materials: self.materials.len(),
        }
    }

    /// Release everything. Previously returned handles become invalid.
    pub fn dispose(&mut self) {
        tracing::debug!(stats = %self.stats(), "disposing resource pool");
        self.geometries.clear();
        self.materials.clear();
        self.params.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Dispose, then preload the fixed geometries again. Handle numbering
    /// continues, so no handle issued before the reset is handed out again.
    pub fn reset(&mut self) {
        self.dispose();
        self.preload();
    }
}
