//! Collidable volumes and ray queries
//!
//! Gameplay code never owns rendering resources. It refers to volumes through
//! opaque [`VolumeId`]s and asks a [`VolumeProvider`] for bounds and ray hits.
//! [`VolumeRegistry`] is the in-crate provider: plain axis-aligned boxes on the
//! floor plane, good enough for headless play and tests.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Opaque handle into a volume provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VolumeId(pub u32);

/// Axis-aligned box on the floor plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    /// Slab test. Returns the entry distance and the face normal that was hit.
    ///
    /// Rays starting inside the box report nothing; the face normal always
    /// opposes the ray direction.
    pub fn intersect(&self, ray: &Ray) -> Option<(f32, Vec2)> {
        let lo = self.min();
        let hi = self.max();
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut normal = Vec2::ZERO;

        for axis in 0..2 {
            let o = ray.origin[axis];
            let d = ray.dir[axis];
            if d.abs() < f32::EPSILON {
                // Parallel to this slab: must already be inside it
                if o < lo[axis] || o > hi[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (lo[axis] - o) * inv;
            let mut t1 = (hi[axis] - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > t_enter {
                t_enter = t0;
                normal = Vec2::ZERO;
                normal[axis] = -d.signum();
            }
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }

        if t_enter < 0.0 || t_enter > ray.length {
            return None;
        }
        Some((t_enter, normal))
    }
}

/// A bounded ray with a unit direction
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec2,
    pub dir: Vec2,
    pub length: f32,
}

impl Ray {
    pub fn new(origin: Vec2, dir: Vec2, length: f32) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
            length,
        }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec2 {
        self.origin + self.dir * t
    }
}

/// One intersection reported by a ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub volume: VolumeId,
    /// Distance along the ray from its origin
    pub distance: f32,
    /// Unit surface normal at the hit point
    pub normal: Vec2,
    pub point: Vec2,
}

/// Geometry service owned by the host (scene graph, physics engine, ...)
pub trait VolumeProvider {
    /// Create a box volume and return its handle. New volumes are enabled.
    fn create_box(&mut self, center: Vec2, half_extents: Vec2) -> VolumeId;

    fn set_center(&mut self, id: VolumeId, center: Vec2);

    /// Enabled volumes are visible and collidable
    fn set_enabled(&mut self, id: VolumeId, enabled: bool);

    fn bounds(&self, id: VolumeId) -> Option<Aabb>;

    /// Cast a ray against `candidates`, returning every hit in candidate order
    fn cast_ray(&self, ray: &Ray, candidates: &[VolumeId]) -> Vec<RayHit>;

    fn dispose(&mut self, id: VolumeId);
}

#[derive(Debug, Clone)]
struct Volume {
    bounds: Aabb,
    enabled: bool,
}

/// In-memory box volume provider
#[derive(Debug, Clone, Default)]
pub struct VolumeRegistry {
    volumes: Vec<Option<Volume>>,
}

impl VolumeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (not disposed) volumes
    pub fn len(&self) -> usize {
        self.volumes.iter().filter(|v| v.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_enabled(&self, id: VolumeId) -> bool {
        self.get(id).map(|v| v.enabled).unwrap_or(false)
    }

    fn get(&self, id: VolumeId) -> Option<&Volume> {
        self.volumes.get(id.0 as usize).and_then(|v| v.as_ref())
    }

    fn get_mut(&mut self, id: VolumeId) -> Option<&mut Volume> {
        self.volumes.get_mut(id.0 as usize).and_then(|v| v.as_mut())
    }
}

impl VolumeProvider for VolumeRegistry {
    fn create_box(&mut self, center: Vec2, half_extents: Vec2) -> VolumeId {
        let id = VolumeId(self.volumes.len() as u32);
        self.volumes.push(Some(Volume {
            bounds: Aabb::new(center, half_extents),
            enabled: true,
        }));
        id
    }

    fn set_center(&mut self, id: VolumeId, center: Vec2) {
        if let Some(volume) = self.get_mut(id) {
            volume.bounds.center = center;
        }
    }

    fn set_enabled(&mut self, id: VolumeId, enabled: bool) {
        if let Some(volume) = self.get_mut(id) {
            volume.enabled = enabled;
        }
    }

    fn bounds(&self, id: VolumeId) -> Option<Aabb> {
        self.get(id).map(|v| v.bounds)
    }

    fn cast_ray(&self, ray: &Ray, candidates: &[VolumeId]) -> Vec<RayHit> {
        candidates
            .iter()
            .filter_map(|&id| {
                let volume = self.get(id).filter(|v| v.enabled)?;
                let (distance, normal) = volume.bounds.intersect(ray)?;
                Some(RayHit {
                    volume: id,
                    distance,
                    normal,
                    point: ray.at(distance),
                })
            })
            .collect()
    }

    fn dispose(&mut self, id: VolumeId) {
        if let Some(slot) = self.volumes.get_mut(id.0 as usize) {
            *slot = None;
        }
    }
}
