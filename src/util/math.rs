//! Math type re-exports and axis-aligned box algebra.
//!
//! This module re-exports the `glam` vector types used by the geometry store
//! and provides [`Aabb`] together with the two operations every BVH cost
//! computation is built from: [`union`] and [`surface_area`].

pub use glam::{Vec2, Vec3};

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Sentinel for "no node" / "no triangle" links.
pub const NULL_INDEX: u32 = u32::MAX;

/// Axis-aligned bounding box, `min[i] <= max[i]` on every axis.
#[derive(Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Empty box (inverted, identity element for [`union`]).
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create a new box from min and max corners.
    #[inline]
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box around a single point (zero volume).
    #[inline]
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Tight box around a set of points.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut b = Self::EMPTY;
        for &p in points {
            b.expand_by_point(p);
        }
        b
    }

    /// Tight box around a triangle's three corners.
    #[inline]
    pub fn from_triangle(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self {
            min: v0.min(v1).min(v2),
            max: v0.max(v1).max(v2),
        }
    }

    /// Check if this box is inverted (contains nothing).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Expand this box to include a point.
    #[inline]
    pub fn expand_by_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Union of two boxes. Pure.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Surface area `2 * (dx*dy + dy*dz + dz*dx)`. Zero for flat boxes.
    #[inline]
    pub fn surface_area(&self) -> f32 {
        let d = self.max - self.min;
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// True when `other` lies entirely inside this box (boundaries inclusive).
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    /// True when the boxes overlap (touching counts).
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for Aabb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Aabb({:?} - {:?})", self.min, self.max)
    }
}

/// Component-wise union of two boxes.
#[inline]
pub fn union(a: &Aabb, b: &Aabb) -> Aabb {
    a.union(b)
}

/// Surface area of a box, the BVH cost metric.
#[inline]
pub fn surface_area(b: &Aabb) -> f32 {
    b.surface_area()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_at(x: f32) -> Aabb {
        Aabb::new(Vec3::new(x, 0.0, 0.0), Vec3::new(x + 1.0, 1.0, 1.0))
    }

    #[test]
    fn test_union() {
        let a = unit_at(0.0);
        let b = unit_at(3.0);
        let u = union(&a, &b);
        assert_eq!(u.min, Vec3::ZERO);
        assert_eq!(u.max, Vec3::new(4.0, 1.0, 1.0));
        assert_eq!(union(&a, &b), union(&b, &a));
        assert_eq!(union(&Aabb::EMPTY, &a), a);
    }

    #[test]
    fn test_surface_area() {
        assert_eq!(surface_area(&unit_at(0.0)), 6.0);
        let b = Aabb::new(Vec3::ZERO, Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(b.surface_area(), 2.0 * (6.0 + 12.0 + 8.0));
    }

    #[test]
    fn test_surface_area_union_idempotent() {
        let boxes = [
            unit_at(-4.5),
            Aabb::new(Vec3::new(-1.0, 2.0, 0.5), Vec3::new(3.0, 2.5, 7.0)),
            Aabb::from_point(Vec3::splat(1.0)),
        ];
        for b in &boxes {
            assert_eq!(surface_area(&union(b, b)), surface_area(b));
        }
    }

    #[test]
    fn test_degenerate_boxes() {
        // Flat triangle in the XY plane
        let flat = Aabb::from_triangle(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        assert_eq!(flat.min.z, flat.max.z);
        assert_eq!(flat.surface_area(), 2.0);
        assert!(flat.surface_area().is_finite());

        let point = Aabb::from_point(Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(point.surface_area(), 0.0);
        assert!(!point.is_empty());
    }

    #[test]
    fn test_contains() {
        let outer = Aabb::new(Vec3::ZERO, Vec3::splat(10.0));
        let inner = unit_at(2.0);
        assert!(outer.contains(&inner));
        assert!(outer.contains(&outer));
        assert!(!inner.contains(&outer));
        assert!(!outer.contains(&unit_at(9.5)));
    }

    #[test]
    fn test_intersects() {
        let a = unit_at(0.0);
        assert!(a.intersects(&unit_at(0.5)));
        assert!(a.intersects(&unit_at(1.0)));
        assert!(!a.intersects(&unit_at(1.5)));
        assert!(!a.intersects(&Aabb::EMPTY));
    }

    #[test]
    fn test_from_points() {
        let b = Aabb::from_points(&[Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 4.0, 0.0)]);
        assert_eq!(b.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Vec3::new(1.0, 4.0, 3.0));
        assert!(Aabb::from_points(&[]).is_empty());
    }

    #[test]
    fn test_aabb_pod() {
        assert_eq!(std::mem::size_of::<Aabb>(), 24); // 2 * Vec3
    }
}
