//! Geometric primitives and the material properties attached to them.

pub mod sphere;
pub mod triangle;

use nalgebra::{Point3, Vector3};

use crate::color::Color;
use crate::extremes::Extremes;
use crate::ray::Ray;

pub use sphere::Sphere;
pub use triangle::Triangle;

/// Material parameters shared by every surface a ray can hit.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ObjectProps {
    pub color: Color,
    pub reflectivity: f64,
    pub mirror: f64,
    pub specular: f64,
}

/// A primitive a ray can intersect: either a sphere or a triangle.
///
/// Tagged-enum dispatch (rather than a `dyn Trait`) keeps the BVH leaves and
/// the primitive list free of indirection and lets the compiler devirtualize
/// the hot `intersect`/`extremes` calls inside the trace loop.
#[derive(Debug, Clone)]
pub enum Primitive {
    Sphere(Sphere),
    Triangle(Triangle),
}

impl Primitive {
    /// Returns the distance along the ray to the closest strictly-positive
    /// intersection, or `None` on a miss.
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        match self {
            Primitive::Sphere(s) => s.intersect(ray),
            Primitive::Triangle(t) => t.intersect(ray),
        }
    }

    /// Surface normal at `point`. `Sphere`'s is unnormalized (`point -
    /// center`, scaled by however far `point` sits from the surface);
    /// `Triangle`'s is already a unit vector (the barycentric blend of unit
    /// corner normals). Callers normalize unconditionally rather than
    /// special-case the variant.
    pub fn surface_normal(&self, point: Point3<f64>) -> Vector3<f64> {
        match self {
            Primitive::Sphere(s) => s.surface_normal(point),
            Primitive::Triangle(t) => t.surface_normal(point),
        }
    }

    pub fn props(&self) -> ObjectProps {
        match self {
            Primitive::Sphere(s) => s.props,
            Primitive::Triangle(t) => t.props,
        }
    }

    /// Axis-aligned bounding box, computed eagerly at construction time and
    /// cached here (never mutated afterwards, so it's safe to share across
    /// render threads without synchronization).
    pub fn extremes(&self) -> Extremes {
        match self {
            Primitive::Sphere(s) => s.extremes,
            Primitive::Triangle(t) => t.extremes,
        }
    }
}
