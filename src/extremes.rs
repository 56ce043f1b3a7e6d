//! Axis-aligned bounding boxes used by primitives and the BVH.

use nalgebra::{Point3, Vector3};

use crate::ray::Ray;

/// An axis-aligned box given as six scalars (min/max per axis).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Extremes {
    pub min_x: f64,
    pub min_y: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub max_z: f64,
}

impl Extremes {
    pub fn from_points(points: &[Point3<f64>]) -> Extremes {
        let mut min = Vector3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Vector3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);

        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Extremes {
            min_x: min.x,
            min_y: min.y,
            min_z: min.z,
            max_x: max.x,
            max_y: max.y,
            max_z: max.z,
        }
    }

    /// Componentwise min/max of two boxes.
    pub fn merge(a: Extremes, b: Extremes) -> Extremes {
        Extremes {
            min_x: a.min_x.min(b.min_x),
            min_y: a.min_y.min(b.min_y),
            min_z: a.min_z.min(b.min_z),
            max_x: a.max_x.max(b.max_x),
            max_y: a.max_y.max(b.max_y),
            max_z: a.max_z.max(b.max_z),
        }
    }

    pub fn x_diff(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn y_diff(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn z_diff(&self) -> f64 {
        self.max_z - self.min_z
    }

    /// Tavianator's slab-method ray/box test. `ray.direction` must already be
    /// normalized (the `Ray` construction contract guarantees this).
    pub fn intersects(&self, ray: &Ray) -> bool {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let tx1 = (self.min_x - ray.origin.x) * inv_dir.x;
        let tx2 = (self.max_x - ray.origin.x) * inv_dir.x;
        let mut tmin = tx1.min(tx2);
        let mut tmax = tx1.max(tx2);

        let ty1 = (self.min_y - ray.origin.y) * inv_dir.y;
        let ty2 = (self.max_y - ray.origin.y) * inv_dir.y;
        tmin = tmin.max(ty1.min(ty2));
        tmax = tmax.min(ty1.max(ty2));

        let tz1 = (self.min_z - ray.origin.z) * inv_dir.z;
        let tz2 = (self.max_z - ray.origin.z) * inv_dir.z;
        tmin = tmin.max(tz1.min(tz2));
        tmax = tmax.min(tz1.max(tz2));

        tmax >= tmin.max(0.0)
    }
}
