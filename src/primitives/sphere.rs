use nalgebra::{Point3, Vector3};

use crate::extremes::Extremes;
use crate::ray::Ray;

use super::ObjectProps;

#[derive(Debug, Copy, Clone)]
pub struct Sphere {
    pub center: Point3<f64>,
    pub radius: f64,
    pub props: ObjectProps,
    pub extremes: Extremes,
}

impl Sphere {
    pub fn new(center: Point3<f64>, radius: f64, props: ObjectProps) -> Sphere {
        let extremes = Extremes {
            min_x: center.x - radius,
            min_y: center.y - radius,
            min_z: center.z - radius,
            max_x: center.x + radius,
            max_y: center.y + radius,
            max_z: center.z + radius,
        };

        Sphere {
            center,
            radius,
            props,
            extremes,
        }
    }

    /// Solves `|origin + t*d - center|^2 = r^2` for the smallest
    /// strictly-positive `t`. `ray.direction` is already normalized.
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        let oc = ray.origin - self.center;
        let x = ray.direction.dot(&oc);
        let discriminant = x * x - (oc.dot(&oc) - self.radius * self.radius);

        if discriminant < 0.0 {
            return None;
        }

        let e = discriminant.sqrt();
        let t1 = -x + e;
        let t2 = -x - e;

        match (t1 > 0.0, t2 > 0.0) {
            (true, true) => Some(t1.min(t2)),
            (true, false) => Some(t1),
            (false, true) => Some(t2),
            (false, false) => None,
        }
    }

    pub fn surface_normal(&self, point: Point3<f64>) -> Vector3<f64> {
        point - self.center
    }
}
