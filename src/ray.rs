use nalgebra::{Point3, Vector3};

/// A ray cast either from the camera (primary) or during shading (shadow /
/// reflection, secondary).
///
/// `direction` is normalized at construction time and stays normalized for
/// the lifetime of the ray; this resolves the normalization ambiguity around
/// `at(t)` noted for triangle intersection (see `Triangle::intersect`) by
/// making "unnormalized direction" an impossible state rather than a case
/// every consumer has to guard against.
#[derive(Debug, Copy, Clone)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub direction: Vector3<f64>,
    pub depth: u32,
}

impl Ray {
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>, depth: u32) -> Ray {
        Ray {
            origin,
            direction: direction.normalize(),
            depth,
        }
    }

    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }
}
