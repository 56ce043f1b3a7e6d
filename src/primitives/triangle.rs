use nalgebra::{Point3, Vector3};

use crate::extremes::Extremes;
use crate::ray::Ray;

use super::ObjectProps;

const EPSILON: f64 = 1e-7;

#[derive(Debug, Copy, Clone)]
pub struct Triangle {
    pub a: Point3<f64>,
    pub b: Point3<f64>,
    pub c: Point3<f64>,
    pub props: ObjectProps,
    /// Per-corner smooth normals, either supplied by the mesh or synthesized
    /// (see `crate::mesh`).
    pub normal_a: Vector3<f64>,
    pub normal_b: Vector3<f64>,
    pub normal_c: Vector3<f64>,
    edge1: Vector3<f64>,
    edge2: Vector3<f64>,
    pub extremes: Extremes,
}

impl Triangle {
    pub fn new(
        a: Point3<f64>,
        b: Point3<f64>,
        c: Point3<f64>,
        props: ObjectProps,
        normal_a: Vector3<f64>,
        normal_b: Vector3<f64>,
        normal_c: Vector3<f64>,
    ) -> Triangle {
        Triangle {
            a,
            b,
            c,
            props,
            normal_a,
            normal_b,
            normal_c,
            edge1: b - a,
            edge2: c - a,
            extremes: Extremes::from_points(&[a, b, c]),
        }
    }

    /// The unnormalized geometric face normal, `edge1 x edge2`.
    pub fn face_normal(&self) -> Vector3<f64> {
        self.edge1.cross(&self.edge2)
    }

    /// Möller-Trumbore intersection. `ray.direction` is normalized by
    /// construction, so `t` is already in world units.
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        let h = ray.direction.cross(&self.edge2);
        let a = self.edge1.dot(&h);

        if a.abs() < EPSILON {
            log::trace!("ray parallel to triangle plane (or degenerate triangle), a={a}");
            return None;
        }

        let f = 1.0 / a;
        let s = ray.origin - self.a;
        let u = f * s.dot(&h);

        if u < 0.0 || u > 1.0 {
            return None;
        }

        let q = s.cross(&self.edge1);
        let v = f * ray.direction.dot(&q);

        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * self.edge2.dot(&q);

        if t > EPSILON {
            Some(t)
        } else {
            None
        }
    }

    /// Barycentric-weighted blend of the three per-corner normals.
    pub fn surface_normal(&self, point: Point3<f64>) -> Vector3<f64> {
        let n = self.face_normal();
        let denom = n.dot(&n);

        // alpha/beta/gamma are the barycentric weights of A/B/C respectively,
        // computed as signed-area ratios of the sub-triangles {p,B,C} and
        // {p,C,A} against the full triangle's area (both projected along n).
        let alpha = n.dot(&(self.c - self.b).cross(&(point - self.b))) / denom;
        let beta = n.dot(&(self.a - self.c).cross(&(point - self.c))) / denom;
        let gamma = 1.0 - alpha - beta;

        (alpha * self.normal_a + beta * self.normal_b + gamma * self.normal_c).normalize()
    }
}
