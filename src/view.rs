//! The camera: derives an orthonormal image-plane basis from eye/lookAt/up
//! and turns pixel coordinates into primary rays.

use nalgebra::{Point3, Vector3};

use crate::ray::Ray;

#[derive(Debug, Clone)]
pub struct View {
    pub eye: Point3<f64>,
    pub look_at: Vector3<f64>,
    pub up: Vector3<f64>,
    pub fov: f64,

    u: Vector3<f64>,
    v: Vector3<f64>,
    du: Vector3<f64>,
    dv: Vector3<f64>,
    bottom_left: Point3<f64>,
}

impl View {
    /// `width`/`height` are the canvas dimensions this view plans rays for
    /// (already doubled by the caller when SSAA is enabled).
    pub fn new(
        width: u32,
        height: u32,
        eye: Point3<f64>,
        look_at: Vector3<f64>,
        up: Vector3<f64>,
        fov_degrees: f64,
    ) -> View {
        let lxup = look_at.cross(&up);
        let u = (-lxup / lxup.norm()).normalize();

        let lxu = look_at.cross(&u);
        let v = (-lxu / lxu.norm()).normalize();

        // Note the inversion versus the usual W/H: this matches the
        // reference camera's aspect convention exactly.
        let aspect_ratio = height as f64 / width as f64;

        let u_len = (fov_degrees * std::f64::consts::PI / 180.0).tan();
        let v_len = u_len * aspect_ratio;

        let du = u * (u_len / (width - 1) as f64);
        let dv = v * (v_len / (height - 1) as f64);

        let center_to_left = du * -((width / 2) as f64);
        let center_to_bottom = dv * -((height / 2) as f64);
        let bottom_left = eye + look_at + center_to_left + center_to_bottom;

        View {
            eye,
            look_at,
            up,
            fov: fov_degrees,
            u,
            v,
            du,
            dv,
            bottom_left,
        }
    }

    pub fn primary_ray(&self, i: u32, j: u32) -> Ray {
        let point = self.bottom_left + self.du * i as f64 + self.dv * j as f64;
        Ray::new(self.eye, point - self.eye, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn center_pixel_points_straight_down_look_at() {
        let view = View::new(
            101,
            101,
            Point3::origin(),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 1.0, 0.0),
            55.0,
        );
        let ray = view.primary_ray(50, 50);
        // The image is odd-sized so the exact center pixel's ray should be
        // very close to the look-at direction.
        let look_at_dir = Vector3::new(0.0, 0.0, 1.0).normalize();
        assert_relative_eq!(ray.direction.x, look_at_dir.x, epsilon = 1e-6);
        assert_relative_eq!(ray.direction.y, look_at_dir.y, epsilon = 1e-6);
        assert_relative_eq!(ray.direction.z, look_at_dir.z, epsilon = 1e-6);
    }

    #[test]
    fn basis_vectors_are_orthogonal_to_look_at() {
        let view = View::new(
            100,
            100,
            Point3::origin(),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 1.0, 0.0),
            60.0,
        );
        assert!(view.u.dot(&view.look_at).abs() < 1e-9);
        assert!(view.v.dot(&view.look_at).abs() < 1e-9);
    }
}
