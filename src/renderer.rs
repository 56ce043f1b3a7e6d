//! The recursive shader and the parallel pixel dispatcher.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::canvas::Canvas;
use crate::color::Color;
use crate::ray::Ray;
use crate::scene::Scene;

const MAX_DEPTH: u32 = 10;
const EPS_HIT: f64 = 1e-7;

/// Traces a single ray through the scene, recursing on mirror reflection.
pub fn trace(ray: &Ray, scene: &Scene) -> Color {
    if ray.depth >= MAX_DEPTH {
        return Color::BLACK;
    }

    let hit = scene
        .bvh
        .relevant(ray)
        .into_iter()
        .filter_map(|i| {
            let prim = &scene.primitives[i];
            prim.intersect(ray)
                .filter(|&t| t >= EPS_HIT)
                .map(|t| (t, prim))
        })
        .min_by(|(t1, _), (t2, _)| t1.partial_cmp(t2).expect("NaN intersection distance"));

    let (t_min, closest) = match hit {
        Some(h) => h,
        None => {
            return if ray.depth == 0 {
                scene.background
            } else {
                Color::BLACK
            };
        }
    };

    let props = closest.props();
    if props.reflectivity <= 0.0 {
        return props.color;
    }

    let p = ray.at(t_min);
    let n = closest.surface_normal(p).normalize();
    let d = ray.direction;
    let mut color = props.color;

    let r = d - 2.0 * n.dot(&d) * n;
    let reflected_ray = Ray::new(p, r, ray.depth + 1);

    for light in &scene.lights {
        let towards_light = (-light.direction).normalize();

        let shadow_ray = Ray::new(p, towards_light, 0);
        let in_shadow = scene.bvh.relevant(&shadow_ray).into_iter().any(|i| {
            scene.primitives[i]
                .intersect(&shadow_ray)
                .is_some_and(|t| t >= EPS_HIT)
        });
        if in_shadow {
            continue;
        }

        let ld = towards_light.dot(&n);
        if ld > 0.0 {
            color = color.merge(light.color, ld * props.reflectivity);
        }

        let mut s = reflected_ray.direction.dot(&towards_light);
        if s > 0.0 {
            s = s * s; // s^2
            s = s * s; // s^4
            s = s * s; // s^8
            s *= props.specular;
            color = color.saturating_add(light.color.scale(s));
        }
    }

    let reflection_color = trace(&reflected_ray, scene);
    color.merge(reflection_color, props.mirror)
}

/// Renders every pixel of `scene`'s canvas resolution, dispatched across the
/// host's logical CPUs via rayon's global work-stealing pool. Each scanline
/// is written by exactly one worker (the raw buffer is chunked into
/// disjoint `width * 3`-byte row slices), so no per-pixel synchronization is
/// needed.
pub fn render(scene: &Scene) -> Canvas {
    let mut canvas = Canvas::new(scene.width, scene.height);
    let width = scene.width;

    let progress = ProgressBar::new(scene.height as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} rows")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    canvas
        .raw_mut()
        .par_chunks_mut(width * 3)
        .enumerate()
        .for_each(|(y, row)| {
            log::debug!("dispatching row {y} on {:?}", std::thread::current().id());
            for x in 0..width {
                let ray = scene.view.primary_ray(x as u32, y as u32);
                let color = trace(&ray, scene);
                row[x * 3] = color.r;
                row[x * 3 + 1] = color.g;
                row[x * 3 + 2] = color.b;
            }
            progress.inc(1);
        });

    progress.finish_and_clear();
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::Bvh;
    use crate::lights::Light;
    use crate::primitives::{ObjectProps, Primitive, Sphere};
    use crate::view::View;
    use nalgebra::{Point3, Vector3};

    fn flat_sphere_scene() -> Scene {
        let sphere = Primitive::Sphere(Sphere::new(
            Point3::new(0.0, 0.0, 5.0),
            1.0,
            ObjectProps {
                color: Color::new(255, 0, 0),
                reflectivity: 0.0,
                mirror: 0.0,
                specular: 0.0,
            },
        ));
        let primitives = vec![sphere];
        let bvh = Bvh::build(&primitives);
        let view = View::new(
            100,
            100,
            Point3::origin(),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 1.0, 0.0),
            55.0,
        );

        Scene {
            primitives,
            bvh,
            lights: vec![Light {
                direction: Vector3::new(0.0, 0.0, 1.0),
                color: Color::new(255, 255, 255),
            }],
            background: Color::BLACK,
            view,
            width: 100,
            height: 100,
            ssaa: false,
        }
    }

    #[test]
    fn unlit_hit_returns_flat_material_color() {
        let scene = flat_sphere_scene();
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, 1.0), 0);
        let color = trace(&ray, &scene);
        assert_eq!(color, Color::new(255, 0, 0));
    }

    #[test]
    fn miss_on_primary_ray_returns_background() {
        let scene = flat_sphere_scene();
        let ray = Ray::new(Point3::origin(), Vector3::new(1.0, 0.0, 0.0), 0);
        assert_eq!(trace(&ray, &scene), scene.background);
    }

    #[test]
    fn miss_on_secondary_ray_returns_black_not_background() {
        let scene = flat_sphere_scene();
        let ray = Ray::new(Point3::origin(), Vector3::new(1.0, 0.0, 0.0), 1);
        assert_eq!(trace(&ray, &scene), Color::BLACK);
    }

    #[test]
    fn recursion_stops_at_max_depth() {
        let scene = flat_sphere_scene();
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, 1.0), MAX_DEPTH);
        assert_eq!(trace(&ray, &scene), Color::BLACK);
    }
}
