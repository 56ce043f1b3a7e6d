//! Turns a parsed `ImageSpec` into the read-only scene the renderer traces
//! against: resolved materials, concrete primitives, a built BVH and view.

pub mod spec;

use std::collections::HashMap;
use std::path::Path;

use crate::bvh::Bvh;
use crate::color::Color;
use crate::error::RenderError;
use crate::lights::Light;
use crate::mesh;
use crate::primitives::{ObjectProps, Primitive, Sphere, Triangle};
use crate::view::View;

use spec::{ColorSpec, ImageSpec};

pub struct Scene {
    pub primitives: Vec<Primitive>,
    pub bvh: Bvh,
    pub lights: Vec<Light>,
    pub background: Color,
    pub view: View,
    pub width: usize,
    pub height: usize,
    pub ssaa: bool,
}

impl Scene {
    /// Loads and validates the spec at `spec_path`, resolves every object
    /// and mesh reference (mesh paths are relative to the spec file's
    /// directory), and builds the BVH over the resulting primitive set.
    pub fn load(spec_path: &Path) -> Result<Scene, RenderError> {
        let spec = ImageSpec::load(spec_path)?;
        Scene::build(spec, spec_path)
    }

    fn build(spec: ImageSpec, spec_path: &Path) -> Result<Scene, RenderError> {
        let props_by_name = build_props(&spec);

        let mut primitives = Vec::new();

        for sphere in &spec.spheres {
            let props = props_by_name[sphere.surface_prop.as_str()];
            primitives.push(Primitive::Sphere(Sphere::new(
                sphere.center.as_point(),
                sphere.radius,
                props,
            )));
        }

        for triangle in &spec.triangles {
            let props = props_by_name[triangle.surface_prop.as_str()];
            let [a, b, c] = &triangle.corners;
            let n = (b.as_point() - a.as_point())
                .cross(&(c.as_point() - a.as_point()))
                .normalize();
            primitives.push(Primitive::Triangle(Triangle::new(
                a.as_point(),
                b.as_point(),
                c.as_point(),
                props,
                n,
                n,
                n,
            )));
        }

        let spec_dir = spec_path
            .canonicalize()
            .map_err(|e| RenderError::SpecRead {
                path: spec_path.to_path_buf(),
                source: e,
            })?
            .parent()
            .expect("a file path always has a parent")
            .to_path_buf();

        for model in &spec.models {
            let props = props_by_name[model.surface_prop.as_str()];
            let mesh_path = spec_dir.join(&model.path);
            let triangles = mesh::load(
                &mesh_path,
                model.center.as_point(),
                model.rotation.as_vector(),
                model.size,
                props,
            )?;
            primitives.extend(triangles.into_iter().map(Primitive::Triangle));
        }

        let bvh = Bvh::build(&primitives);

        let lights = spec
            .lights
            .iter()
            .map(|l| Light {
                direction: l.direction.as_vector(),
                color: color_from_spec(&l.color),
            })
            .collect();

        let mut width = spec.camera.resolution.width as usize;
        let mut height = spec.camera.resolution.height as usize;
        if spec.ssaa {
            width *= 2;
            height *= 2;
        }

        let view = View::new(
            width as u32,
            height as u32,
            spec.camera.position.as_point(),
            spec.camera.look_at.as_vector(),
            spec.camera.up.as_vector(),
            spec.camera.fov,
        );

        Ok(Scene {
            primitives,
            bvh,
            lights,
            background: color_from_spec(&spec.background),
            view,
            width,
            height,
            ssaa: spec.ssaa,
        })
    }
}

fn build_props(spec: &ImageSpec) -> HashMap<&str, ObjectProps> {
    spec.surface_props
        .iter()
        .map(|p| {
            (
                p.name.as_str(),
                ObjectProps {
                    color: color_from_spec(&p.color),
                    reflectivity: p.reflectivity,
                    mirror: p.mirror,
                    specular: p.specular,
                },
            )
        })
        .collect()
}

fn color_from_spec(c: &ColorSpec) -> Color {
    Color::new(c.r, c.g, c.b)
}
