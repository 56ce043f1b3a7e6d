//! The JSON scene-specification document and its validation rules.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use nalgebra::{Point3, Vector3};
use serde::Deserialize;

use crate::error::RenderError;

#[derive(Debug, Deserialize)]
pub struct VectorSpec {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Z")]
    pub z: f64,
}

impl VectorSpec {
    pub fn as_point(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

#[derive(Debug, Deserialize)]
pub struct ColorSpec {
    #[serde(rename = "R")]
    pub r: u8,
    #[serde(rename = "G")]
    pub g: u8,
    #[serde(rename = "B")]
    pub b: u8,
}

#[derive(Debug, Deserialize)]
pub struct ResolutionSpec {
    #[serde(rename = "Width")]
    pub width: i64,
    #[serde(rename = "Height")]
    pub height: i64,
}

#[derive(Debug, Deserialize)]
pub struct CameraSpec {
    #[serde(rename = "Resolution")]
    pub resolution: ResolutionSpec,
    #[serde(rename = "Position")]
    pub position: VectorSpec,
    #[serde(rename = "LookAt")]
    pub look_at: VectorSpec,
    #[serde(rename = "Up")]
    pub up: VectorSpec,
    #[serde(rename = "Fov")]
    pub fov: f64,
}

#[derive(Debug, Deserialize)]
pub struct LightSpec {
    #[serde(rename = "Direction")]
    pub direction: VectorSpec,
    #[serde(rename = "Color")]
    pub color: ColorSpec,
}

#[derive(Debug, Deserialize)]
pub struct SurfacePropSpec {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Color")]
    pub color: ColorSpec,
    #[serde(rename = "Reflectivity")]
    pub reflectivity: f64,
    #[serde(rename = "Mirror")]
    pub mirror: f64,
    #[serde(rename = "Specular")]
    pub specular: f64,
}

#[derive(Debug, Deserialize)]
pub struct SphereSpec {
    #[serde(rename = "Center")]
    pub center: VectorSpec,
    #[serde(rename = "Radius")]
    pub radius: f64,
    #[serde(rename = "SurfaceProp")]
    pub surface_prop: String,
}

#[derive(Debug, Deserialize)]
pub struct TriangleSpec {
    #[serde(rename = "Corners")]
    pub corners: [VectorSpec; 3],
    #[serde(rename = "SurfaceProp")]
    pub surface_prop: String,
}

#[derive(Debug, Deserialize)]
pub struct ModelSpec {
    #[serde(rename = "Path")]
    pub path: String,
    #[serde(rename = "Size")]
    pub size: f64,
    #[serde(rename = "Center")]
    pub center: VectorSpec,
    #[serde(rename = "Rotation")]
    pub rotation: VectorSpec,
    #[serde(rename = "SurfaceProp")]
    pub surface_prop: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageSpec {
    #[serde(rename = "Camera")]
    pub camera: CameraSpec,
    #[serde(rename = "Background")]
    pub background: ColorSpec,
    #[serde(rename = "Lights")]
    pub lights: Vec<LightSpec>,
    #[serde(rename = "SurfaceProps")]
    pub surface_props: Vec<SurfacePropSpec>,
    #[serde(rename = "Spheres", default)]
    pub spheres: Vec<SphereSpec>,
    #[serde(rename = "Triangles", default)]
    pub triangles: Vec<TriangleSpec>,
    #[serde(rename = "Models", default)]
    pub models: Vec<ModelSpec>,
    #[serde(rename = "SSAA")]
    pub ssaa: bool,
}

impl ImageSpec {
    pub fn load(path: &Path) -> Result<ImageSpec, RenderError> {
        let text = fs::read_to_string(path).map_err(|e| RenderError::SpecRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let spec: ImageSpec =
            serde_json::from_str(&text).map_err(|e| RenderError::SpecParse {
                path: path.to_path_buf(),
                source: e,
            })?;

        spec.validate(path)?;
        Ok(spec)
    }

    fn validate(&self, path: &Path) -> Result<(), RenderError> {
        let fail = |reason: String| RenderError::SpecValidation {
            path: path.to_path_buf(),
            reason,
        };

        if self.camera.resolution.width <= 0 {
            return Err(fail("camera resolution width must be greater than 0".into()));
        }
        if self.camera.resolution.height <= 0 {
            return Err(fail("camera resolution height must be greater than 0".into()));
        }
        if !(self.camera.fov > 0.0 && self.camera.fov < 180.0) {
            return Err(fail("camera FOV must be between 0 and 180 degrees".into()));
        }
        if self.camera.up.is_zero() {
            return Err(fail("camera up vector must not be the zero vector".into()));
        }
        if self.camera.look_at.is_zero() {
            return Err(fail("camera lookAt vector must not be the zero vector".into()));
        }
        if vector_eq(&self.camera.position, &self.camera.look_at) {
            return Err(fail("camera position and lookAt vector must differ".into()));
        }
        if self.lights.is_empty() {
            return Err(fail("at least one light source must be defined".into()));
        }

        let mut names = HashSet::new();
        for prop in &self.surface_props {
            if prop.name.is_empty() {
                return Err(fail("surface property name must not be empty".into()));
            }
            if !names.insert(prop.name.as_str()) {
                return Err(fail(format!(
                    "multiple surface properties with name \"{}\" defined but names must be unique",
                    prop.name
                )));
            }
            for (value, label) in [
                (prop.reflectivity, "reflectivity"),
                (prop.mirror, "mirror"),
                (prop.specular, "specular"),
            ] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(fail(format!(
                        "surface property \"{}\" {label} must be between 0 and 1",
                        prop.name
                    )));
                }
            }
        }

        for sphere in &self.spheres {
            if sphere.radius <= 0.0 {
                return Err(fail("sphere radius must be greater than 0".into()));
            }
            self.require_known_prop(&sphere.surface_prop, &names, &fail)?;
        }

        for triangle in &self.triangles {
            let [a, b, c] = &triangle.corners;
            if vector_eq(a, b) || vector_eq(b, c) || vector_eq(c, a) {
                return Err(fail("triangle corners must be pairwise distinct".into()));
            }
            self.require_known_prop(&triangle.surface_prop, &names, &fail)?;
        }

        for model in &self.models {
            if model.path.is_empty() {
                return Err(fail("model path must not be empty".into()));
            }
            if model.size <= 0.0 {
                return Err(fail("model size must be greater than 0".into()));
            }
            self.require_known_prop(&model.surface_prop, &names, &fail)?;
        }

        Ok(())
    }

    fn require_known_prop(
        &self,
        name: &str,
        names: &HashSet<&str>,
        fail: &impl Fn(String) -> RenderError,
    ) -> Result<(), RenderError> {
        if name.is_empty() {
            return Err(fail("a surface property name must be assigned".into()));
        }
        if !names.contains(name) {
            return Err(fail(format!(
                "surface property \"{name}\" is referenced but not defined"
            )));
        }
        Ok(())
    }
}

fn vector_eq(a: &VectorSpec, b: &VectorSpec) -> bool {
    a.x == b.x && a.y == b.y && a.z == b.z
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_spec_json() -> &'static str {
        r#"{
            "Camera": {
                "Resolution": {"Width": 10, "Height": 10},
                "Position": {"X": 0, "Y": 0, "Z": 0},
                "LookAt": {"X": 0, "Y": 0, "Z": 1},
                "Up": {"X": 0, "Y": 1, "Z": 0},
                "Fov": 55
            },
            "Background": {"R": 0, "G": 0, "B": 0},
            "Lights": [{"Direction": {"X": 0, "Y": 0, "Z": 1}, "Color": {"R": 255, "G": 255, "B": 255}}],
            "SurfaceProps": [{"Name": "red", "Color": {"R": 255, "G": 0, "B": 0}, "Reflectivity": 1, "Mirror": 0, "Specular": 0}],
            "Spheres": [{"Center": {"X": 0, "Y": 0, "Z": 5}, "Radius": 1, "SurfaceProp": "red"}],
            "Triangles": [],
            "Models": [],
            "SSAA": false
        }"#
    }

    #[test]
    fn parses_and_validates_a_minimal_spec() {
        let spec: ImageSpec = serde_json::from_str(minimal_spec_json()).unwrap();
        assert!(spec.validate(Path::new("test.json")).is_ok());
    }

    #[test]
    fn rejects_fov_out_of_range() {
        let mut spec: ImageSpec = serde_json::from_str(minimal_spec_json()).unwrap();
        spec.camera.fov = 200.0;
        assert!(spec.validate(Path::new("test.json")).is_err());
    }

    #[test]
    fn rejects_unresolved_surface_prop_reference() {
        let mut spec: ImageSpec = serde_json::from_str(minimal_spec_json()).unwrap();
        spec.spheres[0].surface_prop = "missing".to_string();
        assert!(spec.validate(Path::new("test.json")).is_err());
    }

    #[test]
    fn rejects_duplicate_surface_prop_names() {
        let mut spec: ImageSpec = serde_json::from_str(minimal_spec_json()).unwrap();
        let dup = SurfacePropSpec {
            name: "red".to_string(),
            color: ColorSpec { r: 1, g: 1, b: 1 },
            reflectivity: 0.0,
            mirror: 0.0,
            specular: 0.0,
        };
        spec.surface_props.push(dup);
        assert!(spec.validate(Path::new("test.json")).is_err());
    }

    #[test]
    fn rejects_degenerate_triangle() {
        let mut spec: ImageSpec = serde_json::from_str(minimal_spec_json()).unwrap();
        spec.triangles.push(TriangleSpec {
            corners: [
                VectorSpec { x: 0.0, y: 0.0, z: 0.0 },
                VectorSpec { x: 0.0, y: 0.0, z: 0.0 },
                VectorSpec { x: 1.0, y: 0.0, z: 0.0 },
            ],
            surface_prop: "red".to_string(),
        });
        assert!(spec.validate(Path::new("test.json")).is_err());
    }
}
