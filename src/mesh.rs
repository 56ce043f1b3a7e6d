//! Loader for the OBJ subset used by scene files: `v`, `vn` and `f`
//! directives, triangle and quad faces, optional `vt` (parsed and
//! discarded). Faces with more than four corners are rejected rather than
//! fanned, matching the reference loader this is grounded on.
//!
//! Smooth shading normals are synthesized per corner by grouping triangles
//! that share an *exactly* equal vertex position (no epsilon fuzz on the
//! position itself — only on the face-normal dot-product test below) and
//! blending their face normals.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use nalgebra::{Point3, Vector3};

use crate::error::RenderError;
use crate::primitives::{ObjectProps, Triangle};

const NORMAL_MERGE_EPSILON: f64 = 1e-7;

struct RawFace {
    corners: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
    normals_set: bool,
}

struct ParsedFile {
    vertices: Vec<Point3<f64>>,
    vertex_normals: Vec<Vector3<f64>>,
    faces: Vec<RawFace>,
    min: Point3<f64>,
    max: Point3<f64>,
}

/// Corner position used as an exact hash-map key. `f64` doesn't implement
/// `Eq`/`Hash`, so positions are keyed on their bit patterns: this is
/// intentional bitwise equality, not an approximate match, matching the
/// "same vertex emitted twice in the file" semantics the spec relies on.
#[derive(PartialEq, Eq, Hash, Clone, Copy)]
struct PositionKey(u64, u64, u64);

impl PositionKey {
    fn from_point(p: Point3<f64>) -> PositionKey {
        PositionKey(p.x.to_bits(), p.y.to_bits(), p.z.to_bits())
    }
}

/// Reads a mesh file and returns world-space triangles, fully transformed
/// (centered, scaled, rotated, translated) and with smooth per-corner
/// normals filled in.
///
/// `rotation` is given in units of pi radians per axis, applied X then Y
/// then Z, matching the camera-facing convention used elsewhere in scene
/// files.
pub fn load(
    path: &Path,
    origin: Point3<f64>,
    rotation: Vector3<f64>,
    scaling: f64,
    props: ObjectProps,
) -> Result<Vec<Triangle>, RenderError> {
    log::info!("reading mesh file {}", path.display());

    let text = fs::read_to_string(path).map_err(|e| RenderError::MeshRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let parsed = parse(&text, path)?;
    validate(&parsed, path)?;
    Ok(build_triangles(parsed, origin, rotation, scaling, props))
}

fn validate(parsed: &ParsedFile, path: &Path) -> Result<(), RenderError> {
    if parsed.faces.is_empty() {
        return Err(RenderError::MeshValidation {
            path: path.to_path_buf(),
            reason: "mesh defines no faces".to_string(),
        });
    }
    let extent = (parsed.max.x - parsed.min.x)
        .max(parsed.max.y - parsed.min.y)
        .max(parsed.max.z - parsed.min.z);
    if !(extent > 0.0) {
        return Err(RenderError::MeshValidation {
            path: path.to_path_buf(),
            reason: "mesh bounding box has zero extent; all vertices coincide".to_string(),
        });
    }
    Ok(())
}

fn parse(text: &str, path: &Path) -> Result<ParsedFile, RenderError> {
    let mut vertices = Vec::new();
    let mut vertex_normals = Vec::new();
    let mut faces = Vec::new();
    let mut min = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
    let mut max = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
    let mut warned: Vec<String> = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_nr = idx + 1;
        let words: Vec<&str> = line.split_whitespace().collect();

        let Some(&directive) = words.first() else {
            continue;
        };

        match directive {
            "#" => continue,
            "v" => {
                let v = read_vector(&words, path, line_nr)?;
                min = Point3::new(min.x.min(v.x), min.y.min(v.y), min.z.min(v.z));
                max = Point3::new(max.x.max(v.x), max.y.max(v.y), max.z.max(v.z));
                vertices.push(v);
            }
            "vn" => {
                let vn = read_vector(&words, path, line_nr)?;
                vertex_normals.push(Vector3::new(vn.x, vn.y, vn.z));
            }
            "f" => {
                faces.push(read_face(&words, &vertices, &vertex_normals, path, line_nr)?);
            }
            "vt" => continue,
            other => {
                if !warned.iter().any(|w| w == other) {
                    log::warn!("unsupported directive \"{other}\" found - will be ignored");
                    warned.push(other.to_string());
                }
            }
        }
    }

    Ok(ParsedFile {
        vertices,
        vertex_normals,
        faces,
        min,
        max,
    })
}

fn read_vector(words: &[&str], path: &Path, line_nr: usize) -> Result<Point3<f64>, RenderError> {
    if words.len() < 4 {
        return Err(RenderError::MeshParse {
            path: path.to_path_buf(),
            line: line_nr,
            reason: format!(
                "invalid vertex definition: expected 3 elements but got {}",
                words.len() - 1
            ),
        });
    }

    let mut out = [0.0_f64; 3];
    for i in 0..3 {
        out[i] = words[i + 1].parse().map_err(|_| RenderError::MeshParse {
            path: path.to_path_buf(),
            line: line_nr,
            reason: format!("element #{} is not a valid number", i + 1),
        })?;
    }

    Ok(Point3::new(out[0], out[1], out[2]))
}

fn resolve_index(raw: i64, len: usize, path: &Path, line_nr: usize, what: &str) -> Result<usize, RenderError> {
    if raw == 0 {
        return Err(RenderError::MeshParse {
            path: path.to_path_buf(),
            line: line_nr,
            reason: format!("{what} index must not be 0"),
        });
    }

    let resolved = if raw < 0 {
        len as i64 + raw + 1
    } else {
        raw
    };

    if resolved < 1 || resolved as usize > len {
        return Err(RenderError::MeshParse {
            path: path.to_path_buf(),
            line: line_nr,
            reason: format!("{what} #{raw} is referenced but not defined"),
        });
    }

    Ok(resolved as usize - 1)
}

fn read_face(
    words: &[&str],
    vertices: &[Point3<f64>],
    vertex_normals: &[Vector3<f64>],
    path: &Path,
    line_nr: usize,
) -> Result<RawFace, RenderError> {
    if words.len() < 4 {
        return Err(RenderError::MeshParse {
            path: path.to_path_buf(),
            line: line_nr,
            reason: "faces must have at least 3 corner vertices".to_string(),
        });
    }
    if words.len() > 5 {
        return Err(RenderError::MeshParse {
            path: path.to_path_buf(),
            line: line_nr,
            reason: "faces with more than four corners are not supported".to_string(),
        });
    }

    let mut corners = Vec::with_capacity(4);
    let mut normals = Vec::with_capacity(4);

    for word in &words[1..] {
        let mut parts = word.split('/');
        let v_part = parts.next().unwrap_or("");
        let v_index: i64 = v_part.parse().map_err(|_| RenderError::MeshParse {
            path: path.to_path_buf(),
            line: line_nr,
            reason: format!("\"{v_part}\" is not a valid vertex index"),
        })?;
        corners.push(vertices[resolve_index(v_index, vertices.len(), path, line_nr, "vertex")?]);

        // skip vt (parts.next())
        let _texture = parts.next();

        if let Some(vn_part) = parts.next() {
            if !vn_part.is_empty() {
                let vn_index: i64 = vn_part.parse().map_err(|_| RenderError::MeshParse {
                    path: path.to_path_buf(),
                    line: line_nr,
                    reason: format!("\"{vn_part}\" is not a valid normal index"),
                })?;
                normals.push(
                    vertex_normals
                        [resolve_index(vn_index, vertex_normals.len(), path, line_nr, "vertex normal")?],
                );
            }
        }
    }

    let normals_set = normals.len() == corners.len();

    Ok(RawFace {
        corners,
        normals,
        normals_set,
    })
}

fn rotate(v: Vector3<f64>, rotation: Vector3<f64>) -> Vector3<f64> {
    let (sx, cx) = (rotation.x * std::f64::consts::PI).sin_cos();
    let x_rotated = Vector3::new(v.x, v.y * cx - v.z * sx, v.y * sx + v.z * cx);

    let (sy, cy) = (rotation.y * std::f64::consts::PI).sin_cos();
    let xy_rotated = Vector3::new(
        x_rotated.x * cy + x_rotated.z * sy,
        x_rotated.y,
        -x_rotated.x * sy + x_rotated.z * cy,
    );

    let (sz, cz) = (rotation.z * std::f64::consts::PI).sin_cos();
    Vector3::new(
        xy_rotated.x * cz - xy_rotated.y * sz,
        xy_rotated.x * sz + xy_rotated.y * cz,
        xy_rotated.z,
    )
}

fn rotate_point(p: Point3<f64>, rotation: Vector3<f64>) -> Point3<f64> {
    Point3::from(rotate(p.coords, rotation))
}

struct BuiltFace {
    a: Point3<f64>,
    b: Point3<f64>,
    c: Point3<f64>,
    normals: Option<(Vector3<f64>, Vector3<f64>, Vector3<f64>)>,
}

fn build_triangles(
    parsed: ParsedFile,
    origin: Point3<f64>,
    rotation: Vector3<f64>,
    scaling: f64,
    props: ObjectProps,
) -> Vec<Triangle> {
    let centroid = Point3::new(
        (parsed.min.x + parsed.max.x) / 2.0,
        (parsed.min.y + parsed.max.y) / 2.0,
        (parsed.min.z + parsed.max.z) / 2.0,
    );
    let size = (parsed.max.x - parsed.min.x)
        .max(parsed.max.y - parsed.min.y)
        .max(parsed.max.z - parsed.min.z);
    let scale_factor = scaling / size;

    let transform_vertex = |v: Point3<f64>| -> Point3<f64> {
        let centered = (v - centroid) * scale_factor;
        rotate_point(Point3::from(centered), rotation) + origin.coords
    };

    let mut built: Vec<BuiltFace> = Vec::new();

    for face in &parsed.faces {
        let split_indices: &[(usize, usize, usize)] = if face.corners.len() == 4 {
            &[(0, 1, 2), (0, 2, 3)]
        } else {
            &[(0, 1, 2)]
        };

        for &(i0, i1, i2) in split_indices {
            let a = transform_vertex(face.corners[i0]);
            let b = transform_vertex(face.corners[i1]);
            let c = transform_vertex(face.corners[i2]);

            let normals = if face.normals_set {
                Some((
                    rotate(face.normals[i0], rotation).normalize(),
                    rotate(face.normals[i1], rotation).normalize(),
                    rotate(face.normals[i2], rotation).normalize(),
                ))
            } else {
                None
            };

            built.push(BuiltFace { a, b, c, normals });
        }
    }

    // Group triangle indices by each of their three (exactly-equal) corner
    // positions, so smooth-normal synthesis can find every triangle that
    // shares a given corner.
    let mut triangles_per_corner: HashMap<PositionKey, Vec<usize>> = HashMap::new();
    for (i, f) in built.iter().enumerate() {
        for corner in [f.a, f.b, f.c] {
            triangles_per_corner
                .entry(PositionKey::from_point(corner))
                .or_default()
                .push(i);
        }
    }

    let face_normal = |f: &BuiltFace| (f.b - f.a).cross(&(f.c - f.a));

    let corner_normal = |i: usize, corner: Point3<f64>| -> Vector3<f64> {
        let this = &built[i];
        let own_normal = face_normal(this);
        let mut sum = own_normal;

        for &j in &triangles_per_corner[&PositionKey::from_point(corner)] {
            if j == i {
                continue;
            }
            let other_normal = face_normal(&built[j]);
            if own_normal.dot(&other_normal) > NORMAL_MERGE_EPSILON {
                sum += other_normal;
            }
        }

        sum.normalize()
    };

    built
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let (na, nb, nc) = match f.normals {
                Some((na, nb, nc)) => (na, nb, nc),
                None => (
                    corner_normal(i, f.a),
                    corner_normal(i, f.b),
                    corner_normal(i, f.c),
                ),
            };
            Triangle::new(f.a, f.b, f.c, props, na, nb, nc)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn props() -> ObjectProps {
        ObjectProps {
            color: Color::new(255, 255, 255),
            reflectivity: 0.0,
            mirror: 0.0,
            specular: 0.0,
        }
    }

    #[test]
    fn single_triangle_gets_flat_face_normal_on_every_corner() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let parsed = parse(text, Path::new("test.obj")).unwrap();
        let triangles = build_triangles(
            parsed,
            Point3::origin(),
            Vector3::new(0.0, 0.0, 0.0),
            1.0,
            props(),
        );

        assert_eq!(triangles.len(), 1);
        let t = &triangles[0];
        let expected = t.face_normal().normalize();
        assert!((t.normal_a - expected).norm() < 1e-9);
        assert!((t.normal_b - expected).norm() < 1e-9);
        assert!((t.normal_c - expected).norm() < 1e-9);
    }

    #[test]
    fn shared_vertex_blends_face_normals_of_adjacent_triangles() {
        // Two coplanar triangles sharing edge (1,2)-(0,1,0): should end up
        // with identical (flat) normals everywhere since they're coplanar.
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 3\nf 2 4 3\n";
        let parsed = parse(text, Path::new("test.obj")).unwrap();
        let triangles = build_triangles(
            parsed,
            Point3::origin(),
            Vector3::new(0.0, 0.0, 0.0),
            1.0,
            props(),
        );

        assert_eq!(triangles.len(), 2);
        let n0 = triangles[0].face_normal().normalize();
        for t in &triangles {
            assert!((t.normal_a - n0).norm() < 1e-9);
            assert!((t.normal_b - n0).norm() < 1e-9);
            assert!((t.normal_c - n0).norm() < 1e-9);
        }
    }

    #[test]
    fn quad_face_splits_into_two_triangles() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let parsed = parse(text, Path::new("test.obj")).unwrap();
        let triangles = build_triangles(
            parsed,
            Point3::origin(),
            Vector3::new(0.0, 0.0, 0.0),
            1.0,
            props(),
        );
        assert_eq!(triangles.len(), 2);
    }

    #[test]
    fn face_with_five_corners_is_rejected() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv 0 0 1\nf 1 2 3 4 5\n";
        let err = parse(text, Path::new("test.obj")).unwrap_err();
        assert!(matches!(err, RenderError::MeshParse { .. }));
    }

    #[test]
    fn negative_vertex_index_resolves_relative_to_end() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let parsed = parse(text, Path::new("test.obj")).unwrap();
        assert_eq!(parsed.faces.len(), 1);
        assert_eq!(parsed.faces[0].corners[0], Point3::new(0.0, 0.0, 0.0));
        assert_eq!(parsed.faces[0].corners[2], Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn mesh_with_no_faces_fails_validation() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\n";
        let parsed = parse(text, Path::new("test.obj")).unwrap();
        let err = validate(&parsed, Path::new("test.obj")).unwrap_err();
        assert!(matches!(err, RenderError::MeshValidation { .. }));
    }

    #[test]
    fn mesh_with_coincident_vertices_fails_validation() {
        let text = "v 0 0 0\nv 0 0 0\nv 0 0 0\nf 1 2 3\n";
        let parsed = parse(text, Path::new("test.obj")).unwrap();
        let err = validate(&parsed, Path::new("test.obj")).unwrap_err();
        assert!(matches!(err, RenderError::MeshValidation { .. }));
    }
}
