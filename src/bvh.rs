//! A bounding volume hierarchy built by repeated median splits along the
//! largest extent axis (not a surface-area heuristic). This mirrors the
//! construction strategy of the reference raytracer this crate's shading
//! model is drawn from, rather than the SAH-style tree the `bvh` crate
//! builds: the spec calls for a specific, simple, deterministic split rule,
//! so the tree is built by hand here instead of delegating to a crate built
//! around a different strategy.

use crate::extremes::Extremes;
use crate::primitives::Primitive;
use crate::ray::Ray;

/// Leaves hold at most this many primitives before splitting further.
const LEAF_CAP: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Axis {
    X,
    Y,
    Z,
}

enum Node {
    Leaf {
        extremes: Extremes,
        primitives: Vec<usize>,
    },
    Internal {
        extremes: Extremes,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn extremes(&self) -> Extremes {
        match self {
            Node::Leaf { extremes, .. } => *extremes,
            Node::Internal { extremes, .. } => *extremes,
        }
    }
}

/// A BVH over a fixed set of primitives, queried by index into that set.
pub struct Bvh {
    root: Node,
}

impl Bvh {
    /// Builds a tree over `primitives`. The primitive list is never
    /// reordered; the tree stores indices into it.
    pub fn build(primitives: &[Primitive]) -> Bvh {
        let indices: Vec<usize> = (0..primitives.len()).collect();
        let root = build_node(primitives, indices);
        Bvh { root }
    }

    /// All primitives (by index) whose leaf boxes the ray passes through.
    /// There is no closest-hit shortcut here: every candidate leaf is
    /// collected and the caller (the shader) picks the nearest actual
    /// intersection among them.
    pub fn relevant(&self, ray: &Ray) -> Vec<usize> {
        let mut out = Vec::new();
        collect(&self.root, ray, &mut out);
        out
    }
}

fn collect(node: &Node, ray: &Ray, out: &mut Vec<usize>) {
    if !node.extremes().intersects(ray) {
        return;
    }

    match node {
        Node::Leaf { primitives, .. } => out.extend(primitives.iter().copied()),
        Node::Internal { left, right, .. } => {
            collect(left, ray, out);
            collect(right, ray, out);
        }
    }
}

fn build_node(primitives: &[Primitive], indices: Vec<usize>) -> Node {
    let extremes = indices
        .iter()
        .map(|&i| primitives[i].extremes())
        .reduce(Extremes::merge)
        .expect("build_node called with no primitives");

    if indices.len() <= LEAF_CAP {
        return Node::Leaf {
            extremes,
            primitives: indices,
        };
    }

    let axis = largest_extent_axis(&extremes);
    let mut sorted = indices;
    sorted.sort_by(|&a, &b| {
        max_coord(&primitives[a].extremes(), axis)
            .partial_cmp(&max_coord(&primitives[b].extremes(), axis))
            .expect("NaN bounding coordinate")
    });

    let split = sorted.len() - sorted.len() / 2;
    let right_half = sorted.split_off(split);

    let left = build_node(primitives, sorted);
    let right = build_node(primitives, right_half);

    Node::Internal {
        extremes,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Ties break X, then Y, then Z.
fn largest_extent_axis(extremes: &Extremes) -> Axis {
    let (x, y, z) = (extremes.x_diff(), extremes.y_diff(), extremes.z_diff());

    if x >= y && x >= z {
        Axis::X
    } else if y >= z {
        Axis::Y
    } else {
        Axis::Z
    }
}

fn max_coord(extremes: &Extremes, axis: Axis) -> f64 {
    match axis {
        Axis::X => extremes.max_x,
        Axis::Y => extremes.max_y,
        Axis::Z => extremes.max_z,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::primitives::{ObjectProps, Sphere};
    use nalgebra::{Point3, Vector3};

    fn props() -> ObjectProps {
        ObjectProps {
            color: Color::new(255, 255, 255),
            reflectivity: 0.0,
            mirror: 0.0,
            specular: 0.0,
        }
    }

    fn spheres_in_a_row(n: i64) -> Vec<Primitive> {
        (0..n)
            .map(|i| {
                Primitive::Sphere(Sphere::new(
                    Point3::new(i as f64 * 10.0, 0.0, 0.0),
                    1.0,
                    props(),
                ))
            })
            .collect()
    }

    #[test]
    fn root_extremes_enclose_every_primitive() {
        let prims = spheres_in_a_row(9);
        let bvh = Bvh::build(&prims);
        let root_extremes = bvh.root.extremes();

        for p in &prims {
            let e = p.extremes();
            assert!(root_extremes.min_x <= e.min_x && root_extremes.max_x >= e.max_x);
        }
    }

    #[test]
    fn relevant_never_misses_an_actual_hit() {
        let prims = spheres_in_a_row(20);
        let bvh = Bvh::build(&prims);

        // A ray straight through sphere #13's center must have #13 among the
        // candidates the BVH returns, regardless of how the tree split.
        let target = 13;
        let center = match &prims[target] {
            Primitive::Sphere(s) => s.center,
            _ => unreachable!(),
        };
        let ray = Ray::new(center - Vector3::new(100.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0), 0);

        let relevant = bvh.relevant(&ray);
        assert!(relevant.contains(&target));
    }

    #[test]
    fn relevant_excludes_far_away_leaves() {
        let prims = spheres_in_a_row(20);
        let bvh = Bvh::build(&prims);

        let ray = Ray::new(
            Point3::new(-100.0, 1000.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            0,
        );
        assert!(bvh.relevant(&ray).is_empty());
    }

    #[test]
    fn leaf_cap_is_respected_by_single_small_group() {
        let prims = spheres_in_a_row(3);
        let bvh = Bvh::build(&prims);
        match &bvh.root {
            Node::Leaf { primitives, .. } => assert_eq!(primitives.len(), 3),
            Node::Internal { .. } => panic!("expected a single leaf for <= LEAF_CAP primitives"),
        }
    }
}
