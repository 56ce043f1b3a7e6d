use nalgebra::Vector3;

use crate::color::Color;

/// A directional (infinitely distant) light: everything visible receives
/// light arriving from `direction`.
#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub direction: Vector3<f64>,
    pub color: Color,
}
