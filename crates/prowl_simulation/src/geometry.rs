//! Planar (XZ) helpers for melee facing checks.

use bevy::prelude::*;

/// Проекция на горизонтальную плоскость (Y = 0).
pub fn planar(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Horizontal distance between two points.
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    planar(b - a).length()
}

/// Angle in degrees between two vectors projected onto the XZ plane.
///
/// Returns `None` when either projection is degenerate (zero length).
pub fn planar_angle_deg(a: Vec3, b: Vec3) -> Option<f32> {
    let a = planar(a).try_normalize()?;
    let b = planar(b).try_normalize()?;

    // clamp: dot двух unit векторов может чуть вылезти за [-1, 1]
    let cos = a.dot(b).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}
