//! Minimal 3-vector math for the orientation pipeline.
//!
//! Acceleration vectors are re-normalized to unit length before any dot
//! product, and the dot product is clamped to [-1, 1] before the inverse
//! cosine to guard against floating-point overshoot.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn from_array(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    pub fn dot(&self, other: &Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy, or `None` when the norm is zero or not finite.
    /// A zeroed or NaN accelerometer reading has no usable direction.
    pub fn normalized(&self) -> Option<Vec3> {
        let norm = self.norm();
        if !norm.is_finite() || norm <= f32::EPSILON {
            return None;
        }
        Some(Vec3::new(self.x / norm, self.y / norm, self.z / norm))
    }
}

/// Angle between two vectors in degrees.
///
/// Both inputs are re-normalized first; the result is symmetric, 0 for
/// parallel vectors and 180 for opposite ones. `None` when either vector
/// has no direction.
pub fn angle_between_degrees(a: &Vec3, b: &Vec3) -> Option<f32> {
    let a = a.normalized()?;
    let b = b.normalized()?;
    let dot = a.dot(&b).clamp(-1.0, 1.0);
    Some(dot.acos().to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_is_symmetric() {
        let a = Vec3::new(0.0, 0.26, 0.97);
        let b = Vec3::new(0.0, 0.0, 1.0);
        let ab = angle_between_degrees(&a, &b).unwrap();
        let ba = angle_between_degrees(&b, &a).unwrap();
        assert!((ab - ba).abs() < 1e-5);
    }

    #[test]
    fn angle_of_equal_vectors_is_zero() {
        let a = Vec3::new(0.3, -0.1, 0.9);
        let angle = angle_between_degrees(&a, &a).unwrap();
        assert!(angle.abs() < 1e-3);
    }

    #[test]
    fn angle_of_opposite_vectors_is_180() {
        let a = Vec3::new(0.0, 0.0, 1.0);
        let b = Vec3::new(0.0, 0.0, -1.0);
        let angle = angle_between_degrees(&a, &b).unwrap();
        assert!((angle - 180.0).abs() < 1e-3);
    }

    #[test]
    fn non_unit_inputs_are_renormalized() {
        let a = Vec3::new(0.0, 0.0, 9.81);
        let b = Vec3::new(0.0, 0.0, 0.5);
        let angle = angle_between_degrees(&a, &b).unwrap();
        assert!(angle.abs() < 1e-3);
    }

    #[test]
    fn zero_vector_has_no_angle() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 0.0, 1.0);
        assert!(angle_between_degrees(&a, &b).is_none());
        assert!(a.normalized().is_none());
    }

    #[test]
    fn nan_vector_has_no_direction() {
        let a = Vec3::new(f32::NAN, 0.0, 1.0);
        assert!(a.normalized().is_none());
    }
}
