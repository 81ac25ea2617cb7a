//! Conversions between 3-D BoxSpace elements and nalgebra world-frame vectors.

use nalgebra::Vector3;

use crate::spaces::BoxSpace;

impl BoxSpace<f64, 3> {
    /// Build a box from world-frame corner vectors.
    pub fn from_corners(low: Vector3<f64>, high: Vector3<f64>) -> Self {
        Self::new(low.into(), high.into())
    }

    /// Convert a sampled element into a world-frame vector.
    pub fn to_vector(elem: [f64; 3]) -> Vector3<f64> {
        Vector3::from(elem)
    }

    pub fn low_vector(&self) -> Vector3<f64> { Vector3::from(*self.low()) }
    pub fn high_vector(&self) -> Vector3<f64> { Vector3::from(*self.high()) }

    /// Clamp a vector component-wise into the box.
    pub fn clamp_vector(&self, v: Vector3<f64>) -> Vector3<f64> {
        v.sup(&self.low_vector()).inf(&self.high_vector())
    }
}
