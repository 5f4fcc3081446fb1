//! Particle area and volume
//!
//! Spheres use the particle length as radius. C3 particles are thin
//! platelets whose reacting faces span `1.2263 L^2` each; their volume uses a
//! separate thickness.

use std::f64::consts::PI;

use crate::params::ParticleShape;

/// Face-area coefficient of a C3 platelet
const C3_AREA_FACTOR: f64 = 1.2263;

/// Area and volume of one particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleGeometry {
    pub shape: ParticleShape,
    /// Characteristic length \[m\]
    pub length: f64,
    /// Active surface area \[m^2\]
    pub area: f64,
    /// Volume \[m^3\]
    pub volume: f64,
}

impl ParticleGeometry {
    pub fn new(shape: ParticleShape, length: f64, thickness: f64) -> Self {
        let (area, volume) = match shape {
            ParticleShape::Sphere => (4.0 * PI * length.powi(2), 4.0 / 3.0 * PI * length.powi(3)),
            ParticleShape::C3 => (
                2.0 * C3_AREA_FACTOR * length.powi(2),
                C3_AREA_FACTOR * length.powi(2) * thickness,
            ),
        };
        Self { shape, length, area, volume }
    }

    /// Active area per unit volume \[1/m\]
    pub fn area_to_volume(&self) -> f64 {
        self.area / self.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_area_to_volume() {
        let g = ParticleGeometry::new(ParticleShape::Sphere, 50e-9, 0.0);
        assert_relative_eq!(g.area_to_volume(), 3.0 / 50e-9, max_relative = 1e-12);
    }

    #[test]
    fn test_c3_depends_on_thickness_only_through_volume() {
        let thin = ParticleGeometry::new(ParticleShape::C3, 100e-9, 20e-9);
        let thick = ParticleGeometry::new(ParticleShape::C3, 100e-9, 40e-9);
        assert_eq!(thin.area, thick.area);
        assert_relative_eq!(thin.area_to_volume(), 2.0 / 20e-9, max_relative = 1e-12);
        assert_relative_eq!(thick.volume, 2.0 * thin.volume, max_relative = 1e-12);
    }
}
