pub mod bc;
pub mod model;
pub mod system;

use std::f64::consts::PI;

/// Vacuum permeability (H/m), CODATA 2018.
pub const MU_0: f64 = 1.256_637_062_12e-6;

/// Skin depth (m) of a uniform half-space, `δ ≈ 500·sqrt(ρ/f)`.
#[inline]
pub fn skin_depth(resistivity: f64, frequency: f64) -> f64 {
    500.0 * (resistivity / frequency).sqrt()
}

#[inline]
pub fn angular_frequency(frequency: f64) -> f64 {
    2.0 * PI * frequency
}
