/// Deterministic scalar field used to perturb the trailing formation.
///
/// Implementations must be pure functions of their inputs and stay within
/// `[-1, 1]`.
pub trait NoiseField {
    fn sample(&self, x: f32, y: f32, t: f32) -> f32;
}

/// Product of three phase-shifted sinusoids. Cheap, smooth, and bounded by
/// construction.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrigNoise;

impl NoiseField for TrigNoise {
    fn sample(&self, x: f32, y: f32, t: f32) -> f32 {
        (x * 1.2 + y * 0.8).sin() * (y * 1.1 + t * 0.9).cos() * (t * 0.7 + x * 1.3).sin()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SilentNoise;

impl NoiseField for SilentNoise {
    fn sample(&self, _x: f32, _y: f32, _t: f32) -> f32 {
        0.0
    }
}
