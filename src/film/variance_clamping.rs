// Copyright @yucwang 2026

use crate::math::constants::Float;
use crate::math::spectrum::RGBSpectrum;

/// Keeps every sample within `sqrt_variance_max` of the running estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarianceClamping {
    sqrt_variance_max: Float,
}

impl VarianceClamping {
    pub fn new(sqrt_variance_max: Float) -> Self {
        Self { sqrt_variance_max: sqrt_variance_max.max(0.0) }
    }

    pub fn sqrt_variance_max(&self) -> Float {
        self.sqrt_variance_max
    }

    pub fn has_clamping(&self) -> bool {
        self.sqrt_variance_max > 0.0
    }

    /// Projects each component onto `[max(0, expected - v), expected + v]`.
    pub fn clamp(&self, expected: &RGBSpectrum, value: &RGBSpectrum) -> RGBSpectrum {
        if !self.has_clamping() {
            return *value;
        }
        let v = self.sqrt_variance_max;
        let mut result = *value;
        for c in 0..3 {
            let low = (expected[c] - v).max(0.0);
            let high = expected[c] + v;
            result[c] = result[c].max(low).min(high);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_clamping_is_identity() {
        let clamping = VarianceClamping::new(0.0);
        assert!(!clamping.has_clamping());
        let value = RGBSpectrum::new(1e6, 0.0, 3.0);
        assert_eq!(clamping.clamp(&RGBSpectrum::splat(1.0), &value), value);
        assert!(!VarianceClamping::new(-2.0).has_clamping());
    }

    #[test]
    fn test_clamp_bounds() {
        let clamping = VarianceClamping::new(1.0);
        let expected = RGBSpectrum::new(0.5, 2.0, 4.0);
        let clamped = clamping.clamp(&expected, &RGBSpectrum::new(100.0, 0.0, 4.5));
        assert!((clamped[0] - 1.5).abs() < 1e-6);
        assert!((clamped[1] - 1.0).abs() < 1e-6);
        assert!((clamped[2] - 4.5).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let clamping = VarianceClamping::new(0.75);
        let expected = RGBSpectrum::new(0.2, 1.0, 10.0);
        for value in &[
            RGBSpectrum::new(50.0, 0.0, 0.0),
            RGBSpectrum::new(0.1, 1.2, 9.0),
            RGBSpectrum::new(0.0, 3.0, 20.0),
        ] {
            let once = clamping.clamp(&expected, value);
            let twice = clamping.clamp(&expected, &once);
            assert_eq!(once, twice);
        }
    }
}
