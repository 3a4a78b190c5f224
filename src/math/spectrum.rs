// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};

use serde::{Deserialize, Serialize};
use std::ops;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RGBSpectrum {
    rgb: [Float; 3]
}

impl Default for RGBSpectrum {
    fn default() -> Self {
        Self { rgb: [0.0f32, 0.0f32, 0.0f32] }
    }
}

impl RGBSpectrum {
    pub fn new(r: Float, g: Float, b: Float) -> Self {
        Self { rgb: [r, g, b] }
    }

    pub fn splat(v: Float) -> Self {
        Self { rgb: [v, v, v] }
    }

    pub fn from_vector(v: &Vector3f) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    pub fn is_black(&self) -> bool {
        self.rgb.iter().all(|c| *c == 0.0)
    }

    /// False as soon as one component is NaN or infinite.
    pub fn is_valid(&self) -> bool {
        self.rgb.iter().all(|c| c.is_finite())
    }

    pub fn max_component(&self) -> Float {
        self.rgb[0].max(self.rgb[1]).max(self.rgb[2])
    }

    pub fn average(&self) -> Float {
        (self.rgb[0] + self.rgb[1] + self.rgb[2]) / 3.0
    }

    /// Luminance of linear sRGB primaries.
    pub fn y(&self) -> Float {
        0.212671 * self.rgb[0] + 0.715160 * self.rgb[1] + 0.072169 * self.rgb[2]
    }

    pub fn map<F: Fn(Float) -> Float>(&self, f: F) -> Self {
        Self::new(f(self.rgb[0]), f(self.rgb[1]), f(self.rgb[2]))
    }
}

impl ops::Index<usize> for RGBSpectrum {
    type Output = Float;

    fn index(&self, index: usize) -> &Float {
        &self.rgb[index]
    }
}

impl ops::IndexMut<usize> for RGBSpectrum {
    fn index_mut(&mut self, index: usize) -> &mut Float {
        &mut self.rgb[index]
    }
}

impl ops::Add for RGBSpectrum {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.rgb[0] + rhs.rgb[0], self.rgb[1] + rhs.rgb[1], self.rgb[2] + rhs.rgb[2])
    }
}

impl ops::AddAssign for RGBSpectrum {
    fn add_assign(&mut self, rhs: Self) {
        for idx in 0..3 {
            self.rgb[idx] += rhs.rgb[idx];
        }
    }
}

impl ops::Mul for RGBSpectrum {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(self.rgb[0] * rhs.rgb[0], self.rgb[1] * rhs.rgb[1], self.rgb[2] * rhs.rgb[2])
    }
}

impl ops::MulAssign for RGBSpectrum {
    fn mul_assign(&mut self, rhs: Self) {
        for idx in 0..3 {
            self.rgb[idx] *= rhs.rgb[idx];
        }
    }
}

impl ops::Mul<Float> for RGBSpectrum {
    type Output = Self;

    fn mul(self, rhs: Float) -> Self {
        self.map(|c| c * rhs)
    }
}

impl ops::Mul<RGBSpectrum> for Float {
    type Output = RGBSpectrum;

    fn mul(self, rhs: RGBSpectrum) -> RGBSpectrum {
        rhs * self
    }
}

impl ops::MulAssign<Float> for RGBSpectrum {
    fn mul_assign(&mut self, rhs: Float) {
        for idx in 0..3 {
            self.rgb[idx] *= rhs;
        }
    }
}

impl ops::Div<Float> for RGBSpectrum {
    type Output = Self;

    fn div(self, rhs: Float) -> Self {
        self.map(|c| c / rhs)
    }
}

impl ops::DivAssign<Float> for RGBSpectrum {
    fn div_assign(&mut self, rhs: Float) {
        for idx in 0..3 {
            self.rgb[idx] /= rhs;
        }
    }
}
