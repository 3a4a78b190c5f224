// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;

pub struct EmissionSample {
    pub ray: Ray3f,
    pub radiance: RGBSpectrum,
    pub pdf_position: Float,
    pub pdf_direction: Float,
    /// Cosine between the emitted direction and the surface normal.
    pub cos_theta: Float,
}

impl EmissionSample {
    /// Flux carried by the emitted ray, before light selection.
    pub fn flux(&self) -> RGBSpectrum {
        let pdf = self.pdf_position * self.pdf_direction;
        if pdf <= 0.0 {
            return RGBSpectrum::default();
        }
        self.radiance * (self.cos_theta / pdf)
    }
}

pub trait Emitter: Send + Sync {
    fn light_group(&self) -> usize;
    fn sample_emission(&self, u_position: &Vector2f, u_direction: &Vector2f) -> Option<EmissionSample>;
    /// Radiance leaving a point with normal `n` towards `w`.
    fn eval_radiance(&self, n: &Vector3f, w: &Vector3f) -> RGBSpectrum;
}
