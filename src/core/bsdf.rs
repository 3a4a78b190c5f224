// Copyright @yucwang 2023

use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;

// Directions are expressed in the local shading frame, z is the normal.
// `wo` is the direction the path arrived from, `wi` the sampled continuation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BSDFSampleRecord {
    pub wi: Vector3f,
    pub pdf: Float,
    /// f * |cos(wi)| / pdf
    pub weight: RGBSpectrum,
    pub is_delta: bool,
}

pub trait BSDF: Send + Sync {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
    fn eval(&self, wo: &Vector3f, wi: &Vector3f) -> RGBSpectrum;
    fn sample(&self, wo: &Vector3f, u: &Vector2f) -> Option<BSDFSampleRecord>;
    fn is_delta(&self) -> bool {
        false
    }
}
