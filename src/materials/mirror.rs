// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFSampleRecord, BSDF};
use crate::math::constants::{Vector2f, Vector3f};
use crate::math::spectrum::RGBSpectrum;

/// Perfect specular reflection.
pub struct MirrorBSDF {
    reflectance: RGBSpectrum,
}

impl MirrorBSDF {
    pub fn new(reflectance: RGBSpectrum) -> Self {
        Self { reflectance }
    }
}

impl BSDF for MirrorBSDF {
    fn eval(&self, _wo: &Vector3f, _wi: &Vector3f) -> RGBSpectrum {
        RGBSpectrum::default()
    }

    fn sample(&self, wo: &Vector3f, _u: &Vector2f) -> Option<BSDFSampleRecord> {
        if wo.z == 0.0 {
            return None;
        }
        Some(BSDFSampleRecord {
            wi: Vector3f::new(-wo.x, -wo.y, wo.z),
            pdf: 1.0,
            weight: self.reflectance,
            is_delta: true,
        })
    }

    fn is_delta(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_reflects_about_normal() {
        let mirror = MirrorBSDF::new(RGBSpectrum::splat(0.9));
        let wo = Vector3f::new(0.6, 0.0, 0.8);
        let rec = mirror.sample(&wo, &Vector2f::new(0.5, 0.5)).unwrap();
        assert!((rec.wi - Vector3f::new(-0.6, 0.0, 0.8)).norm() < 1e-6);
        assert!(rec.is_delta);
        assert!(mirror.eval(&wo, &rec.wi).is_black());
    }
}
