// Copyright @yucwang 2023

use crate::core::bsdf::{BSDFSampleRecord, BSDF};
use crate::math::constants::{ INV_PI, Vector2f, Vector3f };
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{ sample_cosine_hemisphere, sample_cosine_hemisphere_pdf };

pub struct LambertianDiffuseBSDF {
    color: RGBSpectrum
}

impl BSDF for LambertianDiffuseBSDF {
    fn eval(&self, wo: &Vector3f, wi: &Vector3f) -> RGBSpectrum {
        // two sided, both directions on the same side
        if wo.z * wi.z <= 0.0 {
            return RGBSpectrum::default();
        }
        self.color * INV_PI
    }

    fn sample(&self, wo: &Vector3f, u: &Vector2f) -> Option<BSDFSampleRecord> {
        if wo.z == 0.0 {
            return None;
        }
        let mut wi = sample_cosine_hemisphere(u);
        if wo.z < 0.0 {
            wi.z *= -1.0;
        }
        let pdf = sample_cosine_hemisphere_pdf(wi.z.abs());
        if pdf <= 0.0 {
            return None;
        }

        Some(BSDFSampleRecord { wi, pdf, weight: self.color, is_delta: false })
    }
}

impl LambertianDiffuseBSDF {
    pub fn new(rgb: RGBSpectrum) -> Self {
        Self {
            color: rgb,
        }
    }
}
