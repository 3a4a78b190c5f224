// Copyright @yucwang 2026

use crate::core::emitter::{EmissionSample, Emitter};
use crate::core::shape::Shape;
use crate::math::constants::{Vector2f, Vector3f};
use crate::math::frame::Frame;
use crate::math::ray::Ray3f;
use crate::math::spectrum::RGBSpectrum;
use crate::math::warp::{sample_cosine_hemisphere, sample_cosine_hemisphere_pdf};
use std::sync::Arc;

/// Diffuse one-sided emitter over the surface of a shape.
pub struct AreaEmitter {
    shape: Arc<dyn Shape>,
    radiance: RGBSpectrum,
    light_group: usize,
}

impl AreaEmitter {
    pub fn from_shape(shape: Arc<dyn Shape>, radiance: RGBSpectrum, light_group: usize) -> Self {
        Self { shape, radiance, light_group }
    }
}

impl Emitter for AreaEmitter {
    fn light_group(&self) -> usize {
        self.light_group
    }

    fn sample_emission(&self, u_position: &Vector2f, u_direction: &Vector2f) -> Option<EmissionSample> {
        let position = self.shape.sample(u_position);
        let pdf_position = position.pdf();
        if pdf_position <= 0.0 {
            return None;
        }

        let n = position.intersection().geo_normal();
        let local_dir = sample_cosine_hemisphere(u_direction);
        let cos_theta = local_dir.z;
        let pdf_direction = sample_cosine_hemisphere_pdf(cos_theta);
        if pdf_direction <= 0.0 {
            return None;
        }

        let dir = Frame::from_normal(&n).from_local(&local_dir);
        Some(EmissionSample {
            ray: Ray3f::spawn(position.intersection().p(), &n, dir),
            radiance: self.radiance,
            pdf_position,
            pdf_direction,
            cos_theta,
        })
    }

    fn eval_radiance(&self, n: &Vector3f, w: &Vector3f) -> RGBSpectrum {
        if n.dot(w) > 0.0 {
            self.radiance
        } else {
            RGBSpectrum::default()
        }
    }
}
