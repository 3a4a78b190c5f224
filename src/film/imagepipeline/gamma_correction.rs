// Copyright @yucwang 2026

use super::{ImagePipeline, ImagePipelinePlugin};
use crate::film::FilmImage;
use crate::math::constants::Float;

use std::any::Any;

pub struct GammaCorrection {
    gamma: Float,
}

impl GammaCorrection {
    pub fn new(gamma: Float) -> Self {
        Self { gamma }
    }

    pub fn gamma(&self) -> Float {
        self.gamma
    }
}

impl ImagePipelinePlugin for GammaCorrection {
    fn name(&self) -> &'static str {
        "GAMMA_CORRECTION"
    }

    fn apply(&self, _pipeline: &ImagePipeline, image: &mut FilmImage) {
        if !(self.gamma > 0.0) {
            return;
        }
        let inv_gamma = 1.0 / self.gamma;
        for (pixel, valid) in image.pixels.iter_mut().zip(image.mask.iter()) {
            if *valid {
                *pixel = pixel.map(|c| c.max(0.0).powf(inv_gamma));
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
