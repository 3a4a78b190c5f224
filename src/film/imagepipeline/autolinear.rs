// Copyright @yucwang 2026

use super::gamma_correction::GammaCorrection;
use super::{ImagePipeline, ImagePipelinePlugin};
use crate::core::error::{RenderEngineError, Result};
use crate::film::FilmImage;
use crate::math::constants::Float;
use crate::math::spectrum::RGBSpectrum;

use rayon::prelude::*;
use std::any::Any;

const DEFAULT_GAMMA: Float = 2.2;
const REDUCE_WORK_GROUP_SIZE: usize = 64;
const APPLY_WORK_GROUP_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneMapBackend {
    /// Single loop on the calling thread.
    Cpu,
    /// Work-group reduction and apply kernels on the rayon pool.
    Batched,
}

impl ToneMapBackend {
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag.to_uppercase().as_str() {
            "CPU" => Ok(ToneMapBackend::Cpu),
            "BATCHED" => Ok(ToneMapBackend::Batched),
            _ => Err(RenderEngineError::InvalidProperty {
                name: String::from("film.imagepipeline.tonemap.backend"),
                reason: format!("unknown tone map backend: {}", tag),
            }),
        }
    }
}

/// `1.25 / y * (118 / 255)^gamma`, the exposure mapping the average luminance to middle grey.
pub fn linear_tone_map_scale(gamma: Float, y: Float) -> Float {
    1.25 / y * (118.0 as Float / 255.0).powf(gamma)
}

fn luminance_contribution(pixel: &RGBSpectrum, valid: bool) -> f64 {
    if !valid {
        return 0.0;
    }
    let y = pixel.y();
    if y > 0.0 && y.is_finite() {
        y as f64
    } else {
        0.0
    }
}

fn scale_pixels(pixels: &mut [RGBSpectrum], mask: &[bool], scale: Float) {
    for (pixel, valid) in pixels.iter_mut().zip(mask.iter()) {
        if *valid {
            *pixel *= scale;
        }
    }
}

/// Linear tone map whose exposure follows the average image luminance.
pub struct AutoLinearToneMap {
    backend: ToneMapBackend,
}

impl AutoLinearToneMap {
    pub fn new(backend: ToneMapBackend) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> ToneMapBackend {
        self.backend
    }

    /// Gamma of the pipeline's gamma correction stage, 2.2 without one.
    pub fn gamma_correction_value(pipeline: Option<&ImagePipeline>) -> Float {
        pipeline
            .and_then(|p| p.plugin::<GammaCorrection>())
            .map(|g| g.gamma())
            .unwrap_or(DEFAULT_GAMMA)
    }

    pub fn calc_linear_tone_map_scale(pipeline: Option<&ImagePipeline>, y: Float) -> Float {
        linear_tone_map_scale(Self::gamma_correction_value(pipeline), y)
    }

    /// Sum of the valid positive luminances over the whole pixel count.
    pub fn average_luminance(&self, image: &FilmImage) -> Float {
        let pixel_count = image.pixel_count();
        if pixel_count == 0 {
            return 0.0;
        }
        let sum: f64 = match self.backend {
            ToneMapBackend::Cpu => image
                .pixels
                .iter()
                .zip(image.mask.iter())
                .map(|(p, v)| luminance_contribution(p, *v))
                .sum(),
            ToneMapBackend::Batched => image
                .pixels
                .par_chunks(REDUCE_WORK_GROUP_SIZE)
                .zip(image.mask.par_chunks(REDUCE_WORK_GROUP_SIZE))
                .map(|(pixels, mask)| {
                    pixels
                        .iter()
                        .zip(mask.iter())
                        .map(|(p, v)| luminance_contribution(p, *v))
                        .sum::<f64>()
                })
                .sum(),
        };
        (sum / pixel_count as f64) as Float
    }

    pub fn apply_scale(&self, image: &mut FilmImage, scale: Float) {
        match self.backend {
            ToneMapBackend::Cpu => scale_pixels(&mut image.pixels, &image.mask, scale),
            ToneMapBackend::Batched => image
                .pixels
                .par_chunks_mut(APPLY_WORK_GROUP_SIZE)
                .zip(image.mask.par_chunks(APPLY_WORK_GROUP_SIZE))
                .for_each(|(pixels, mask)| scale_pixels(pixels, mask, scale)),
        }
    }
}

impl ImagePipelinePlugin for AutoLinearToneMap {
    fn name(&self) -> &'static str {
        "TONEMAP_AUTOLINEAR"
    }

    fn apply(&self, pipeline: &ImagePipeline, image: &mut FilmImage) {
        let y = self.average_luminance(image);
        if !(y > 0.0) {
            return;
        }
        let scale = Self::calc_linear_tone_map_scale(Some(pipeline), y);
        self.apply_scale(image, scale);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
