// Copyright @yucwang 2026

pub mod autolinear;
pub mod gamma_correction;

use self::autolinear::{AutoLinearToneMap, ToneMapBackend};
use self::gamma_correction::GammaCorrection;
use super::FilmImage;
use crate::core::error::Result;
use crate::core::properties::{Properties, Property};

use std::any::Any;

pub trait ImagePipelinePlugin: Send + Sync {
    fn name(&self) -> &'static str;
    /// `pipeline` is the pipeline running the plugin, plugins may query their siblings.
    fn apply(&self, pipeline: &ImagePipeline, image: &mut FilmImage);
    fn as_any(&self) -> &dyn Any;
}

/// Ordered list of post-processing steps run on the merged film output.
#[derive(Default)]
pub struct ImagePipeline {
    plugins: Vec<Box<dyn ImagePipelinePlugin>>,
}

impl ImagePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_plugin(&mut self, plugin: Box<dyn ImagePipelinePlugin>) {
        self.plugins.push(plugin);
    }

    pub fn with_plugin(mut self, plugin: Box<dyn ImagePipelinePlugin>) -> Self {
        self.add_plugin(plugin);
        self
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// First plugin of type `T`, if any.
    pub fn plugin<T: 'static>(&self) -> Option<&T> {
        self.plugins.iter().find_map(|p| p.as_any().downcast_ref::<T>())
    }

    pub fn apply(&self, image: &mut FilmImage) {
        for plugin in self.plugins.iter() {
            log::debug!("Running image pipeline plugin: {}.", plugin.name());
            plugin.apply(self, image);
        }
    }

    /// Auto linear tone mapping followed by gamma correction.
    pub fn from_properties(cfg: &Properties) -> Result<ImagePipeline> {
        let defaults = default_props();
        let gamma = cfg.get_or_default(&defaults, "film.imagepipeline.gamma")?.as_float()?;
        let backend = ToneMapBackend::from_tag(
            &cfg.get_or_default(&defaults, "film.imagepipeline.tonemap.backend")?.as_string(),
        )?;
        Ok(ImagePipeline::new()
            .with_plugin(Box::new(AutoLinearToneMap::new(backend)))
            .with_plugin(Box::new(GammaCorrection::new(gamma))))
    }
}

pub fn default_props() -> Properties {
    Properties::new()
        .with(Property::new("film.imagepipeline.gamma", 2.2f64))
        .with(Property::new("film.imagepipeline.tonemap.backend", "CPU"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::spectrum::RGBSpectrum;

    #[test]
    fn test_plugin_lookup() {
        let cfg = Properties::new().with(Property::new("film.imagepipeline.gamma", 1.8f64));
        let pipeline = ImagePipeline::from_properties(&cfg).unwrap();
        assert_eq!(pipeline.len(), 2);
        let gamma = pipeline.plugin::<GammaCorrection>().unwrap();
        assert!((gamma.gamma() - 1.8).abs() < 1e-6);
        assert!(ImagePipeline::new().plugin::<GammaCorrection>().is_none());
    }

    #[test]
    fn test_apply_runs_in_order() {
        let mut image = FilmImage::new(1, 1);
        image.pixels[0] = RGBSpectrum::splat(1.0);
        image.mask[0] = true;

        let pipeline = ImagePipeline::new().with_plugin(Box::new(GammaCorrection::new(2.0)));
        pipeline.apply(&mut image);
        assert!((image.pixels[0][0] - 1.0).abs() < 1e-6);

        let mut image = FilmImage::new(1, 1);
        image.pixels[0] = RGBSpectrum::splat(0.25);
        image.mask[0] = true;
        pipeline.apply(&mut image);
        assert!((image.pixels[0][2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let cfg = Properties::new().with(Property::new("film.imagepipeline.tonemap.backend", "GPU"));
        assert!(ImagePipeline::from_properties(&cfg).is_err());
    }
}
