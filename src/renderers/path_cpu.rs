// Copyright @yucwang 2026

use super::cpu_no_tile::{self, CpuNoTileEngine, NoTileRenderEngine};
use super::renderer::RenderEngine;
use crate::core::error::Result;
use crate::core::integrator::Integrator;
use crate::core::properties::{Properties, Property};
use crate::core::render_config::RenderConfig;
use crate::film::variance_clamping::VarianceClamping;
use crate::film::{Film, FilmChannelType};
use crate::integrators::path::PathTracer;
use crate::integrators::PathDepthParams;
use crate::math::constants::Float;

use std::sync::Arc;

pub const PATHCPU_TAG: &str = "PATHCPU";

const VARIANCE_CLAMP_KEY: &str = "path.clamping.variance.maxvalue";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathCpuParams {
    pub depth: PathDepthParams,
    pub sqrt_variance_clamp_max_value: Float,
}

impl PathCpuParams {
    pub fn from_properties(cfg: &Properties) -> Result<Self> {
        let depth = PathDepthParams::from_properties("path", cfg)?;
        let clamp_max = match cfg.get(VARIANCE_CLAMP_KEY) {
            Some(prop) => prop.as_float()?.max(0.0),
            None => 0.0,
        };
        Ok(Self { depth, sqrt_variance_clamp_max_value: clamp_max })
    }

    pub fn to_properties(&self) -> Properties {
        self.depth
            .to_properties("path")
            .with(Property::new(VARIANCE_CLAMP_KEY, self.sqrt_variance_clamp_max_value))
    }
}

/// Camera path tracer on the same non tiled base, per pixel normalized only.
pub struct PathCpuRenderEngine {
    base: CpuNoTileEngine,
}

impl PathCpuRenderEngine {
    pub fn new(config: RenderConfig) -> Result<Self> {
        Ok(Self { base: CpuNoTileEngine::new(PATHCPU_TAG, config)? })
    }

    pub fn from_config(config: RenderConfig) -> Result<Box<dyn RenderEngine>> {
        Ok(Box::new(PathCpuRenderEngine::new(config)?))
    }

    pub fn to_properties(cfg: &Properties) -> Result<Properties> {
        Ok(cpu_no_tile::to_properties(cfg)?
            .with(Property::new("renderengine.type", PATHCPU_TAG))
            .merge(&PathCpuParams::from_properties(cfg)?.to_properties()))
    }

    pub fn default_props() -> Properties {
        cpu_no_tile::default_props()
            .with(Property::new("renderengine.type", PATHCPU_TAG))
            .merge(&PathDepthParams::default().to_properties("path"))
            .with(Property::new(VARIANCE_CLAMP_KEY, 0.0f64))
    }
}

impl NoTileRenderEngine for PathCpuRenderEngine {
    fn base(&self) -> &CpuNoTileEngine {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CpuNoTileEngine {
        &mut self.base
    }

    fn declare_film_channels(&self, film: &Film) -> Result<()> {
        film.add_channel(FilmChannelType::RadiancePerPixelNormalized)?;
        film.set_radiance_group_count(self.base.config().scene.light_group_count())
    }

    fn build_integrator(&mut self) -> Result<Arc<dyn Integrator>> {
        let params = PathCpuParams::from_properties(&self.base.config().cfg)?;
        Ok(Arc::new(PathTracer::new(
            Arc::clone(&self.base.config().scene),
            params.depth,
            VarianceClamping::new(params.sqrt_variance_clamp_max_value),
        )))
    }

    fn engine_properties(&self) -> Result<Properties> {
        PathCpuRenderEngine::to_properties(&self.base.config().cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::RenderEngineError;
    use crate::renderers::light_cpu::LIGHTCPU_TAG;
    use crate::renderers::render_state::RenderState;
    use crate::scenes::cornell_box;

    fn stereo_config() -> RenderConfig {
        let cfg = Properties::new()
            .with(Property::new("film.width", 16))
            .with(Property::new("film.height", 8))
            .with(Property::new("native.threads.count", 2))
            .with(Property::new("scene.camera.type", "stereo"));
        RenderConfig::new(Arc::new(cornell_box(&cfg).unwrap()), cfg)
    }

    #[test]
    fn test_stereo_render() {
        let mut engine = PathCpuRenderEngine::new(stereo_config()).unwrap();
        engine.init_film().unwrap();
        assert!(!engine.film().has_channel(FilmChannelType::RadiancePerScreenNormalized));
        engine.start().unwrap();
        assert!(matches!(engine.update_film(), Err(RenderEngineError::ScreenBufferBusy)));
        while engine.film().total_sample_count() < 5000 {
            std::thread::yield_now();
        }
        engine.stop();

        let image = engine.update_film().unwrap();
        assert!(image.pixels.iter().all(|p| p.is_valid()));
        assert!(image.pixels.iter().any(|p| p.y() > 0.0));
        assert_eq!(engine.render_state().engine_tag(), PATHCPU_TAG);
    }

    #[test]
    fn test_light_state_is_rejected() {
        let mut engine = PathCpuRenderEngine::new(stereo_config()).unwrap();
        engine.init_film().unwrap();
        engine.set_start_render_state(RenderState::new(LIGHTCPU_TAG, 3));
        assert!(matches!(engine.start(), Err(RenderEngineError::RenderStateTypeMismatch { .. })));
    }

    #[test]
    fn test_properties_round_trip() {
        let cfg = Properties::new()
            .with(Property::new("path.maxdepth", 8))
            .with(Property::new(VARIANCE_CLAMP_KEY, 5.0f64));
        let props = PathCpuRenderEngine::to_properties(&cfg).unwrap();
        assert_eq!(
            PathCpuParams::from_properties(&props).unwrap(),
            PathCpuParams::from_properties(&cfg).unwrap()
        );
        assert_eq!(props.get("renderengine.type").unwrap().as_string(), PATHCPU_TAG);
        assert_eq!(PathCpuRenderEngine::to_properties(&props).unwrap(), props);
    }
}
