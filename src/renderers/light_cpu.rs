// Copyright @yucwang 2026

use super::cpu_no_tile::{self, CpuNoTileEngine, NoTileRenderEngine};
use super::renderer::RenderEngine;
use crate::core::error::{RenderEngineError, Result};
use crate::core::integrator::Integrator;
use crate::core::properties::{Properties, Property};
use crate::core::render_config::RenderConfig;
use crate::core::sensor::CameraType;
use crate::film::variance_clamping::VarianceClamping;
use crate::film::{Film, FilmChannelType};
use crate::integrators::light::LightTracer;
use crate::integrators::PathDepthParams;
use crate::math::constants::Float;

use std::sync::Arc;

pub const LIGHTCPU_TAG: &str = "LIGHTCPU";

const VARIANCE_CLAMP_KEY: &str = "path.clamping.variance.maxvalue";
const LEGACY_VARIANCE_CLAMP_KEY: &str = "path.clamping.radiance.maxvalue";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightCpuParams {
    pub depth: PathDepthParams,
    pub sqrt_variance_clamp_max_value: Float,
}

impl Default for LightCpuParams {
    fn default() -> Self {
        Self { depth: PathDepthParams::default(), sqrt_variance_clamp_max_value: 0.0 }
    }
}

impl LightCpuParams {
    pub fn from_properties(cfg: &Properties) -> Result<Self> {
        let depth = PathDepthParams::from_properties("light", cfg)?;

        // the old radiance key is still honoured, the variance key wins
        let mut clamp_max = 0.0;
        if let Some(prop) = cfg.get(LEGACY_VARIANCE_CLAMP_KEY) {
            clamp_max = prop.as_float()?;
        }
        if let Some(prop) = cfg.get(VARIANCE_CLAMP_KEY) {
            clamp_max = prop.as_float()?;
        }

        Ok(Self { depth, sqrt_variance_clamp_max_value: clamp_max.max(0.0) })
    }

    pub fn to_properties(&self) -> Properties {
        self.depth
            .to_properties("light")
            .with(Property::new(VARIANCE_CLAMP_KEY, self.sqrt_variance_clamp_max_value))
    }
}

/// Light tracing engine. Paths start at the lights and are splatted into the
/// per screen normalized channel, lights seen by the camera go to the per
/// pixel normalized one.
pub struct LightCpuRenderEngine {
    base: CpuNoTileEngine,
    params: LightCpuParams,
}

impl LightCpuRenderEngine {
    pub fn new(config: RenderConfig) -> Result<Self> {
        if config.scene.camera().camera_type() == CameraType::Stereo {
            return Err(RenderEngineError::UnsupportedConfiguration(String::from(
                "light tracing render engine doesn't support stereo camera",
            )));
        }

        Ok(Self {
            base: CpuNoTileEngine::new(LIGHTCPU_TAG, config)?,
            params: LightCpuParams::default(),
        })
    }

    pub fn params(&self) -> &LightCpuParams {
        &self.params
    }

    pub fn bootstrap_seed(&self) -> u32 {
        self.base.bootstrap_seed()
    }

    pub fn has_start_film(&self) -> bool {
        self.base.has_start_film()
    }

    pub fn has_sample_splatter(&self) -> bool {
        self.base.sample_splatter().is_some()
    }

    pub fn from_config(config: RenderConfig) -> Result<Box<dyn RenderEngine>> {
        Ok(Box::new(LightCpuRenderEngine::new(config)?))
    }

    pub fn to_properties(cfg: &Properties) -> Result<Properties> {
        Ok(cpu_no_tile::to_properties(cfg)?
            .with(Property::new("renderengine.type", LIGHTCPU_TAG))
            .merge(&LightCpuParams::from_properties(cfg)?.to_properties()))
    }

    pub fn default_props() -> Properties {
        cpu_no_tile::default_props()
            .with(Property::new("renderengine.type", LIGHTCPU_TAG))
            .merge(&LightCpuParams::default().to_properties())
    }
}

impl NoTileRenderEngine for LightCpuRenderEngine {
    fn base(&self) -> &CpuNoTileEngine {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CpuNoTileEngine {
        &mut self.base
    }

    fn declare_film_channels(&self, film: &Film) -> Result<()> {
        film.add_channel(FilmChannelType::RadiancePerPixelNormalized)?;
        film.add_channel(FilmChannelType::RadiancePerScreenNormalized)?;
        film.set_overlapped_screen_buffer_update_flag(true);
        film.set_radiance_group_count(self.base.config().scene.light_group_count())
    }

    fn build_integrator(&mut self) -> Result<Arc<dyn Integrator>> {
        self.params = LightCpuParams::from_properties(&self.base.config().cfg)?;
        Ok(Arc::new(LightTracer::new(
            Arc::clone(&self.base.config().scene),
            self.params.depth,
            VarianceClamping::new(self.params.sqrt_variance_clamp_max_value),
        )))
    }

    fn engine_properties(&self) -> Result<Properties> {
        LightCpuRenderEngine::to_properties(&self.base.config().cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::Scene;
    use crate::renderers::render_state::RenderState;
    use crate::scenes::cornell_box;
    use crate::sensors::stereo::StereoCamera;
    use crate::math::constants::Vector3f;

    fn cornell_config(cfg: Properties) -> RenderConfig {
        let cfg = Properties::new()
            .with(Property::new("film.width", 16))
            .with(Property::new("film.height", 16))
            .with(Property::new("native.threads.count", 2))
            .merge(&cfg);
        let scene = cornell_box(&cfg).unwrap();
        RenderConfig::new(Arc::new(scene), cfg)
    }

    fn started_then_stopped(engine: &mut LightCpuRenderEngine, samples: u64) {
        engine.start().unwrap();
        while engine.film().total_sample_count() < samples {
            std::thread::yield_now();
        }
        engine.stop();
    }

    #[test]
    fn test_stereo_camera_is_rejected() {
        let camera = StereoCamera::new(
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::zeros(),
            Vector3f::new(0.0, 1.0, 0.0),
            1.0,
            0.06,
            8,
            4,
        );
        let config = RenderConfig::new(Arc::new(Scene::new(Box::new(camera))), Properties::new());
        assert!(matches!(
            LightCpuRenderEngine::new(config),
            Err(RenderEngineError::UnsupportedConfiguration(_))
        ));

        assert!(LightCpuRenderEngine::new(cornell_config(Properties::new())).is_ok());
    }

    #[test]
    fn test_properties_round_trip() {
        let cfgs = vec![
            Properties::new(),
            Properties::new()
                .with(Property::new("light.maxdepth", 9))
                .with(Property::new("light.russianroulette.depth", 1))
                .with(Property::new("light.russianroulette.cap", 0.25f64))
                .with(Property::new(VARIANCE_CLAMP_KEY, 3.5f64)),
            Properties::new().with(Property::new(LEGACY_VARIANCE_CLAMP_KEY, 2.0f64)),
            Properties::new()
                .with(Property::new(LEGACY_VARIANCE_CLAMP_KEY, 2.0f64))
                .with(Property::new(VARIANCE_CLAMP_KEY, 1.0f64)),
            Properties::new().with(Property::new(VARIANCE_CLAMP_KEY, -4.0f64)),
        ];
        for cfg in cfgs.iter() {
            let props = LightCpuRenderEngine::to_properties(cfg).unwrap();
            assert_eq!(
                LightCpuParams::from_properties(&props).unwrap(),
                LightCpuParams::from_properties(cfg).unwrap()
            );
            assert_eq!(LightCpuRenderEngine::to_properties(&props).unwrap(), props);
        }

        let legacy = LightCpuParams::from_properties(&cfgs[2]).unwrap();
        assert_eq!(legacy.sqrt_variance_clamp_max_value, 2.0);
        let both = LightCpuParams::from_properties(&cfgs[3]).unwrap();
        assert_eq!(both.sqrt_variance_clamp_max_value, 1.0);
        let negative = LightCpuParams::from_properties(&cfgs[4]).unwrap();
        assert_eq!(negative.sqrt_variance_clamp_max_value, 0.0);
    }

    #[test]
    fn test_default_props() {
        let props = LightCpuRenderEngine::default_props();
        let params = LightCpuParams::from_properties(&props).unwrap();
        assert_eq!(params.depth.max_path_depth, 5);
        assert_eq!(params.depth.rr_depth, 3);
        assert_eq!(params.depth.rr_importance_cap, 0.5);
        assert_eq!(params.sqrt_variance_clamp_max_value, 0.0);
        assert_eq!(props.get("renderengine.type").unwrap().as_string(), LIGHTCPU_TAG);
        assert_eq!(props.get("renderengine.seed").unwrap().as_uint().unwrap(), 131);
    }

    #[test]
    fn test_lifecycle_errors() {
        let mut engine = LightCpuRenderEngine::new(cornell_config(Properties::new())).unwrap();
        assert!(matches!(engine.start(), Err(RenderEngineError::FilmNotInitialized)));
        assert!(!engine.has_sample_splatter());

        engine.init_film().unwrap();
        assert!(matches!(engine.init_film(), Err(RenderEngineError::FilmAlreadyInitialized)));
        assert!(engine.film().has_channel(FilmChannelType::RadiancePerScreenNormalized));
        assert!(engine.film().is_overlapped_screen_buffer_update());

        let tiled = cornell_config(Properties::new().with(Property::new("sampler.type", "TILEPATHSAMPLER")));
        let mut tiled_engine = LightCpuRenderEngine::new(tiled).unwrap();
        tiled_engine.init_film().unwrap();
        assert!(matches!(tiled_engine.start(), Err(RenderEngineError::IncompatibleSampler { .. })));
    }

    #[test]
    fn test_render_state_tag_mismatch() {
        let mut engine = LightCpuRenderEngine::new(cornell_config(Properties::new())).unwrap();
        engine.init_film().unwrap();
        engine.set_start_render_state(RenderState::new("PATHCPU", 10));
        assert!(matches!(engine.start(), Err(RenderEngineError::RenderStateTypeMismatch { .. })));
        assert!(!engine.is_started());
    }

    #[test]
    fn test_seed_advances_once_per_resume() {
        let cfg = Properties::new().with(Property::new("renderengine.seed", 1000));
        let mut seeds = Vec::new();
        let mut state: Option<RenderState> = None;
        for _ in 0..4 {
            let mut engine = LightCpuRenderEngine::new(cornell_config(cfg.clone())).unwrap();
            engine.init_film().unwrap();
            if let Some(state) = state.take() {
                engine.set_start_render_state(state);
            }
            started_then_stopped(&mut engine, 10);
            let snapshot = engine.render_state();
            seeds.push(snapshot.bootstrap_seed());
            state = Some(snapshot);
        }
        assert_eq!(seeds, vec![1000, 1001, 1002, 1003]);
    }

    #[test]
    fn test_retry_after_failed_start_still_resumes() {
        let mut engine = LightCpuRenderEngine::new(cornell_config(Properties::new())).unwrap();
        engine.set_start_render_state(RenderState::new(LIGHTCPU_TAG, 10));
        assert!(matches!(engine.start(), Err(RenderEngineError::FilmNotInitialized)));
        assert_eq!(engine.render_state().bootstrap_seed(), 131);

        engine.init_film().unwrap();
        started_then_stopped(&mut engine, 10);
        assert!(engine.has_start_film());
        assert_eq!(engine.render_state(), RenderState::new(LIGHTCPU_TAG, 11));
    }

    #[test]
    fn test_resumed_film_keeps_accumulating() {
        let mut first = LightCpuRenderEngine::new(cornell_config(Properties::new())).unwrap();
        first.init_film().unwrap();
        started_then_stopped(&mut first, 2000);
        // stands for a long earlier run
        first.film().add_sample_count(1_000_000_000);
        let film_state = first.film().state().unwrap();
        let restored = film_state.total_sample_count;

        let mut second = LightCpuRenderEngine::new(cornell_config(Properties::new())).unwrap();
        second.init_film().unwrap();
        second.film().restore(&film_state).unwrap();
        second.set_start_render_state(first.render_state());
        second.start().unwrap();
        let at_start = second.film().total_sample_count();
        while second.film().total_sample_count() < restored + 1000 {
            std::thread::yield_now();
        }
        second.stop();

        assert!(at_start >= restored);
        assert!(second.has_start_film());
        assert!(second.film().total_sample_count() >= restored + 1000);
        assert_eq!(second.render_state().bootstrap_seed(), 132);
        let image = second.update_film().unwrap();
        assert!(image.pixels.iter().all(|p| p.is_valid()));
    }

    #[test]
    fn test_short_render_produces_finite_image() {
        let mut engine = LightCpuRenderEngine::new(cornell_config(Properties::new())).unwrap();
        engine.init_film().unwrap();
        started_then_stopped(&mut engine, 20000);

        assert!(!engine.is_started());
        assert!(!engine.has_sample_splatter());
        let image = engine.update_film().unwrap();
        assert!(image.pixels.iter().all(|p| p.is_valid()));
        assert!(image.mask.iter().all(|m| *m));
        assert!(image.pixels.iter().any(|p| p.y() > 0.0));
        assert_eq!(engine.discarded_path_count(), 0);
    }
}
