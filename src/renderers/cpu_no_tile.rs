// Copyright @yucwang 2026

use super::render_state::RenderState;
use super::renderer::RenderEngine;
use crate::core::error::{RenderEngineError, Result};
use crate::core::integrator::Integrator;
use crate::core::properties::{Properties, Property};
use crate::core::render_config::RenderConfig;
use crate::core::sampler::{self, check_samplers_for_no_tile, worker_seed, RandomSampler};
use crate::film::filter::{self, Filter};
use crate::film::sample_splatter::FilmSampleSplatter;
use crate::film::{Film, FilmImage};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub const DEFAULT_SEED: u32 = 131;

fn default_thread_count() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Shared machinery of the engines accumulating over the whole film without
/// tiles: worker threads, seeds, the sample splatter and the resume bookkeeping.
pub struct CpuNoTileEngine {
    tag: &'static str,
    config: RenderConfig,
    film: Arc<Film>,
    thread_count: usize,
    bootstrap_seed: u32,
    start_render_state: Option<RenderState>,
    has_start_film: bool,
    sample_splatter: Option<Arc<FilmSampleSplatter>>,
    stop_flag: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl CpuNoTileEngine {
    pub fn new(tag: &'static str, config: RenderConfig) -> Result<Self> {
        let defaults = default_props();
        let thread_count = match config.cfg.get("native.threads.count") {
            Some(prop) => prop.as_uint()?.max(1) as usize,
            None => default_thread_count(),
        };
        let bootstrap_seed = config.cfg.get_or_default(&defaults, "renderengine.seed")?.as_uint()?;
        let (width, height) = config.scene.camera().resolution();

        Ok(Self {
            tag,
            film: Arc::new(Film::new(width, height)),
            config,
            thread_count,
            bootstrap_seed,
            start_render_state: None,
            has_start_film: false,
            sample_splatter: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            workers: Vec::new(),
        })
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn film(&self) -> &Arc<Film> {
        &self.film
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    pub fn bootstrap_seed(&self) -> u32 {
        self.bootstrap_seed
    }

    pub fn has_start_film(&self) -> bool {
        self.has_start_film
    }

    pub fn sample_splatter(&self) -> Option<&Arc<FilmSampleSplatter>> {
        self.sample_splatter.as_ref()
    }

    pub fn is_started(&self) -> bool {
        !self.workers.is_empty()
    }

    pub fn set_start_render_state(&mut self, state: RenderState) {
        self.start_render_state = Some(state);
    }

    pub fn has_start_render_state(&self) -> bool {
        self.start_render_state.is_some()
    }

    /// Seed a resumed run would start from. The pending state is checked
    /// but stays pending.
    pub fn resume_seed(&self) -> Result<Option<u32>> {
        match &self.start_render_state {
            Some(state) => {
                state.check_engine_tag(self.tag)?;
                Ok(Some(state.bootstrap_seed().wrapping_add(1)))
            }
            None => Ok(None),
        }
    }

    pub fn render_state(&self) -> RenderState {
        RenderState::new(self.tag, self.bootstrap_seed)
    }

    /// Checks run before the engine parameters are read.
    pub fn check_start(&self) -> Result<()> {
        if self.is_started() {
            return Err(RenderEngineError::EngineAlreadyStarted);
        }
        check_samplers_for_no_tile(self.tag, &self.config.cfg)
    }

    /// Rebuilds the splatter and spawns the workers. The pending render state,
    /// the seed and the start film flag only change once every worker runs.
    pub fn start(&mut self, integrator: Arc<dyn Integrator>) -> Result<()> {
        self.check_start()?;
        if !self.film.is_initialized() {
            return Err(RenderEngineError::FilmNotInitialized);
        }
        let resumed = self.resume_seed()?;
        let splatter = Arc::new(FilmSampleSplatter::new(Filter::from_properties(&self.config.cfg)?));

        let (seed, has_start_film) = match resumed {
            Some(seed) => {
                log::info!("Continuing the rendering with new {} seed: {}", self.tag, seed);
                (seed, true)
            }
            None => (self.bootstrap_seed, false),
        };
        if !has_start_film {
            self.film.clear();
        }
        self.spawn_workers(integrator, Arc::clone(&splatter), seed)?;

        self.start_render_state = None;
        self.bootstrap_seed = seed;
        self.has_start_film = has_start_film;
        self.sample_splatter = Some(splatter);
        Ok(())
    }

    fn spawn_workers(&mut self,
                     integrator: Arc<dyn Integrator>,
                     splatter: Arc<FilmSampleSplatter>,
                     seed: u32) -> Result<()> {
        self.stop_flag.store(false, Ordering::SeqCst);
        log::info!("Starting {} with {} threads, bootstrap seed: {}.", self.tag, self.thread_count, seed);
        for thread_index in 0..self.thread_count {
            let integrator = Arc::clone(&integrator);
            let splatter = Arc::clone(&splatter);
            let film = Arc::clone(&self.film);
            let stop_flag = Arc::clone(&self.stop_flag);
            let seed = worker_seed(seed, thread_index);

            let spawned = thread::Builder::new()
                .name(format!("{}-{}", self.tag.to_lowercase(), thread_index))
                .spawn(move || {
                    let mut sampler = RandomSampler::new(seed);
                    while !stop_flag.load(Ordering::Relaxed) {
                        integrator.render_sample(&mut sampler, &film, &splatter);
                    }
                });
            match spawned {
                Ok(handle) => self.workers.push(handle),
                Err(err) => {
                    self.stop_workers();
                    return Err(err.into());
                }
            }
        }
        Ok(())
    }

    /// Returns once every worker has left its render loop, then releases the
    /// splatter.
    pub fn stop(&mut self) {
        self.stop_workers();
        self.sample_splatter = None;
    }

    fn stop_workers(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        self.stop_flag.store(true, Ordering::SeqCst);
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::warn!("A {} render thread panicked.", self.tag);
            }
        }
        log::info!(
            "Stopped {}: {} samples, {:.2} spp, {} discarded.",
            self.tag,
            self.film.total_sample_count(),
            self.film.samples_per_pixel(),
            self.film.discarded_sample_count()
        );
    }

    /// Merged film output; while running only allowed with overlapped updates.
    pub fn update_film(&self) -> Result<FilmImage> {
        if self.is_started() && !self.film.is_overlapped_screen_buffer_update() {
            return Err(RenderEngineError::ScreenBufferBusy);
        }
        Ok(self.film.output())
    }
}

impl Drop for CpuNoTileEngine {
    fn drop(&mut self) {
        self.stop_workers();
    }
}

/// An engine on top of `CpuNoTileEngine`. It declares its film channels and
/// builds its estimator, the base runs everything else.
pub trait NoTileRenderEngine: Send {
    fn base(&self) -> &CpuNoTileEngine;

    fn base_mut(&mut self) -> &mut CpuNoTileEngine;

    /// Channels, overlap flag and radiance groups, before `Film::init`.
    fn declare_film_channels(&self, film: &Film) -> Result<()>;

    /// Reads the engine parameters from the configuration.
    fn build_integrator(&mut self) -> Result<Arc<dyn Integrator>>;

    fn engine_properties(&self) -> Result<Properties>;
}

impl<T: NoTileRenderEngine> RenderEngine for T {
    fn tag(&self) -> &'static str {
        self.base().tag()
    }

    fn film(&self) -> &Arc<Film> {
        self.base().film()
    }

    fn init_film(&mut self) -> Result<()> {
        let film = Arc::clone(self.base().film());
        self.declare_film_channels(&film)?;
        film.init()
    }

    fn start(&mut self) -> Result<()> {
        self.base().check_start()?;
        let integrator = self.build_integrator()?;
        self.base_mut().start(integrator)
    }

    fn stop(&mut self) {
        self.base_mut().stop();
    }

    fn is_started(&self) -> bool {
        self.base().is_started()
    }

    fn render_state(&self) -> RenderState {
        self.base().render_state()
    }

    fn set_start_render_state(&mut self, state: RenderState) {
        self.base_mut().set_start_render_state(state);
    }

    fn to_properties(&self) -> Result<Properties> {
        self.engine_properties()
    }

    fn update_film(&self) -> Result<FilmImage> {
        self.base().update_film()
    }
}

pub fn default_props() -> Properties {
    Properties::new()
        .with(Property::new("renderengine.seed", DEFAULT_SEED))
        .with(Property::new("native.threads.count", default_thread_count()))
        .with(Property::new("batch.halttime", 0.0f64))
        .with(Property::new("batch.haltspp", 0))
        .merge(&sampler::default_props())
        .merge(&filter::default_props())
}

/// Every base key of `cfg`, with defaults filled in.
pub fn to_properties(cfg: &Properties) -> Result<Properties> {
    let defaults = default_props();
    let mut props = Properties::new();
    for name in defaults.names() {
        props.set(cfg.get_or_default(&defaults, name)?);
    }
    Ok(props)
}
