// Copyright @yucwang 2026

use crate::core::sampler::Sampler;
use crate::film::sample_splatter::FilmSampleSplatter;
use crate::film::Film;

/// One iteration of a progressive estimator. Called in a loop by every render
/// worker, each call traces one sample and splats it into `film`.
pub trait Integrator: Send + Sync {
    fn render_sample(&self, sampler: &mut dyn Sampler, film: &Film, splatter: &FilmSampleSplatter);
}
