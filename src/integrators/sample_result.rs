// Copyright @yucwang 2026

use crate::film::sample_splatter::FilmSampleSplatter;
use crate::film::variance_clamping::VarianceClamping;
use crate::film::Film;
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::RGBSpectrum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    PerPixel,
    PerScreen,
}

/// One contribution of a traced sample, not yet written to the film.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleResult {
    pub kind: SampleKind,
    pub light_group: usize,
    pub film_pos: Vector2f,
    pub radiance: RGBSpectrum,
}

impl SampleResult {
    pub fn per_pixel(light_group: usize, film_pos: Vector2f, radiance: RGBSpectrum) -> Self {
        Self { kind: SampleKind::PerPixel, light_group, film_pos, radiance }
    }

    pub fn per_screen(light_group: usize, film_pos: Vector2f, radiance: RGBSpectrum) -> Self {
        Self { kind: SampleKind::PerScreen, light_group, film_pos, radiance }
    }
}

fn clamp_result(film: &Film, clamping: &VarianceClamping, result: &SampleResult) -> RGBSpectrum {
    if !clamping.has_clamping() {
        return result.radiance;
    }
    let (x, y) = match film.pixel_at(&result.film_pos) {
        Some(pixel) => pixel,
        None => return result.radiance,
    };
    match result.kind {
        SampleKind::PerPixel => {
            let (expected, _) = film.per_pixel_radiance(result.light_group, x, y);
            clamping.clamp(&expected, &result.radiance)
        }
        SampleKind::PerScreen => {
            // per screen samples are clamped as the pixel estimate they would produce alone
            let pixel_count = film.pixel_count() as Float;
            let expected = film.per_screen_radiance(result.light_group, x, y);
            clamping.clamp(&expected, &(result.radiance * pixel_count)) / pixel_count
        }
    }
}

/// Writes all the results of one sample, or none of them when any is NaN or
/// infinite. Returns false when the sample was discarded.
pub fn splat_sample_results(film: &Film,
                            splatter: &FilmSampleSplatter,
                            clamping: &VarianceClamping,
                            results: &[SampleResult]) -> bool {
    if let Some(bad) = results.iter().find(|r| !r.radiance.is_valid()) {
        film.add_discarded_sample();
        log::debug!(
            "Discarding sample with invalid radiance {:?} at film position ({}, {}).",
            bad.radiance, bad.film_pos.x, bad.film_pos.y
        );
        return false;
    }

    for result in results.iter() {
        let radiance = clamp_result(film, clamping, result);
        match result.kind {
            SampleKind::PerPixel => splatter.splat_per_pixel(film, result.light_group, &result.film_pos, &radiance),
            SampleKind::PerScreen => splatter.splat_per_screen(film, result.light_group, &result.film_pos, &radiance),
        }
    }
    true
}
