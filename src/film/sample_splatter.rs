// Copyright @yucwang 2026

use super::filter::Filter;
use super::Film;
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::RGBSpectrum;

/// Distributes point samples over the film pixels covered by a reconstruction filter.
pub struct FilmSampleSplatter {
    filter: Option<Filter>,
}

impl FilmSampleSplatter {
    pub fn new(filter: Option<Filter>) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    // (x, y, weight) for each pixel touched by a sample at `film_pos`
    fn footprint(&self, film: &Film, film_pos: &Vector2f) -> Vec<(usize, usize, Float)> {
        let (x, y) = match film.pixel_at(film_pos) {
            Some(pixel) => pixel,
            None => return Vec::new(),
        };
        let filter = match &self.filter {
            Some(filter) => filter,
            None => return vec![(x, y, 1.0)],
        };

        let w = filter.width();
        let fx = film_pos.x - 0.5;
        let fy = film_pos.y - 0.5;
        let x0 = (fx - w).ceil().max(0.0) as usize;
        let x1 = ((fx + w).floor() as usize).min(film.width() - 1);
        let y0 = (fy - w).ceil().max(0.0) as usize;
        let y1 = ((fy + w).floor() as usize).min(film.height() - 1);

        let mut taps = Vec::new();
        for py in y0..=y1 {
            for px in x0..=x1 {
                let weight = filter.evaluate(px as Float - fx, py as Float - fy);
                if weight > 0.0 {
                    taps.push((px, py, weight));
                }
            }
        }
        if taps.is_empty() {
            taps.push((x, y, 1.0));
        }
        taps
    }

    pub fn splat_per_pixel(&self, film: &Film, group: usize, film_pos: &Vector2f, value: &RGBSpectrum) {
        for (x, y, weight) in self.footprint(film, film_pos) {
            film.add_per_pixel(group, x, y, value, weight);
        }
    }

    /// The splatted weights sum to one so every path deposits exactly its value.
    pub fn splat_per_screen(&self, film: &Film, group: usize, film_pos: &Vector2f, value: &RGBSpectrum) {
        let taps = self.footprint(film, film_pos);
        let total: Float = taps.iter().map(|t| t.2).sum();
        if !(total > 0.0) {
            return;
        }
        for (x, y, weight) in taps {
            film.add_per_screen(group, x, y, &(*value * (weight / total)));
        }
    }
}
