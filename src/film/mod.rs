// Copyright @yucwang 2026

pub mod atomic;
pub mod filter;
pub mod imagepipeline;
pub mod sample_splatter;
pub mod variance_clamping;

use crate::core::error::{RenderEngineError, Result};
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::RGBSpectrum;
use self::atomic::AtomicFloat;

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilmChannelType {
    /// Divided by the filter weight that reached the pixel.
    RadiancePerPixelNormalized,
    /// Divided by the number of paths traced over the whole film.
    RadiancePerScreenNormalized,
}

const PER_PIXEL_STRIDE: usize = 4;
const PER_SCREEN_STRIDE: usize = 3;

#[derive(Debug, Default)]
struct FilmSettings {
    channels: Vec<FilmChannelType>,
    radiance_group_count: usize,
}

struct FilmBuffers {
    channels: Vec<FilmChannelType>,
    radiance_group_count: usize,
    // rgb sum + weight, one buffer per radiance group
    per_pixel: Vec<Vec<AtomicFloat>>,
    // rgb sum, one buffer per radiance group
    per_screen: Vec<Vec<AtomicFloat>>,
}

/// Merged film output handed to the image pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct FilmImage {
    width: usize,
    height: usize,
    pub pixels: Vec<RGBSpectrum>,
    /// False for pixels that never received a sample.
    pub mask: Vec<bool>,
}

impl FilmImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![RGBSpectrum::default(); width * height],
            mask: vec![false; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmState {
    pub width: usize,
    pub height: usize,
    pub channels: Vec<FilmChannelType>,
    pub radiance_group_count: usize,
    pub per_pixel: Vec<Vec<f32>>,
    pub per_screen: Vec<Vec<f32>>,
    pub total_sample_count: u64,
}

/// Multi-channel accumulation buffer. Channels are declared before `init`,
/// afterwards every accumulation is a lock-free atomic add so any number of
/// render threads can write concurrently.
pub struct Film {
    width: usize,
    height: usize,
    settings: Mutex<FilmSettings>,
    buffers: OnceLock<FilmBuffers>,
    overlapped_screen_buffer_update: AtomicBool,
    total_sample_count: AtomicU64,
    discarded_sample_count: AtomicU64,
}

impl Film {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            settings: Mutex::new(FilmSettings { channels: Vec::new(), radiance_group_count: 1 }),
            buffers: OnceLock::new(),
            overlapped_screen_buffer_update: AtomicBool::new(false),
            total_sample_count: AtomicU64::new(0),
            discarded_sample_count: AtomicU64::new(0),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    fn settings(&self) -> std::sync::MutexGuard<'_, FilmSettings> {
        self.settings.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_channel(&self, channel: FilmChannelType) -> Result<()> {
        if self.is_initialized() {
            return Err(RenderEngineError::FilmAlreadyInitialized);
        }
        let mut settings = self.settings();
        if !settings.channels.contains(&channel) {
            settings.channels.push(channel);
        }
        Ok(())
    }

    pub fn set_radiance_group_count(&self, count: usize) -> Result<()> {
        if self.is_initialized() {
            return Err(RenderEngineError::FilmAlreadyInitialized);
        }
        self.settings().radiance_group_count = count.max(1);
        Ok(())
    }

    /// Allows readers to observe the buffers while render threads write them.
    pub fn set_overlapped_screen_buffer_update_flag(&self, overlapped: bool) {
        self.overlapped_screen_buffer_update.store(overlapped, Ordering::Relaxed);
    }

    pub fn is_overlapped_screen_buffer_update(&self) -> bool {
        self.overlapped_screen_buffer_update.load(Ordering::Relaxed)
    }

    pub fn init(&self) -> Result<()> {
        let settings = self.settings();
        let pixel_count = self.pixel_count();
        let group_count = settings.radiance_group_count;
        let has_per_pixel = settings.channels.contains(&FilmChannelType::RadiancePerPixelNormalized);
        let has_per_screen = settings.channels.contains(&FilmChannelType::RadiancePerScreenNormalized);
        let alloc = |enabled: bool, stride: usize| -> Vec<Vec<AtomicFloat>> {
            if !enabled {
                return Vec::new();
            }
            (0..group_count)
                .map(|_| (0..pixel_count * stride).map(|_| AtomicFloat::default()).collect())
                .collect()
        };

        let buffers = FilmBuffers {
            channels: settings.channels.clone(),
            radiance_group_count: group_count,
            per_pixel: alloc(has_per_pixel, PER_PIXEL_STRIDE),
            per_screen: alloc(has_per_screen, PER_SCREEN_STRIDE),
        };
        self.buffers.set(buffers).map_err(|_| RenderEngineError::FilmAlreadyInitialized)?;

        log::info!(
            "Film initialized: {}x{}, channels: {:?}, radiance groups: {}.",
            self.width, self.height, settings.channels, group_count
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.buffers.get().is_some()
    }

    pub fn has_channel(&self, channel: FilmChannelType) -> bool {
        match self.buffers.get() {
            Some(buffers) => buffers.channels.contains(&channel),
            None => self.settings().channels.contains(&channel),
        }
    }

    pub fn radiance_group_count(&self) -> usize {
        match self.buffers.get() {
            Some(buffers) => buffers.radiance_group_count,
            None => self.settings().radiance_group_count,
        }
    }

    /// Pixel holding a continuous film position, if it lies on the film.
    pub fn pixel_at(&self, film_pos: &Vector2f) -> Option<(usize, usize)> {
        if !(film_pos.x >= 0.0 && film_pos.y >= 0.0) {
            return None;
        }
        let x = film_pos.x as usize;
        let y = film_pos.y as usize;
        if x < self.width && y < self.height {
            Some((x, y))
        } else {
            None
        }
    }

    pub fn add_per_pixel(&self, group: usize, x: usize, y: usize, value: &RGBSpectrum, weight: Float) {
        let buffers = match self.buffers.get() {
            Some(buffers) => buffers,
            None => return,
        };
        if let Some(buffer) = buffers.per_pixel.get(group) {
            let base = (x + y * self.width) * PER_PIXEL_STRIDE;
            for c in 0..3 {
                buffer[base + c].fetch_add(value[c] * weight, Ordering::Relaxed);
            }
            buffer[base + 3].fetch_add(weight, Ordering::Relaxed);
        }
    }

    pub fn add_per_screen(&self, group: usize, x: usize, y: usize, value: &RGBSpectrum) {
        let buffers = match self.buffers.get() {
            Some(buffers) => buffers,
            None => return,
        };
        if let Some(buffer) = buffers.per_screen.get(group) {
            let base = (x + y * self.width) * PER_SCREEN_STRIDE;
            for c in 0..3 {
                buffer[base + c].fetch_add(value[c], Ordering::Relaxed);
            }
        }
    }

    pub fn add_sample_count(&self, count: u64) {
        self.total_sample_count.fetch_add(count, Ordering::Relaxed);
    }

    pub fn total_sample_count(&self) -> u64 {
        self.total_sample_count.load(Ordering::Relaxed)
    }

    pub fn samples_per_pixel(&self) -> f64 {
        let pixel_count = self.pixel_count();
        if pixel_count == 0 {
            return 0.0;
        }
        self.total_sample_count() as f64 / pixel_count as f64
    }

    pub fn add_discarded_sample(&self) {
        self.discarded_sample_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn discarded_sample_count(&self) -> u64 {
        self.discarded_sample_count.load(Ordering::Relaxed)
    }

    /// Weighted average of the per-pixel normalized channel and its weight.
    pub fn per_pixel_radiance(&self, group: usize, x: usize, y: usize) -> (RGBSpectrum, Float) {
        let buffer = match self.buffers.get().and_then(|b| b.per_pixel.get(group)) {
            Some(buffer) => buffer,
            None => return (RGBSpectrum::default(), 0.0),
        };
        let base = (x + y * self.width) * PER_PIXEL_STRIDE;
        let weight = buffer[base + 3].load(Ordering::Relaxed);
        if weight <= 0.0 {
            return (RGBSpectrum::default(), 0.0);
        }
        let sum = RGBSpectrum::new(
            buffer[base].load(Ordering::Relaxed),
            buffer[base + 1].load(Ordering::Relaxed),
            buffer[base + 2].load(Ordering::Relaxed),
        );
        (sum / weight, weight)
    }

    pub fn per_screen_radiance(&self, group: usize, x: usize, y: usize) -> RGBSpectrum {
        let buffer = match self.buffers.get().and_then(|b| b.per_screen.get(group)) {
            Some(buffer) => buffer,
            None => return RGBSpectrum::default(),
        };
        let total = self.total_sample_count();
        if total == 0 {
            return RGBSpectrum::default();
        }
        let base = (x + y * self.width) * PER_SCREEN_STRIDE;
        let sum = RGBSpectrum::new(
            buffer[base].load(Ordering::Relaxed),
            buffer[base + 1].load(Ordering::Relaxed),
            buffer[base + 2].load(Ordering::Relaxed),
        );
        sum * (self.pixel_count() as f64 / total as f64) as Float
    }

    /// Radiance of one light group, both channels merged.
    pub fn group_pixel_radiance(&self, group: usize, x: usize, y: usize) -> RGBSpectrum {
        self.per_pixel_radiance(group, x, y).0 + self.per_screen_radiance(group, x, y)
    }

    pub fn pixel_radiance(&self, x: usize, y: usize) -> RGBSpectrum {
        let mut radiance = RGBSpectrum::default();
        for group in 0..self.radiance_group_count() {
            radiance += self.group_pixel_radiance(group, x, y);
        }
        radiance
    }

    fn is_pixel_valid(&self, x: usize, y: usize) -> bool {
        let has_screen_samples = self.has_channel(FilmChannelType::RadiancePerScreenNormalized)
            && self.total_sample_count() > 0;
        has_screen_samples
            || (0..self.radiance_group_count()).any(|group| self.per_pixel_radiance(group, x, y).1 > 0.0)
    }

    /// Snapshot of the merged radiance. With overlapped updates the rgb sums
    /// and the weights of a pixel may come from different moments.
    pub fn output(&self) -> FilmImage {
        let mut image = FilmImage::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = x + y * self.width;
                image.pixels[idx] = self.pixel_radiance(x, y);
                image.mask[idx] = self.is_pixel_valid(x, y);
            }
        }
        image
    }

    pub fn clear(&self) {
        if let Some(buffers) = self.buffers.get() {
            for value in buffers.per_pixel.iter().chain(buffers.per_screen.iter()).flatten() {
                value.store(0.0, Ordering::Relaxed);
            }
        }
        self.total_sample_count.store(0, Ordering::Relaxed);
        self.discarded_sample_count.store(0, Ordering::Relaxed);
    }

    pub fn state(&self) -> Result<FilmState> {
        let buffers = self.buffers.get().ok_or(RenderEngineError::FilmNotInitialized)?;
        let dump = |groups: &Vec<Vec<AtomicFloat>>| -> Vec<Vec<f32>> {
            groups
                .iter()
                .map(|buffer| buffer.iter().map(|v| v.load(Ordering::Relaxed)).collect())
                .collect()
        };
        Ok(FilmState {
            width: self.width,
            height: self.height,
            channels: buffers.channels.clone(),
            radiance_group_count: buffers.radiance_group_count,
            per_pixel: dump(&buffers.per_pixel),
            per_screen: dump(&buffers.per_screen),
            total_sample_count: self.total_sample_count(),
        })
    }

    pub fn restore(&self, state: &FilmState) -> Result<()> {
        let buffers = self.buffers.get().ok_or(RenderEngineError::FilmNotInitialized)?;
        let shape_of = |groups: &Vec<Vec<AtomicFloat>>| -> Vec<usize> { groups.iter().map(|b| b.len()).collect() };
        let state_shape_of = |groups: &Vec<Vec<f32>>| -> Vec<usize> { groups.iter().map(|b| b.len()).collect() };
        if state.width != self.width
            || state.height != self.height
            || state.radiance_group_count != buffers.radiance_group_count
            || shape_of(&buffers.per_pixel) != state_shape_of(&state.per_pixel)
            || shape_of(&buffers.per_screen) != state_shape_of(&state.per_screen)
        {
            return Err(RenderEngineError::Serialization(format!(
                "film state {}x{} with {} radiance groups does not match the film {}x{} with {}",
                state.width, state.height, state.radiance_group_count,
                self.width, self.height, buffers.radiance_group_count
            )));
        }

        let load = |groups: &Vec<Vec<AtomicFloat>>, values: &Vec<Vec<f32>>| {
            for (buffer, stored) in groups.iter().zip(values.iter()) {
                for (value, v) in buffer.iter().zip(stored.iter()) {
                    value.store(*v, Ordering::Relaxed);
                }
            }
        };
        load(&buffers.per_pixel, &state.per_pixel);
        load(&buffers.per_screen, &state.per_screen);
        self.total_sample_count.store(state.total_sample_count, Ordering::Relaxed);
        Ok(())
    }
}
