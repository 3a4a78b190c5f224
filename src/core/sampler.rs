// Copyright @yucwang 2026

use crate::core::error::{RenderEngineError, Result};
use crate::core::properties::{Properties, Property};
use crate::math::constants::{Float, Vector2f};

pub const RANDOM_SAMPLER: &str = "RANDOM";
pub const TILE_PATH_SAMPLER: &str = "TILEPATHSAMPLER";

/// Source of the random numbers driving one render worker.
pub trait Sampler: Send {
    fn next_float(&mut self) -> Float;

    fn next_2d(&mut self) -> Vector2f {
        let u = self.next_float();
        let v = self.next_float();
        Vector2f::new(u, v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerType {
    Random,
    TilePath,
}

impl SamplerType {
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            RANDOM_SAMPLER => Ok(SamplerType::Random),
            TILE_PATH_SAMPLER => Ok(SamplerType::TilePath),
            _ => Err(RenderEngineError::InvalidProperty {
                name: String::from("sampler.type"),
                reason: format!("unknown sampler type: {}", tag),
            }),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            SamplerType::Random => RANDOM_SAMPLER,
            SamplerType::TilePath => TILE_PATH_SAMPLER,
        }
    }

    pub fn from_properties(cfg: &Properties) -> Result<Self> {
        let prop = cfg.get_or_default(&default_props(), "sampler.type")?;
        SamplerType::from_tag(&prop.as_string())
    }
}

pub fn default_props() -> Properties {
    Properties::new().with(Property::new("sampler.type", RANDOM_SAMPLER))
}

pub fn to_properties(cfg: &Properties) -> Result<Properties> {
    Ok(Properties::new().with(cfg.get_or_default(&default_props(), "sampler.type")?))
}

/// Non-tiled engines accumulate continuously over the whole film, so a sampler
/// that walks the image tile by tile can not drive them.
pub fn check_samplers_for_no_tile(engine_tag: &str, cfg: &Properties) -> Result<()> {
    match SamplerType::from_properties(cfg)? {
        SamplerType::TilePath => Err(RenderEngineError::IncompatibleSampler {
            engine: engine_tag.to_string(),
            sampler: TILE_PATH_SAMPLER.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Combines the run seed and the worker index into one 64 bit stream id.
pub fn worker_seed(bootstrap_seed: u32, thread_index: usize) -> u64 {
    ((bootstrap_seed as u64) << 32) | ((thread_index as u64) & 0xFFFF_FFFF)
}

pub struct RandomSampler {
    state: u64,
}

impl RandomSampler {
    pub fn new(seed: u64) -> Self {
        // splitmix64 so that neighbouring seeds start far apart
        let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        Self { state: z ^ (z >> 31) }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.state >> 32) as u32
    }
}

impl Sampler for RandomSampler {
    fn next_float(&mut self) -> Float {
        // 24 bits keep the result strictly below one
        ((self.next_u32() >> 8) as Float) * (1.0 / 16777216.0)
    }
}
