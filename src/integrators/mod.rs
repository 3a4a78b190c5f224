// Copyright @yucwang 2026

pub mod light;
pub mod path;
pub mod roulette;
pub mod sample_result;

use crate::core::error::{RenderEngineError, Result};
use crate::core::properties::{Properties, Property};
use crate::math::constants::Float;

/// Depth and Russian roulette settings shared by the path based estimators.
///
/// `max_path_depth` counts scattering events: a depth of 0 keeps emission seen
/// directly, 1 adds one bounce and so on. The path tracer collects emission
/// after at most `max_path_depth` bounces and the light tracer connects light
/// vertices reached after at most `max_path_depth` bounces, so both engines
/// render the same transport for the same setting. Russian roulette is played
/// when sampling the `rr_depth`-th bounce and every later one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathDepthParams {
    pub max_path_depth: u32,
    pub rr_depth: u32,
    pub rr_importance_cap: Float,
}

impl Default for PathDepthParams {
    fn default() -> Self {
        Self { max_path_depth: 5, rr_depth: 3, rr_importance_cap: 0.5 }
    }
}

impl PathDepthParams {
    /// Reads `<prefix>.maxdepth`, `<prefix>.russianroulette.depth` and `<prefix>.russianroulette.cap`.
    pub fn from_properties(prefix: &str, cfg: &Properties) -> Result<Self> {
        let defaults = Self::default().to_properties(prefix);
        let max_path_depth = cfg.get_or_default(&defaults, &format!("{}.maxdepth", prefix))?.as_uint()?;
        let rr_depth = cfg.get_or_default(&defaults, &format!("{}.russianroulette.depth", prefix))?.as_uint()?;
        let cap_name = format!("{}.russianroulette.cap", prefix);
        let rr_importance_cap = cfg.get_or_default(&defaults, &cap_name)?.as_float()?;
        if !(rr_importance_cap > 0.0 && rr_importance_cap <= 1.0) {
            return Err(RenderEngineError::InvalidProperty {
                name: cap_name,
                reason: format!("must be in (0, 1], got {}", rr_importance_cap),
            });
        }
        Ok(Self { max_path_depth, rr_depth, rr_importance_cap })
    }

    pub fn to_properties(&self, prefix: &str) -> Properties {
        Properties::new()
            .with(Property::new(&format!("{}.maxdepth", prefix), self.max_path_depth))
            .with(Property::new(&format!("{}.russianroulette.depth", prefix), self.rr_depth))
            .with(Property::new(&format!("{}.russianroulette.cap", prefix), self.rr_importance_cap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_round_trip() {
        let params = PathDepthParams::from_properties("light", &Properties::new()).unwrap();
        assert_eq!(params, PathDepthParams::default());

        let custom = PathDepthParams { max_path_depth: 12, rr_depth: 1, rr_importance_cap: 0.125 };
        let props = custom.to_properties("path");
        assert_eq!(PathDepthParams::from_properties("path", &props).unwrap(), custom);
        // other prefix is not read
        assert_eq!(PathDepthParams::from_properties("light", &props).unwrap(), PathDepthParams::default());
    }

    #[test]
    fn test_invalid_cap() {
        let cfg = Properties::new().with(Property::new("light.russianroulette.cap", 0.0f64));
        assert!(PathDepthParams::from_properties("light", &cfg).is_err());
        let cfg = Properties::new().with(Property::new("light.maxdepth", -3));
        assert!(PathDepthParams::from_properties("light", &cfg).is_err());
    }
}
