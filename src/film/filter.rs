// Copyright @yucwang 2026

use crate::core::error::{RenderEngineError, Result};
use crate::core::properties::{Properties, Property};
use crate::math::constants::{Float, PI};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterType {
    Box,
    Gaussian { alpha: Float },
    Mitchell { b: Float, c: Float },
    BlackmanHarris,
}

impl FilterType {
    pub fn tag(&self) -> &'static str {
        match self {
            FilterType::Box => "BOX",
            FilterType::Gaussian { .. } => "GAUSSIAN",
            FilterType::Mitchell { .. } => "MITCHELL",
            FilterType::BlackmanHarris => "BLACKMANHARRIS",
        }
    }
}

/// Separable reconstruction filter with the same radius on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Filter {
    filter_type: FilterType,
    width: Float,
}

impl Filter {
    pub fn new(filter_type: FilterType, width: Float) -> Self {
        Self { filter_type, width }
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn width(&self) -> Float {
        self.width
    }

    /// Reads `film.filter.*`; the NONE filter yields `None`.
    pub fn from_properties(cfg: &Properties) -> Result<Option<Filter>> {
        let defaults = default_props();
        let tag = cfg.get_or_default(&defaults, "film.filter.type")?.as_string();
        let width = cfg.get_or_default(&defaults, "film.filter.width")?.as_float()?;
        if !(width > 0.0) {
            return Err(RenderEngineError::InvalidProperty {
                name: String::from("film.filter.width"),
                reason: format!("filter width must be positive, got {}", width),
            });
        }

        let filter_type = match tag.to_uppercase().as_str() {
            "NONE" => return Ok(None),
            "BOX" => FilterType::Box,
            "GAUSSIAN" => FilterType::Gaussian {
                alpha: cfg.get_or_default(&defaults, "film.filter.gaussian.alpha")?.as_float()?,
            },
            "MITCHELL" => FilterType::Mitchell {
                b: cfg.get_or_default(&defaults, "film.filter.mitchell.b")?.as_float()?,
                c: cfg.get_or_default(&defaults, "film.filter.mitchell.c")?.as_float()?,
            },
            "BLACKMANHARRIS" => FilterType::BlackmanHarris,
            _ => {
                return Err(RenderEngineError::InvalidProperty {
                    name: String::from("film.filter.type"),
                    reason: format!("unknown filter type: {}", tag),
                })
            }
        };
        Ok(Some(Filter::new(filter_type, width)))
    }

    pub fn evaluate(&self, x: Float, y: Float) -> Float {
        self.evaluate_1d(x) * self.evaluate_1d(y)
    }

    fn evaluate_1d(&self, x: Float) -> Float {
        let x = x.abs();
        if x > self.width {
            return 0.0;
        }
        match self.filter_type {
            FilterType::Box => 1.0,
            FilterType::Gaussian { alpha } => {
                ((-alpha * x * x).exp() - (-alpha * self.width * self.width).exp()).max(0.0)
            }
            FilterType::Mitchell { b, c } => mitchell_1d(x / self.width, b, c),
            FilterType::BlackmanHarris => {
                const A0: Float = 0.35875;
                const A1: Float = -0.48829;
                const A2: Float = 0.14128;
                const A3: Float = -0.01168;
                let t = (x / self.width + 1.0) * 0.5 * PI;
                A0 + A1 * (2.0 * t).cos() + A2 * (4.0 * t).cos() + A3 * (6.0 * t).cos()
            }
        }
    }
}

fn mitchell_1d(x: Float, b: Float, c: Float) -> Float {
    let x = (2.0 * x).abs();
    if x > 1.0 {
        ((-b - 6.0 * c) * x * x * x + (6.0 * b + 30.0 * c) * x * x
            + (-12.0 * b - 48.0 * c) * x + (8.0 * b + 24.0 * c)) * (1.0 / 6.0)
    } else {
        ((12.0 - 9.0 * b - 6.0 * c) * x * x * x + (-18.0 + 12.0 * b + 6.0 * c) * x * x
            + (6.0 - 2.0 * b)) * (1.0 / 6.0)
    }
}

pub fn default_props() -> Properties {
    Properties::new()
        .with(Property::new("film.filter.type", "BLACKMANHARRIS"))
        .with(Property::new("film.filter.width", 1.5f64))
        .with(Property::new("film.filter.gaussian.alpha", 2.0f64))
        .with(Property::new("film.filter.mitchell.b", 1.0f64 / 3.0))
        .with(Property::new("film.filter.mitchell.c", 1.0f64 / 3.0))
}

pub fn to_properties(cfg: &Properties) -> Result<Properties> {
    let defaults = default_props();
    let mut props = Properties::new();
    for name in defaults.names() {
        props.set(cfg.get_or_default(&defaults, name)?);
    }
    Ok(props)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_blackman_harris() {
        let filter = Filter::from_properties(&Properties::new()).unwrap().unwrap();
        assert_eq!(filter.filter_type(), FilterType::BlackmanHarris);
        assert!((filter.width() - 1.5).abs() < 1e-6);
        // peak at the center, zero at the border
        assert!((filter.evaluate(0.0, 0.0) - 1.0).abs() < 1e-3);
        assert!(filter.evaluate(1.5, 0.0).abs() < 1e-3);
        assert_eq!(filter.evaluate(1.6, 0.0), 0.0);
    }

    #[test]
    fn test_none_and_unknown_filter() {
        let none = Properties::new().with(Property::new("film.filter.type", "NONE"));
        assert!(Filter::from_properties(&none).unwrap().is_none());

        let unknown = Properties::new().with(Property::new("film.filter.type", "SINC"));
        assert!(Filter::from_properties(&unknown).is_err());

        let bad_width = Properties::new().with(Property::new("film.filter.width", 0.0f64));
        assert!(Filter::from_properties(&bad_width).is_err());
    }

    #[test]
    fn test_filter_shapes() {
        let gaussian = Filter::new(FilterType::Gaussian { alpha: 2.0 }, 2.0);
        assert!(gaussian.evaluate(0.0, 0.0) > gaussian.evaluate(1.0, 0.0));
        assert_eq!(gaussian.evaluate(2.0, 0.0), 0.0);

        let mitchell = Filter::new(FilterType::Mitchell { b: 1.0 / 3.0, c: 1.0 / 3.0 }, 2.0);
        assert!((mitchell.evaluate_1d(0.0) - 8.0 / 9.0).abs() < 1e-5);

        let boxed = Filter::new(FilterType::Box, 0.5);
        assert_eq!(boxed.evaluate(0.4, -0.4), 1.0);
        assert_eq!(boxed.evaluate(0.6, 0.0), 0.0);
    }

    #[test]
    fn test_to_properties_fills_defaults() {
        let cfg = Properties::new().with(Property::new("film.filter.type", "GAUSSIAN"));
        let props = to_properties(&cfg).unwrap();
        assert_eq!(props.get("film.filter.type").unwrap().as_string(), "GAUSSIAN");
        assert!(props.is_defined("film.filter.mitchell.c"));
        assert_eq!(
            Filter::from_properties(&props).unwrap(),
            Filter::from_properties(&cfg).unwrap()
        );
    }
}
