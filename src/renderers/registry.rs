// Copyright @yucwang 2026

use super::light_cpu::{LightCpuRenderEngine, LIGHTCPU_TAG};
use super::path_cpu::{PathCpuRenderEngine, PATHCPU_TAG};
use super::renderer::RenderEngine;
use crate::core::error::{RenderEngineError, Result};
use crate::core::properties::{Properties, Property};
use crate::core::render_config::RenderConfig;

use std::collections::HashMap;

pub const DEFAULT_ENGINE_TAG: &str = PATHCPU_TAG;

/// Entry points of one engine type.
#[derive(Clone, Copy)]
pub struct RenderEngineEntry {
    pub tag: &'static str,
    pub to_properties: fn(&Properties) -> Result<Properties>,
    pub from_config: fn(RenderConfig) -> Result<Box<dyn RenderEngine>>,
    pub default_props: fn() -> Properties,
}

/// Engine types by tag, selected through `renderengine.type`.
pub struct RenderEngineRegistry {
    entries: HashMap<&'static str, RenderEngineEntry>,
}

impl Default for RenderEngineRegistry {
    fn default() -> Self {
        let mut registry = RenderEngineRegistry::empty();
        registry.register(RenderEngineEntry {
            tag: LIGHTCPU_TAG,
            to_properties: LightCpuRenderEngine::to_properties,
            from_config: LightCpuRenderEngine::from_config,
            default_props: LightCpuRenderEngine::default_props,
        });
        registry.register(RenderEngineEntry {
            tag: PATHCPU_TAG,
            to_properties: PathCpuRenderEngine::to_properties,
            from_config: PathCpuRenderEngine::from_config,
            default_props: PathCpuRenderEngine::default_props,
        });
        registry
    }
}

impl RenderEngineRegistry {
    pub fn empty() -> Self {
        Self { entries: HashMap::new() }
    }

    pub fn register(&mut self, entry: RenderEngineEntry) {
        if self.entries.insert(entry.tag, entry).is_some() {
            log::warn!("Render engine {} registered twice, keeping the last one.", entry.tag);
        }
    }

    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<&'static str> = self.entries.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    pub fn get(&self, tag: &str) -> Result<&RenderEngineEntry> {
        self.entries.get(tag).ok_or_else(|| RenderEngineError::UnknownEngineType(tag.to_string()))
    }

    pub fn engine_tag(cfg: &Properties) -> String {
        let defaults = Properties::new().with(Property::new("renderengine.type", DEFAULT_ENGINE_TAG));
        cfg.get_or_default(&defaults, "renderengine.type")
            .map(|p| p.as_string())
            .unwrap_or_else(|_| DEFAULT_ENGINE_TAG.to_string())
    }

    pub fn create(&self, config: RenderConfig) -> Result<Box<dyn RenderEngine>> {
        let tag = RenderEngineRegistry::engine_tag(&config.cfg);
        let entry = self.get(&tag)?;
        log::info!("Creating render engine: {}.", entry.tag);
        (entry.from_config)(config)
    }

    pub fn to_properties(&self, cfg: &Properties) -> Result<Properties> {
        (self.get(&RenderEngineRegistry::engine_tag(cfg))?.to_properties)(cfg)
    }

    pub fn default_props(&self, tag: &str) -> Result<Properties> {
        Ok((self.get(tag)?.default_props)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::cornell_box;
    use std::sync::Arc;

    fn config(cfg: Properties) -> RenderConfig {
        let cfg = Properties::new()
            .with(Property::new("film.width", 8))
            .with(Property::new("film.height", 8))
            .merge(&cfg);
        RenderConfig::new(Arc::new(cornell_box(&cfg).unwrap()), cfg)
    }

    #[test]
    fn test_create_by_tag() {
        let registry = RenderEngineRegistry::default();
        assert_eq!(registry.tags(), vec![LIGHTCPU_TAG, PATHCPU_TAG]);

        let engine = registry.create(config(Properties::new())).unwrap();
        assert_eq!(engine.tag(), PATHCPU_TAG);

        let light = Properties::new().with(Property::new("renderengine.type", LIGHTCPU_TAG));
        let engine = registry.create(config(light)).unwrap();
        assert_eq!(engine.tag(), LIGHTCPU_TAG);
        assert_eq!(engine.render_state().bootstrap_seed(), 131);

        let unknown = Properties::new().with(Property::new("renderengine.type", "BIDIRCPU"));
        assert!(matches!(registry.create(config(unknown)), Err(RenderEngineError::UnknownEngineType(_))));
    }

    #[test]
    fn test_stereo_only_for_path_engine() {
        let registry = RenderEngineRegistry::default();
        let stereo = Properties::new().with(Property::new("scene.camera.type", "stereo"));
        assert!(registry.create(config(stereo.clone())).is_ok());
        let light = stereo.with(Property::new("renderengine.type", LIGHTCPU_TAG));
        assert!(matches!(
            registry.create(config(light)),
            Err(RenderEngineError::UnsupportedConfiguration(_))
        ));
    }

    #[test]
    fn test_properties_by_tag() {
        let registry = RenderEngineRegistry::default();
        for tag in registry.tags() {
            let defaults = registry.default_props(tag).unwrap();
            assert_eq!(RenderEngineRegistry::engine_tag(&defaults), tag);
            let props = registry.to_properties(&defaults).unwrap();
            assert_eq!(registry.to_properties(&props).unwrap(), props);
        }
        assert!(registry.default_props("NOPE").is_err());
    }
}
