// Copyright @yucwang 2026

use crate::core::properties::Properties;
use crate::core::scene::Scene;
use std::sync::Arc;

/// Read-only input of a render engine: the scene plus the property bag.
#[derive(Clone)]
pub struct RenderConfig {
    pub scene: Arc<Scene>,
    pub cfg: Properties,
}

impl RenderConfig {
    pub fn new(scene: Arc<Scene>, cfg: Properties) -> Self {
        Self { scene, cfg }
    }
}
