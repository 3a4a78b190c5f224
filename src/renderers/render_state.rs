// Copyright @yucwang 2026

use crate::core::error::{RenderEngineError, Result};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What a render engine needs to carry on a previous run: its type and the
/// seed that run was started with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderState {
    engine_tag: String,
    bootstrap_seed: u32,
}

impl RenderState {
    pub fn new(engine_tag: &str, bootstrap_seed: u32) -> Self {
        Self { engine_tag: engine_tag.to_string(), bootstrap_seed }
    }

    pub fn engine_tag(&self) -> &str {
        &self.engine_tag
    }

    pub fn bootstrap_seed(&self) -> u32 {
        self.bootstrap_seed
    }

    pub fn check_engine_tag(&self, expected: &str) -> Result<()> {
        if self.engine_tag != expected {
            return Err(RenderEngineError::RenderStateTypeMismatch {
                expected: expected.to_string(),
                found: self.engine_tag.clone(),
            });
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<RenderState> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        log::info!("Render state saved to: {}.", path.display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<RenderState> {
        let path = path.as_ref();
        log::info!("Loading render state from: {}.", path.display());
        RenderState::from_json(&fs::read_to_string(path)?)
    }
}
