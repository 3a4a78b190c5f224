// Copyright @yucwang 2026

use crate::core::error::Result;
use crate::film::FilmState;
use crate::renderers::render_state::RenderState;

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Everything needed to continue a render in a later process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeFile {
    pub render_state: RenderState,
    pub film: FilmState,
}

impl ResumeFile {
    pub fn new(render_state: RenderState, film: FilmState) -> Self {
        Self { render_state, film }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        log::info!(
            "Saved {} render state (seed {}) to: {}.",
            self.render_state.engine_tag(),
            self.render_state.bootstrap_seed(),
            path.display()
        );
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<ResumeFile> {
        let path = path.as_ref();
        log::info!("Loading resume file: {}.", path.display());
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
