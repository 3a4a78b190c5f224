// Copyright @yucwang 2026

use super::render_state::RenderState;
use crate::core::error::Result;
use crate::core::properties::Properties;
use crate::film::{Film, FilmImage};

use std::sync::Arc;

/// A progressive render engine. Engines are created through the registry from
/// a render configuration, then driven by `init_film`, `start` and `stop`.
pub trait RenderEngine: Send {
    fn tag(&self) -> &'static str;

    fn film(&self) -> &Arc<Film>;

    /// Declares the film channels. Must run once, before the first `start`.
    fn init_film(&mut self) -> Result<()>;

    fn start(&mut self) -> Result<()>;

    /// Blocks until every render thread has quit.
    fn stop(&mut self);

    fn is_started(&self) -> bool;

    fn render_state(&self) -> RenderState;

    /// State consumed by the next `start`.
    fn set_start_render_state(&mut self, state: RenderState);

    /// Effective configuration of the engine, defaults included.
    fn to_properties(&self) -> Result<Properties>;

    fn update_film(&self) -> Result<FilmImage>;

    fn discarded_path_count(&self) -> u64 {
        self.film().discarded_sample_count()
    }
}
