// Copyright @yucwang 2026

pub mod cpu_no_tile;
pub mod light_cpu;
pub mod path_cpu;
pub mod registry;
pub mod render_state;
pub mod renderer;
