// Copyright 2020 TwoCookingMice

use madeleine::core::error::{RenderEngineError, Result};
use madeleine::core::properties::Properties;
use madeleine::core::render_config::RenderConfig;
use madeleine::film::imagepipeline::ImagePipeline;
use madeleine::io::exr_utils::write_exr_to_file;
use madeleine::io::png_utils::write_png_to_file;
use madeleine::io::resume::ResumeFile;
use madeleine::renderers::cpu_no_tile;
use madeleine::renderers::registry::RenderEngineRegistry;
use madeleine::renderers::renderer::RenderEngine;
use madeleine::scenes::cornell_box;

use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const FALLBACK_HALT_SPP: f64 = 16.0;

struct Args {
    config_path: String,
    output_path: String,
    resume_path: Option<String>,
    save_state_path: Option<String>,
}

fn parse_args(args: &[String]) -> Option<Args> {
    if args.len() < 3 {
        return None;
    }
    let mut parsed = Args {
        config_path: args[1].clone(),
        output_path: args[2].clone(),
        resume_path: None,
        save_state_path: None,
    };

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--resume" => {
                i += 1;
                parsed.resume_path = Some(args.get(i)?.clone());
            }
            "--save-state" => {
                i += 1;
                parsed.save_state_path = Some(args.get(i)?.clone());
            }
            other => {
                log::warn!("Ignoring unknown argument: {}.", other);
            }
        }
        i += 1;
    }
    Some(parsed)
}

struct HaltConditions {
    time: Option<Duration>,
    spp: Option<f64>,
}

impl HaltConditions {
    fn from_properties(cfg: &Properties) -> Result<Self> {
        let defaults = cpu_no_tile::default_props();
        let seconds = cfg.get_or_default(&defaults, "batch.halttime")?.as_float()?;
        let spp = cfg.get_or_default(&defaults, "batch.haltspp")?.as_float()?;
        let mut halt = HaltConditions {
            time: if seconds > 0.0 { Some(Duration::from_secs_f32(seconds)) } else { None },
            spp: if spp > 0.0 { Some(spp as f64) } else { None },
        };
        if halt.time.is_none() && halt.spp.is_none() {
            log::warn!("No halt condition set, stopping at {} samples per pixel.", FALLBACK_HALT_SPP);
            halt.spp = Some(FALLBACK_HALT_SPP);
        }
        Ok(halt)
    }
}

fn render_until_halt(engine: &dyn RenderEngine, halt: &HaltConditions) {
    let progress = match halt.spp {
        Some(spp) => ProgressBar::new((spp * 100.0) as u64),
        None => ProgressBar::new(halt.time.map(|t| t.as_millis() as u64).unwrap_or(0)),
    };
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {percent}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let start = Instant::now();
    loop {
        thread::sleep(Duration::from_millis(100));
        let spp = engine.film().samples_per_pixel();
        let elapsed = start.elapsed();
        match halt.spp {
            Some(_) => progress.set_position((spp * 100.0) as u64),
            None => progress.set_position(elapsed.as_millis() as u64),
        }
        progress.set_message(format!("{:.2} spp", spp));

        let spp_reached = halt.spp.map(|target| spp >= target).unwrap_or(false);
        let time_reached = halt.time.map(|limit| elapsed >= limit).unwrap_or(false);
        if spp_reached || time_reached {
            break;
        }
    }
    progress.finish_and_clear();
}

fn run(args: &Args) -> Result<()> {
    let cfg = Properties::load(&args.config_path)?;
    let scene = cornell_box(&cfg)?;
    let registry = RenderEngineRegistry::default();
    let mut engine = registry.create(RenderConfig::new(Arc::new(scene), cfg.clone()))?;
    log::info!("Render configuration:\n{}", engine.to_properties()?);

    engine.init_film()?;
    if let Some(resume_path) = &args.resume_path {
        let resume = ResumeFile::load(resume_path)?;
        engine.film().restore(&resume.film)?;
        engine.set_start_render_state(resume.render_state);
    }

    let halt = HaltConditions::from_properties(&cfg)?;
    engine.start()?;
    render_until_halt(engine.as_ref(), &halt);
    engine.stop();

    let discarded = engine.discarded_path_count();
    if discarded > 0 {
        log::warn!("{} samples were discarded because of NaN or infinite radiance.", discarded);
    }

    let image = engine.update_film()?;
    write_exr_to_file(&image, &args.output_path)?;
    let mut tone_mapped = image;
    ImagePipeline::from_properties(&cfg)?.apply(&mut tone_mapped);
    write_png_to_file(&tone_mapped, Path::new(&args.output_path).with_extension("png"))?;

    if let Some(save_path) = &args.save_state_path {
        let film_state = engine.film().state()?;
        ResumeFile::new(engine.render_state(), film_state).save(save_path)?;
    }
    Ok(())
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let parsed = match parse_args(&args) {
        Some(parsed) => parsed,
        None => {
            eprintln!("Usage: {} <render.cfg> <output.exr> [--resume <state.json>] [--save-state <state.json>]", args[0]);
            std::process::exit(1);
        }
    };

    if let Err(err) = run(&parsed) {
        log::error!("Rendering failed: {}.", err);
        if let RenderEngineError::Io(_) = err {
            std::process::exit(2);
        }
        std::process::exit(1);
    }
}
