/* Copyright 2020 @TwoCookingMice */

use crate::core::error::{RenderEngineError, Result};
use crate::film::FilmImage;

use exr::prelude::*;
use std::path::Path;

// Write the linear radiance of a film image to an EXR file
pub fn write_exr_to_file<P: AsRef<Path>>(image: &FilmImage, file_path: P) -> Result<()> {
    let file_path = file_path.as_ref();
    let width = image.width();
    let height = image.height();
    if image.pixels.len() != width * height {
        return Err(RenderEngineError::Image(format!(
            "image has {} pixels, expected {}x{}", image.pixels.len(), width, height
        )));
    }
    log::info!("Starting writing openexr images: {}.", file_path.display());

    write_rgb_file(file_path, width, height, |x, y| {
        let pixel = &image.pixels[y * width + x];
        (pixel[0], pixel[1], pixel[2])
    })?;
    log::info!("EXR written to: {}.", file_path.display());
    Ok(())
}
