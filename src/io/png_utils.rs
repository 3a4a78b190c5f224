// Copyright @yucwang 2026

use crate::core::error::Result;
use crate::film::FilmImage;

use image::{ImageBuffer, Rgb};
use std::path::Path;

fn to_byte(v: f32) -> u8 {
    if !(v > 0.0) {
        return 0;
    }
    (v.min(1.0) * 255.0 + 0.5) as u8
}

/// Writes an already tone mapped image, values are clamped to [0, 1].
pub fn write_png_to_file<P: AsRef<Path>>(image: &FilmImage, file_path: P) -> Result<()> {
    let file_path = file_path.as_ref();
    let width = image.width();
    let buffer = ImageBuffer::from_fn(width as u32, image.height() as u32, |x, y| {
        let pixel = &image.pixels[y as usize * width + x as usize];
        Rgb([to_byte(pixel[0]), to_byte(pixel[1]), to_byte(pixel[2])])
    });
    buffer.save(file_path)?;
    log::info!("PNG written to: {}.", file_path.display());
    Ok(())
}
