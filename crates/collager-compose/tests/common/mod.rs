//! Shared fixtures for compositing tests.

use collager_core::SourceImage;
use image::{Rgba, RgbaImage};

/// Creates an opaque single-color image.
#[allow(dead_code)]
pub fn solid(label: &str, width: u32, height: u32, color: [u8; 3]) -> SourceImage {
    SourceImage::solid(label, width, height, [color[0], color[1], color[2], 255])
}

/// Creates an opaque gradient image so resampling has real work to do.
#[allow(dead_code)]
pub fn gradient(index: u8, width: u32, height: u32) -> SourceImage {
    let pixels = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 7) as u8, (y * 5) as u8, index.wrapping_mul(37), 255])
    });
    SourceImage::new(format!("gradient-{index}"), pixels)
}
