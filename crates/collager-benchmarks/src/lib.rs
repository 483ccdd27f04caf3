//! Fixture generators shared by the collager smoke benchmarks.

use collager_core::SourceImage;
use image::{Rgba, RgbaImage};

/// Builds `count` images with varied aspect ratios and no alpha.
pub fn benchmark_images(count: usize, max_side: u32) -> Vec<SourceImage> {
    let max_side = max_side.max(2);
    (0..count)
        .map(|index| {
            let width = 1 + (index as u32 * 97) % max_side;
            let height = 1 + (index as u32 * 61 + 17) % max_side;
            let shade = (index % 251) as u8;
            SourceImage::new(
                format!("bench-{index}"),
                RgbaImage::from_pixel(width, height, Rgba([shade, shade / 2, 255 - shade, 255])),
            )
        })
        .collect()
}
