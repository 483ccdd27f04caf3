//! Shared fixtures for layout integration tests.

use collager_core::SourceImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Creates a solid image whose red channel encodes `index`.
#[allow(dead_code)]
pub fn sized_image(index: usize, width: u32, height: u32) -> SourceImage {
    SourceImage::solid(
        format!("fixture-{index}"),
        width,
        height,
        [index as u8, 0, 0, 255],
    )
}

/// Creates `count` images with seeded random dimensions in `1..=max_side`.
#[allow(dead_code)]
pub fn random_images(seed: u64, count: usize, max_side: u32) -> Vec<SourceImage> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|index| {
            let width = rng.random_range(1..=max_side);
            let height = rng.random_range(1..=max_side);
            sized_image(index, width, height)
        })
        .collect()
}
