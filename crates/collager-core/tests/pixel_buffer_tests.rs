//! Tests raw RGBA buffer validation.

use collager_core::{CoreError, SourceImage};

#[test]
fn pixel_buffer_tests_rejects_short_and_long_buffers() {
    let short = SourceImage::from_rgba("short", 2, 2, vec![0; 15]);
    let long = SourceImage::from_rgba("long", 2, 2, vec![0; 17]);

    assert!(matches!(
        short,
        Err(CoreError::InvalidPixelBuffer { expected: 16, actual: 15 })
    ));
    assert!(matches!(
        long,
        Err(CoreError::InvalidPixelBuffer { expected: 16, actual: 17 })
    ));
}

#[test]
fn pixel_buffer_tests_reads_pixels_in_bounds_only() {
    let image = SourceImage::from_rgba("ok", 1, 1, vec![9, 8, 7, 6]).expect("buffer should fit");

    assert_eq!(image.pixel_at(0, 0).map(|pixel| pixel.0), Some([9, 8, 7, 6]));
    assert_eq!(image.pixel_at(1, 0), None);
}
