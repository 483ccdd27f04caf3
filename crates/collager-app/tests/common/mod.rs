//! Shared fixtures for app integration tests.

use std::sync::Arc;

use collager_app::{CollageOutput, CollageRequest, build_collage};
use collager_compose::{ComposeOptions, DrawMode, FilterResampler};
use collager_core::{Shape, SourceImage};
use collager_source::{ImageSource, InMemoryImageSource};

/// Creates a deterministic 10-image fixture.
#[allow(dead_code)]
pub fn fixture_images() -> Vec<SourceImage> {
    InMemoryImageSource::synthetic(10)
        .load()
        .expect("synthetic images should load")
}

/// Creates a validated request for the fixture set.
#[allow(dead_code)]
pub fn fixture_request(shape: Shape, mode: DrawMode) -> CollageRequest {
    CollageRequest::new(shape, 3, 600, 400, "fixtures")
        .expect("fixture request should be valid")
        .with_options(ComposeOptions { mode, workers: 2 })
}

/// Builds the fixture collage.
#[allow(dead_code)]
pub fn fixture_output(shape: Shape, mode: DrawMode) -> CollageOutput {
    build_collage(
        &fixture_request(shape, mode),
        &fixture_images(),
        Arc::new(FilterResampler::nearest()),
    )
    .expect("fixture collage should build")
}
