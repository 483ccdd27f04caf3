//! Command-line surface for the `collager` binary.

use std::path::PathBuf;

use clap::Parser;
use collager_compose::DrawMode;
use collager_core::Shape;

/// Arrange every image under a directory into one collage.
#[derive(Parser, Debug)]
#[command(name = "collager", version = crate::APP_VERSION)]
pub struct Cli {
    /// Cell shape: Rectangle or Circle.
    pub shape: Shape,

    /// Number of rows.
    pub rows: usize,

    /// Target collage width in pixels.
    pub width: u32,

    /// Target collage height in pixels (accepted, currently unused by layout).
    pub height: u32,

    /// Directory searched recursively for images.
    pub directory: PathBuf,

    /// serial, joined or detached. Falls back to COLLAGER_DRAW_MODE, then joined.
    #[arg(long)]
    pub draw_mode: Option<DrawMode>,

    /// Draw worker threads; 0 uses available parallelism.
    #[arg(long, default_value_t = 0)]
    pub workers: usize,

    /// Write the JSON layout report here instead of stdout.
    #[arg(long)]
    pub report: Option<PathBuf>,
}
