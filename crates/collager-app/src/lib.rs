#![warn(missing_docs)]
//! # collager-app
//!
//! ## Purpose
//! Orchestrates image loading, layout, compositing and presentation for
//! `collager`.
//!
//! ## Responsibilities
//! - Validate build requests before anything is allocated.
//! - Resolve the draw mode from flags and the `COLLAGER_DRAW_MODE` env var.
//! - Run load -> partition -> plan -> draw and time each stage.
//! - Hand the canvas and its [`LayoutReport`] to a [`CollageDisplay`].
//!
//! ## Data flow
//! [`CollageRequest`] + [`ImageSource`] -> [`run`] -> [`CollageOutput`] ->
//! [`CollageDisplay::present`].
//!
//! ## Ownership and lifetimes
//! [`CollageOutput`] owns the matrix, plan and canvas handle, so presentation
//! can happen while detached draw workers are still running.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]; the binary prints them and
//! exits non-zero.

pub mod cli;
mod report;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use collager_compose::{
    Canvas, CanvasHandle, ComposeError, ComposeOptions, DrawMode, Resampler, draw_plan,
};
use collager_core::{CoreError, ImageMatrix, Shape, SourceImage};
use collager_layout::{LayoutError, LayoutPlan, partition};
use collager_source::{ImageSource, SourceError};
use log::{info, warn};
use thiserror::Error;

pub use report::{CellReport, LayoutReport, REPORT_SCHEMA_V1, ReportContext};

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("COLLAGER_VERSION");

/// Env var that selects the draw mode when no flag is given.
pub const DRAW_MODE_ENV: &str = "COLLAGER_DRAW_MODE";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Reads the draw mode from [`DRAW_MODE_ENV`].
///
/// Semantics:
/// - Unset => [`DrawMode::Joined`].
/// - `serial`, `joined`, `detached` (case-insensitive) => that mode.
/// - Any other value => [`DrawMode::Joined`], with a warning.
pub fn draw_mode_from_env() -> DrawMode {
    match std::env::var(DRAW_MODE_ENV) {
        Ok(value) => value.parse().unwrap_or_else(|error| {
            warn!("ignoring {DRAW_MODE_ENV}: {error}");
            DrawMode::default()
        }),
        Err(_) => DrawMode::default(),
    }
}

/// Validated parameters for one collage build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollageRequest {
    /// Cell shape.
    pub shape: Shape,
    /// Row count.
    pub rows: usize,
    /// Target collage width.
    pub target_width: u32,
    /// Target collage height; validated but unused by the layout.
    pub target_height: u32,
    /// Directory to load images from.
    pub source_dir: PathBuf,
    /// Driver settings.
    pub options: ComposeOptions,
}

impl CollageRequest {
    /// Creates a validated request with default driver settings.
    ///
    /// # Errors
    /// Returns [`AppError::Layout`] with [`LayoutError::InvalidLayout`] when
    /// rows, width or height is zero.
    pub fn new(
        shape: Shape,
        rows: usize,
        target_width: u32,
        target_height: u32,
        source_dir: impl Into<PathBuf>,
    ) -> Result<Self, AppError> {
        for (name, value) in [
            ("row count", rows as u64),
            ("target width", u64::from(target_width)),
            ("target height", u64::from(target_height)),
        ] {
            if value == 0 {
                return Err(AppError::Layout(LayoutError::InvalidLayout(format!(
                    "{name} must be greater than zero"
                ))));
            }
        }

        Ok(Self {
            shape,
            rows,
            target_width,
            target_height,
            source_dir: source_dir.into(),
            options: ComposeOptions::default(),
        })
    }

    /// Parses and validates raw positional arguments.
    ///
    /// # Errors
    /// Returns [`AppError::Core`] for an unknown shape,
    /// [`AppError::InvalidArgument`] for non-numeric values and the errors of
    /// [`CollageRequest::new`].
    pub fn from_args(
        shape: &str,
        rows: &str,
        width: &str,
        height: &str,
        source_dir: impl Into<PathBuf>,
    ) -> Result<Self, AppError> {
        let shape = shape.parse::<Shape>()?;
        let rows = parse_number::<usize>("rows", rows)?;
        let width = parse_number::<u32>("width", width)?;
        let height = parse_number::<u32>("height", height)?;
        Self::new(shape, rows, width, height, source_dir)
    }

    /// Replaces the driver settings.
    pub fn with_options(mut self, options: ComposeOptions) -> Self {
        self.options = options;
        self
    }

    fn report_context(&self) -> ReportContext {
        ReportContext {
            rows: self.rows,
            target_height: self.target_height,
            draw_mode: self.options.mode,
        }
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, AppError> {
    raw.trim().parse::<T>().map_err(|_| {
        AppError::InvalidArgument(format!("{name} must be a positive integer, got `{raw}`"))
    })
}

/// Everything one build produced.
#[derive(Debug, Clone)]
pub struct CollageOutput {
    /// Bucketed images.
    pub matrix: ImageMatrix,
    /// Resolved placements.
    pub plan: LayoutPlan,
    /// Canvas and draw completion state.
    pub handle: CanvasHandle,
    context: ReportContext,
}

impl CollageOutput {
    /// Snapshots the current layout and draw state.
    pub fn report(&self) -> LayoutReport {
        LayoutReport::capture(self.context, &self.matrix, &self.plan, &self.handle)
    }
}

/// Lays out and draws an already-loaded image set.
///
/// # Errors
/// Returns [`AppError::Layout`] for degenerate layouts and
/// [`AppError::Compose`] for drawing failures.
pub fn build_collage(
    request: &CollageRequest,
    images: &[SourceImage],
    resampler: Arc<dyn Resampler>,
) -> Result<CollageOutput, AppError> {
    let started = Instant::now();

    let layout = partition(images, request.rows, request.shape, request.target_width)?;
    let plan = LayoutPlan::build(&layout.matrix, request.shape, request.target_width)?;
    let size = plan.canvas_size()?;
    let handle = draw_plan(&layout.matrix, &plan, size, request.options, resampler)?;

    info!(
        "making image collage took {:?} ({} images, {}x{} canvas)",
        started.elapsed(),
        images.len(),
        size.width,
        size.height
    );

    Ok(CollageOutput {
        matrix: layout.matrix,
        plan,
        handle,
        context: request.report_context(),
    })
}

/// Loads images from `source` and builds the collage.
///
/// # Errors
/// Returns [`AppError::Source`] when loading fails, otherwise the errors of
/// [`build_collage`].
pub fn run(
    request: &CollageRequest,
    source: &dyn ImageSource,
    resampler: Arc<dyn Resampler>,
) -> Result<CollageOutput, AppError> {
    let started = Instant::now();
    let images = source.load()?;
    info!("{} images read in {:?}", images.len(), started.elapsed());

    build_collage(request, &images, resampler)
}

/// Consumer of one finished (or still drawing) canvas.
pub trait CollageDisplay {
    /// Presents the canvas alongside its layout report.
    ///
    /// # Errors
    /// Returns [`AppError`] when presentation fails.
    fn present(&mut self, canvas: &Canvas, report: &LayoutReport) -> Result<(), AppError>;
}

/// Display that writes the JSON layout report to any writer.
#[derive(Debug)]
pub struct ReportDisplay<W: Write> {
    writer: W,
}

impl<W: Write> ReportDisplay<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> CollageDisplay for ReportDisplay<W> {
    fn present(&mut self, canvas: &Canvas, report: &LayoutReport) -> Result<(), AppError> {
        if report.pending_cells > 0 {
            warn!(
                "presenting {}x{} canvas with {} cells still drawing",
                canvas.width(),
                canvas.height(),
                report.pending_cells
            );
        }
        let json = report.to_json_pretty()?;
        writeln!(self.writer, "{json}")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed command-line value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Core model error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    /// Layout computation error.
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
    /// Compositing error.
    #[error("compose error: {0}")]
    Compose(#[from] ComposeError),
    /// Image loading error.
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    /// Report encoding error.
    #[error("report error: {0}")]
    Report(#[from] serde_json::Error),
    /// Output I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
