#![warn(missing_docs)]
//! # collager-compose
//!
//! ## Purpose
//! Renders a planned collage onto one shared RGBA canvas.
//!
//! ## Responsibilities
//! - Own the canvas pixel buffer and hand out disjoint write regions.
//! - Resample each cell and draw it opaquely (rectangles) or squashed into a
//!   square tile and blended through a circular mask (circles).
//! - Run one task per cell serially, on a joined worker pool, or detached.
//!
//! ## Data flow
//! [`collager_layout::LayoutPlan`] -> region claims -> cell tasks ->
//! [`Canvas`] wrapped in a [`CanvasHandle`].
//!
//! ## Ownership and lifetimes
//! Tasks own an `Arc`-backed [`CanvasRegion`], a cloned image handle and the
//! shared resampler, so worker threads borrow nothing from the caller and a
//! detached build can outlive the call that started it.
//!
//! ## Concurrency model
//! The pixel buffer is never locked. Pixels are relaxed atomics and every task
//! writes only inside its claimed rectangle; claims are checked for overlap
//! before any task starts. [`DrawMode::Detached`] returns before drawing
//! finishes, so its pixels are only trustworthy after [`CanvasHandle::wait`].
//!
//! ## Error model
//! Layout failures, overlapping or out-of-bounds claims and thread spawn
//! failures surface as [`ComposeError`]. Drawing itself cannot fail.

mod canvas;
mod draw;
mod driver;
mod mask;
mod resample;

use collager_core::Rect;
use collager_layout::LayoutError;
use thiserror::Error;

pub use canvas::{Canvas, CanvasRegion, Surface, SurfaceMut};
pub use draw::{blend_over, circle_tile, draw_cell, draw_masked_over, draw_opaque};
pub use driver::{CanvasHandle, ComposeOptions, DrawMode, composite, draw_plan, run_composite};
pub use mask::CircleMask;
pub use resample::{FilterResampler, Resampler};

/// Error type for canvas allocation and cell dispatch.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Layout could not be planned.
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
    /// A claimed region shares pixels with an earlier claim.
    #[error("region {rect:?} overlaps claimed region {existing:?}")]
    RegionOverlap {
        /// Rejected rectangle.
        rect: Rect,
        /// Earlier claim it collides with.
        existing: Rect,
    },
    /// A claimed region extends past the canvas.
    #[error("region {rect:?} is outside the canvas")]
    RegionOutOfBounds {
        /// Rejected rectangle.
        rect: Rect,
    },
    /// Region bookkeeping was poisoned by a panicking claimer.
    #[error("canvas region claims are poisoned")]
    ClaimsPoisoned,
    /// Canvas dimensions overflow addressable memory.
    #[error("canvas dimensions overflow")]
    CanvasOverflow,
    /// No drawing worker could be started.
    #[error("failed to spawn draw worker: {0}")]
    WorkerSpawn(String),
    /// Draw mode name is unknown.
    #[error("invalid draw mode `{0}`: expected serial, joined or detached")]
    InvalidDrawMode(String),
}
