#![warn(missing_docs)]
//! # collager-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `collager` workspace.
//!
//! ## Responsibilities
//! - Represent geometry primitives ([`Size`], [`Point`], [`Rect`]).
//! - Represent the collage [`Shape`] and its padding/diameter constants.
//! - Wrap decoded pixels as identity-carrying [`SourceImage`] values.
//! - Hold the row-major [`ImageMatrix`] produced by the partitioner.
//!
//! ## Data flow
//! Image sources emit [`SourceImage`] values. The layout crate sorts and
//! buckets them into an [`ImageMatrix`], which the compositor walks cell by
//! cell.
//!
//! ## Ownership and lifetimes
//! Pixel buffers live behind an `Arc`, so cloning a [`SourceImage`] shares the
//! same allocation. Identity comparisons use that allocation, never the pixel
//! contents.
//!
//! ## Error model
//! Buffer shape and parsing failures return [`CoreError`] variants.
//!
//! ## Example
//! ```rust
//! use collager_core::{Shape, SourceImage};
//!
//! let image = SourceImage::from_rgba("red", 2, 1, vec![255, 0, 0, 255, 255, 0, 0, 255]).unwrap();
//! assert_eq!(image.width(), 2);
//! assert_eq!("circle".parse::<Shape>().unwrap().padding(), 20);
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use image::{DynamicImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Gap in pixels between rectangle cells and around the canvas edge.
pub const RECTANGLE_PADDING: u32 = 1;

/// Gap in pixels between circle cells and around the canvas edge.
pub const CIRCLE_PADDING: u32 = 20;

/// Fraction of `min(width, height)` kept as the circle crop diameter.
pub const CIRCLE_DIAMETER_FACTOR: f64 = 0.8;

/// Rendered width/height of one placed image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Creates a size value.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` when either axis is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Square crop used by circle cells: `trunc(min(w, h) * 0.8)` on both axes.
    pub fn circle_crop(&self) -> Self {
        let diameter = (f64::from(self.width.min(self.height)) * CIRCLE_DIAMETER_FACTOR) as u32;
        Self::new(diameter, diameter)
    }
}

/// Top-left placement offset in canvas coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset.
    pub x: i32,
    /// Vertical offset.
    pub y: i32,
}

impl Point {
    /// Creates a point value.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle with a top-left origin and a size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub origin: Point,
    /// Extent from the origin.
    pub size: Size,
}

impl Rect {
    /// Creates a rectangle from origin and size.
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        i64::from(self.origin.x) + i64::from(self.size.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        i64::from(self.origin.y) + i64::from(self.size.height)
    }

    /// Returns `true` when `(x, y)` lies inside the rectangle.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= i64::from(self.origin.x)
            && x < self.right()
            && y >= i64::from(self.origin.y)
            && y < self.bottom()
    }

    /// Returns `true` when both rectangles share at least one pixel.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.size.is_empty() || other.size.is_empty() {
            return false;
        }

        i64::from(self.origin.x) < other.right()
            && i64::from(other.origin.x) < self.right()
            && i64::from(self.origin.y) < other.bottom()
            && i64::from(other.origin.y) < self.bottom()
    }

    /// Returns `true` when `other` lies fully inside `self`.
    pub fn encloses(&self, other: &Rect) -> bool {
        other.origin.x >= self.origin.x
            && other.origin.y >= self.origin.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Rendering mode applied to every cell of one collage build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    /// Full rectangle, drawn opaquely.
    Rectangle,
    /// Circle crop, blended over the background.
    Circle,
}

impl Shape {
    /// Returns the padding gap for this shape.
    pub const fn padding(self) -> u32 {
        match self {
            Shape::Rectangle => RECTANGLE_PADDING,
            Shape::Circle => CIRCLE_PADDING,
        }
    }

    /// Maps a scaled image size to the size this shape actually occupies.
    pub fn footprint(self, scaled: Size) -> Size {
        match self {
            Shape::Rectangle => scaled,
            Shape::Circle => scaled.circle_crop(),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Rectangle => f.write_str("Rectangle"),
            Shape::Circle => f.write_str("Circle"),
        }
    }
}

impl FromStr for Shape {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rectangle" => Ok(Shape::Rectangle),
            "circle" => Ok(Shape::Circle),
            _ => Err(CoreError::InvalidShape(raw.to_string())),
        }
    }
}

/// Decoded, immutable source image shared by every consumer of one build.
///
/// Clones share the pixel allocation; [`SourceImage::same_image`] compares
/// that allocation rather than pixel values.
#[derive(Debug, Clone)]
pub struct SourceImage {
    label: Arc<str>,
    pixels: Arc<RgbaImage>,
}

impl SourceImage {
    /// Wraps an already-decoded RGBA buffer.
    pub fn new(label: impl Into<String>, pixels: RgbaImage) -> Self {
        Self {
            label: Arc::from(label.into()),
            pixels: Arc::new(pixels),
        }
    }

    /// Converts any decoded image into RGBA8 and wraps it.
    pub fn from_dynamic(label: impl Into<String>, image: DynamicImage) -> Self {
        Self::new(label, image.into_rgba8())
    }

    /// Constructs an image from raw RGBA bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidPixelBuffer`] when the buffer length is not
    /// exactly `width * height * 4`.
    pub fn from_rgba(
        label: impl Into<String>,
        width: u32,
        height: u32,
        rgba: Vec<u8>,
    ) -> Result<Self, CoreError> {
        let expected = required_rgba_len(width, height)?;
        let actual = rgba.len();
        let pixels = RgbaImage::from_raw(width, height, rgba)
            .filter(|_| actual == expected)
            .ok_or(CoreError::InvalidPixelBuffer { expected, actual })?;
        Ok(Self::new(label, pixels))
    }

    /// Creates an image filled with one color.
    pub fn solid(label: impl Into<String>, width: u32, height: u32, color: [u8; 4]) -> Self {
        Self::new(label, RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    /// Origin label (usually the file path).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Source width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Source height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Source dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Reads one pixel, or `None` outside the image bounds.
    pub fn pixel_at(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.pixels.get_pixel_checked(x, y).copied()
    }

    /// Borrows the underlying RGBA buffer.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Returns `true` when both values share the same pixel allocation.
    pub fn same_image(&self, other: &SourceImage) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

/// Row-major arrangement of source images.
///
/// Rows keep the order the partitioner assigned; nothing mutates the matrix
/// once built.
#[derive(Debug, Clone, Default)]
pub struct ImageMatrix {
    rows: Vec<Vec<SourceImage>>,
}

impl ImageMatrix {
    /// Wraps pre-bucketed rows.
    pub fn from_rows(rows: Vec<Vec<SourceImage>>) -> Self {
        Self { rows }
    }

    /// Borrows all rows.
    pub fn rows(&self) -> &[Vec<SourceImage>] {
        &self.rows
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column count of the widest row.
    pub fn max_columns(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Column count per row, top to bottom.
    pub fn columns_per_row(&self) -> Vec<usize> {
        self.rows.iter().map(Vec::len).collect()
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Returns `true` when the matrix holds no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the image at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Option<&SourceImage> {
        self.rows.get(row).and_then(|cells| cells.get(col))
    }

    /// Iterates `(row, col, image)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &SourceImage)> {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, image)| (row, col, image))
        })
    }

    /// Finds an image by identity.
    pub fn position_of(&self, image: &SourceImage) -> Option<(usize, usize)> {
        self.cells()
            .find(|(_, _, candidate)| candidate.same_image(image))
            .map(|(row, col, _)| (row, col))
    }
}

/// Error type for core model validation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Shape name is neither `Rectangle` nor `Circle`.
    #[error("invalid shape `{0}`: expected Rectangle or Circle")]
    InvalidShape(String),
    /// Pixel buffer does not match declared geometry.
    #[error("invalid pixel buffer: expected {expected} bytes, got {actual}")]
    InvalidPixelBuffer {
        /// Expected RGBA byte count.
        expected: usize,
        /// Actual RGBA byte count.
        actual: usize,
    },
    /// Declared dimensions overflow addressable memory.
    #[error("image dimensions overflow")]
    DimensionOverflow,
}

/// Returns the RGBA byte count for `width x height`.
///
/// # Errors
/// Returns [`CoreError::DimensionOverflow`] on arithmetic overflow.
pub fn required_rgba_len(width: u32, height: u32) -> Result<usize, CoreError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or(CoreError::DimensionOverflow)
}

#[cfg(test)]
mod tests {
    //! Unit tests for geometry and identity semantics.

    use super::*;

    #[test]
    fn circle_crop_truncates_shorter_side() {
        assert_eq!(Size::new(100, 50).circle_crop(), Size::new(40, 40));
        assert_eq!(Size::new(7, 9).circle_crop(), Size::new(5, 5));
    }

    #[test]
    fn clones_share_identity_but_equal_pixels_do_not() {
        let first = SourceImage::solid("a", 2, 2, [1, 2, 3, 255]);
        let clone = first.clone();
        let twin = SourceImage::solid("a", 2, 2, [1, 2, 3, 255]);

        assert!(first.same_image(&clone));
        assert!(!first.same_image(&twin));
    }

    #[test]
    fn rect_intersection_ignores_touching_edges() {
        let left = Rect::new(Point::new(0, 0), Size::new(10, 10));
        let touching = Rect::new(Point::new(10, 0), Size::new(10, 10));
        let overlapping = Rect::new(Point::new(9, 9), Size::new(2, 2));

        assert!(!left.intersects(&touching));
        assert!(left.intersects(&overlapping));
    }

    #[test]
    fn shape_parses_case_insensitively() {
        assert_eq!("Rectangle".parse::<Shape>().unwrap(), Shape::Rectangle);
        assert_eq!(" CIRCLE ".parse::<Shape>().unwrap(), Shape::Circle);
        assert!("hexagon".parse::<Shape>().is_err());
    }
}
