#![warn(missing_docs)]
//! # collager-layout
//!
//! ## Purpose
//! Computes where every source image lands on the collage canvas and how large
//! it is drawn.
//!
//! ## Responsibilities
//! - Sort and bucket images into an [`ImageMatrix`] ([`partition`]).
//! - Size the content area from row widths and positional column heights.
//! - Recompute one image's placement, by identity ([`locate`]) or by index
//!   ([`locate_cell`]).
//! - Precompute every placement once for the drivers ([`LayoutPlan`]).
//!
//! ## Data flow
//! Unordered images -> [`partition`] -> [`Partition`] -> [`LayoutPlan::build`]
//! -> compositor dispatch.
//!
//! ## Ownership and lifetimes
//! The matrix clones `Arc`-backed [`SourceImage`] handles, so layouts never
//! borrow from the caller's image list.
//!
//! ## Error model
//! Degenerate inputs (zero rows, zero width, empty rows) fail with
//! [`LayoutError::InvalidLayout`] before any canvas exists. Identity lookups of
//! foreign images fail with [`LayoutError::ImageNotFound`].
//!
//! ## Numeric model
//! All sizes go through [`rendered_size`]: the partitioner, the placement
//! calculator and the plan must agree to the pixel, so there is exactly one
//! implementation of the scale/truncate/circle-crop arithmetic.

use collager_core::{ImageMatrix, Point, Shape, Size, SourceImage};
use log::debug;
use thiserror::Error;

/// Result of bucketing one image set.
#[derive(Debug, Clone)]
pub struct Partition {
    /// Row-major image matrix, tallest images first.
    pub matrix: ImageMatrix,
    /// Widest row: sum of rendered widths, padding excluded.
    pub canvas_width: u32,
    /// Tallest positional column: sum of rendered heights, padding excluded.
    pub canvas_height: u32,
    /// Column count of the widest row.
    pub max_columns: usize,
}

/// Placement point and rendered size for one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Top-left canvas coordinate.
    pub point: Point,
    /// Size the image is drawn at (square for circles).
    pub size: Size,
}

/// One fully-resolved matrix cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedCell {
    /// Row index.
    pub row: usize,
    /// Column index within the row.
    pub col: usize,
    /// Top-left canvas coordinate.
    pub point: Point,
    /// Aspect-preserving size before any circle crop.
    pub scaled: Size,
    /// Drawn size (equals `scaled` for rectangles).
    pub size: Size,
}

impl PlacedCell {
    /// Placement view of this cell.
    pub fn placement(&self) -> Placement {
        Placement {
            point: self.point,
            size: self.size,
        }
    }
}

/// Splits `image_count` images over `rows`, front-loading the remainder.
///
/// # Errors
/// Returns [`LayoutError::InvalidLayout`] when `rows == 0` or `rows` exceeds
/// `image_count`, so no row is ever empty.
pub fn row_column_counts(image_count: usize, rows: usize) -> Result<Vec<usize>, LayoutError> {
    if rows == 0 {
        return Err(LayoutError::InvalidLayout(
            "row count must be greater than zero".to_string(),
        ));
    }

    if rows > image_count {
        return Err(LayoutError::InvalidLayout(format!(
            "{rows} rows would leave a row with no columns ({image_count} images)"
        )));
    }

    let base_columns = image_count / rows;
    let mut counts = Vec::with_capacity(rows);
    let mut assigned = 0usize;

    for row in 0..rows {
        let remaining = image_count - assigned;
        let mut columns = base_columns;
        if (rows - row) * base_columns < remaining {
            columns += 1;
        }

        counts.push(columns);
        assigned += columns;
    }

    Ok(counts)
}

/// Column width for a row holding `columns` cells.
///
/// # Errors
/// Returns [`LayoutError::InvalidLayout`] when the width floors to zero.
pub fn column_width(target_width: u32, columns: usize) -> Result<u32, LayoutError> {
    let columns = u32::try_from(columns)
        .ok()
        .filter(|columns| *columns > 0)
        .ok_or_else(|| LayoutError::InvalidLayout("row has no columns".to_string()))?;

    let width = target_width / columns;
    if width == 0 {
        return Err(LayoutError::InvalidLayout(format!(
            "target width {target_width} is narrower than {columns} columns"
        )));
    }
    Ok(width)
}

/// Uniformly scales `original` so its width matches `column_width`.
///
/// Both axes are truncated toward zero after scaling.
pub fn scaled_size(original: Size, column_width: u32) -> Size {
    let original_width = f64::from(original.width);
    let original_height = f64::from(original.height);
    let resize_factor = f64::from(column_width) / original_width;

    Size::new(
        (original_width * resize_factor) as u32,
        (original_height * resize_factor) as u32,
    )
}

/// Size `image` occupies in a row of width `column_width` for `shape`.
pub fn rendered_size(image: &SourceImage, column_width: u32, shape: Shape) -> Size {
    shape.footprint(scaled_size(image.size(), column_width))
}

/// Sorts, buckets and measures an unordered image set.
///
/// Images are ordered by height, tallest first. The sort is stable, but tie
/// order depends on input order and is not part of the contract.
///
/// # Errors
/// Returns [`LayoutError::InvalidLayout`] for zero rows, zero target width, an
/// empty image set, a zero-sized image, more rows than images, or a target
/// width narrower than a row's column count.
pub fn partition(
    images: &[SourceImage],
    rows: usize,
    shape: Shape,
    target_width: u32,
) -> Result<Partition, LayoutError> {
    if target_width == 0 {
        return Err(LayoutError::InvalidLayout(
            "target width must be greater than zero".to_string(),
        ));
    }
    if images.is_empty() {
        return Err(LayoutError::InvalidLayout("image set is empty".to_string()));
    }
    if let Some(image) = images.iter().find(|image| image.size().is_empty()) {
        return Err(LayoutError::InvalidLayout(format!(
            "image `{}` has zero width or height",
            image.label()
        )));
    }

    let counts = row_column_counts(images.len(), rows)?;

    let mut sorted = images.to_vec();
    sorted.sort_by(|left, right| right.height().cmp(&left.height()));

    let mut matrix_rows = Vec::with_capacity(rows);
    let mut remaining = sorted.into_iter();
    for columns in &counts {
        matrix_rows.push(remaining.by_ref().take(*columns).collect::<Vec<_>>());
    }
    let matrix = ImageMatrix::from_rows(matrix_rows);

    let (canvas_width, canvas_height) = measure(&matrix, shape, target_width)?;
    let max_columns = matrix.max_columns();

    debug!(
        "partitioned {} images into {} rows (columns={:?}, content={}x{})",
        images.len(),
        rows,
        counts,
        canvas_width,
        canvas_height
    );

    Ok(Partition {
        matrix,
        canvas_width,
        canvas_height,
        max_columns,
    })
}

/// Returns `(widest row, tallest positional column)` for a matrix.
fn measure(matrix: &ImageMatrix, shape: Shape, target_width: u32) -> Result<(u32, u32), LayoutError> {
    let mut max_width = 0u32;
    let mut column_heights = vec![0u32; matrix.max_columns()];

    for row in matrix.rows() {
        let width = column_width(target_width, row.len())?;
        let mut row_width = 0u32;
        for (col, image) in row.iter().enumerate() {
            let size = rendered_size(image, width, shape);
            row_width = row_width.saturating_add(size.width);
            column_heights[col] = column_heights[col].saturating_add(size.height);
        }
        max_width = max_width.max(row_width);
    }

    let max_height = column_heights.into_iter().max().unwrap_or(0);
    Ok((max_width, max_height))
}

/// Finds `image` in `matrix` by identity and returns its placement.
///
/// # Errors
/// Returns [`LayoutError::ImageNotFound`] when no cell holds this image
/// allocation, and [`LayoutError::InvalidLayout`] for degenerate rows.
pub fn locate(
    image: &SourceImage,
    matrix: &ImageMatrix,
    padding: u32,
    target_width: u32,
    shape: Shape,
) -> Result<Placement, LayoutError> {
    let mut found = None;
    walk(matrix, padding, target_width, shape, |cell, candidate| {
        if candidate.same_image(image) {
            found = Some(cell.placement());
            return false;
        }
        true
    })?;
    found.ok_or(LayoutError::ImageNotFound)
}

/// Returns the placement of the cell at `(row, col)`.
///
/// # Errors
/// Returns [`LayoutError::CellOutOfRange`] when the index is outside the
/// matrix.
pub fn locate_cell(
    matrix: &ImageMatrix,
    row: usize,
    col: usize,
    padding: u32,
    target_width: u32,
    shape: Shape,
) -> Result<Placement, LayoutError> {
    if matrix.get(row, col).is_none() {
        return Err(LayoutError::CellOutOfRange { row, col });
    }

    let mut found = None;
    walk(matrix, padding, target_width, shape, |cell, _| {
        if cell.row == row && cell.col == col {
            found = Some(cell.placement());
            return false;
        }
        true
    })?;
    found.ok_or(LayoutError::CellOutOfRange { row, col })
}

/// Walks cells row-major with running cursors; `visit` returns `false` to stop.
///
/// Returns the per-row heights for every fully-walked row.
fn walk<F>(
    matrix: &ImageMatrix,
    padding: u32,
    target_width: u32,
    shape: Shape,
    mut visit: F,
) -> Result<Vec<u32>, LayoutError>
where
    F: FnMut(PlacedCell, &SourceImage) -> bool,
{
    let padding = i64::from(padding);
    let mut row_heights = Vec::with_capacity(matrix.row_count());
    let mut y = padding;

    for (row, cells) in matrix.rows().iter().enumerate() {
        let width = column_width(target_width, cells.len())?;
        let mut x = padding;
        let mut row_height = 0u32;

        for (col, image) in cells.iter().enumerate() {
            let scaled = scaled_size(image.size(), width);
            let size = shape.footprint(scaled);
            let cell = PlacedCell {
                row,
                col,
                point: Point::new(to_coordinate(x)?, to_coordinate(y)?),
                scaled,
                size,
            };
            if !visit(cell, image) {
                return Ok(row_heights);
            }

            x += i64::from(size.width) + padding;
            row_height = row_height.max(size.height);
        }

        row_heights.push(row_height);
        y += i64::from(row_height) + padding;
    }

    Ok(row_heights)
}

fn to_coordinate(value: i64) -> Result<i32, LayoutError> {
    i32::try_from(value)
        .map_err(|_| LayoutError::InvalidLayout("placement coordinate overflow".to_string()))
}

/// Pads a content area into final canvas dimensions.
///
/// Width gains `(max_columns - 1) * padding + 2 * padding`, height gains
/// `(rows - 1) * padding + 2 * padding`.
///
/// # Errors
/// Returns [`LayoutError::InvalidLayout`] for empty grids or on overflow.
pub fn padded_canvas_size(
    content: Size,
    max_columns: usize,
    rows: usize,
    padding: u32,
) -> Result<Size, LayoutError> {
    if max_columns == 0 || rows == 0 {
        return Err(LayoutError::InvalidLayout("grid has no cells".to_string()));
    }

    let pad = |extent: u32, slots: usize| -> Option<u32> {
        let gaps = u32::try_from(slots).ok()?.checked_add(1)?;
        extent.checked_add(gaps.checked_mul(padding)?)
    };

    match (pad(content.width, max_columns), pad(content.height, rows)) {
        (Some(width), Some(height)) => Ok(Size::new(width, height)),
        _ => Err(LayoutError::InvalidLayout(
            "canvas dimension overflow".to_string(),
        )),
    }
}

/// Every placement of one build, computed once ahead of drawing.
#[derive(Debug, Clone)]
pub struct LayoutPlan {
    shape: Shape,
    padding: u32,
    target_width: u32,
    cells: Vec<PlacedCell>,
    row_heights: Vec<u32>,
    content_width: u32,
    column_height: u32,
    max_columns: usize,
}

impl LayoutPlan {
    /// Resolves every cell of `matrix` using the shape's padding.
    ///
    /// # Errors
    /// Returns [`LayoutError::InvalidLayout`] for empty matrices or rows.
    pub fn build(matrix: &ImageMatrix, shape: Shape, target_width: u32) -> Result<Self, LayoutError> {
        Self::with_padding(matrix, shape, shape.padding(), target_width)
    }

    /// Resolves every cell of `matrix` with an explicit padding.
    ///
    /// # Errors
    /// Returns [`LayoutError::InvalidLayout`] for empty matrices or rows.
    pub fn with_padding(
        matrix: &ImageMatrix,
        shape: Shape,
        padding: u32,
        target_width: u32,
    ) -> Result<Self, LayoutError> {
        if matrix.is_empty() {
            return Err(LayoutError::InvalidLayout("matrix has no cells".to_string()));
        }

        let mut cells = Vec::with_capacity(matrix.len());
        let row_heights = walk(matrix, padding, target_width, shape, |cell, _| {
            cells.push(cell);
            true
        })?;
        let (content_width, column_height) = measure(matrix, shape, target_width)?;

        Ok(Self {
            shape,
            padding,
            target_width,
            cells,
            row_heights,
            content_width,
            column_height,
            max_columns: matrix.max_columns(),
        })
    }

    /// Shape this plan was built for.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Gap between cells and around the edge.
    pub fn padding(&self) -> u32 {
        self.padding
    }

    /// Requested collage width.
    pub fn target_width(&self) -> u32 {
        self.target_width
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[PlacedCell] {
        &self.cells
    }

    /// The cell at `(row, col)`, if any.
    pub fn cell(&self, row: usize, col: usize) -> Option<&PlacedCell> {
        self.cells
            .iter()
            .find(|cell| cell.row == row && cell.col == col)
    }

    /// Tallest drawn cell per row.
    pub fn row_heights(&self) -> &[u32] {
        &self.row_heights
    }

    /// Widest row of drawn sizes, padding excluded.
    pub fn content_width(&self) -> u32 {
        self.content_width
    }

    /// Tallest positional column of drawn sizes, padding excluded.
    pub fn column_height(&self) -> u32 {
        self.column_height
    }

    /// Sum of row heights: the vertical extent placements actually use.
    pub fn stacked_height(&self) -> u32 {
        self.row_heights
            .iter()
            .fold(0u32, |total, height| total.saturating_add(*height))
    }

    /// Column count of the widest row.
    pub fn max_columns(&self) -> usize {
        self.max_columns
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.row_heights.len()
    }

    /// Final canvas size.
    ///
    /// The content height is the larger of the positional column height and
    /// the stacked row height, so no placement falls off the canvas.
    ///
    /// # Errors
    /// Returns [`LayoutError::InvalidLayout`] on overflow.
    pub fn canvas_size(&self) -> Result<Size, LayoutError> {
        let content = Size::new(
            self.content_width,
            self.column_height.max(self.stacked_height()),
        );
        padded_canvas_size(content, self.max_columns, self.rows(), self.padding)
    }
}

/// Error type for layout computation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// Inputs would divide by zero or produce empty dimensions.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
    /// Image is not a member of the matrix.
    #[error("image not found in matrix")]
    ImageNotFound,
    /// Index does not address a matrix cell.
    #[error("cell ({row}, {col}) is outside the matrix")]
    CellOutOfRange {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },
}
