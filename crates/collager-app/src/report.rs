//! Serializable summary of one collage build.

use collager_compose::{CanvasHandle, DrawMode};
use collager_core::{ImageMatrix, Shape};
use collager_layout::LayoutPlan;
use serde::{Deserialize, Serialize};

/// Schema tag for v1 layout reports.
pub const REPORT_SCHEMA_V1: &str = "v1";

/// Layout and draw state of one collage build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutReport {
    /// Report schema version.
    pub schema_version: String,
    /// Application version that produced the report.
    pub app_version: String,
    /// Cell shape.
    pub shape: Shape,
    /// Requested row count.
    pub rows: usize,
    /// Requested collage width.
    pub target_width: u32,
    /// Requested collage height. Accepted but not used by the layout.
    pub target_height: u32,
    /// Gap between cells and around the edge.
    pub padding: u32,
    /// Draw mode used for the build.
    pub draw_mode: String,
    /// Final canvas width.
    pub canvas_width: u32,
    /// Final canvas height.
    pub canvas_height: u32,
    /// Widest row of drawn sizes, padding excluded.
    pub content_width: u32,
    /// Tallest positional column, padding excluded.
    pub column_height: u32,
    /// Sum of per-row heights, padding excluded.
    pub stacked_height: u32,
    /// Cell tasks still running when the report was taken.
    pub pending_cells: usize,
    /// Canvas SHA-256; absent while cells are still pending.
    pub canvas_sha256: Option<String>,
    /// Every placed cell, row-major.
    pub cells: Vec<CellReport>,
}

/// Placement of one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellReport {
    /// Row index.
    pub row: usize,
    /// Column index.
    pub col: usize,
    /// Source label, usually the file path.
    pub source: String,
    /// Original width.
    pub source_width: u32,
    /// Original height.
    pub source_height: u32,
    /// Left edge on the canvas.
    pub x: i32,
    /// Top edge on the canvas.
    pub y: i32,
    /// Drawn width.
    pub width: u32,
    /// Drawn height.
    pub height: u32,
}

/// Build parameters echoed into the report.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext {
    /// Requested row count.
    pub rows: usize,
    /// Requested collage height.
    pub target_height: u32,
    /// Draw mode used.
    pub draw_mode: DrawMode,
}

impl LayoutReport {
    /// Snapshots a build. The fingerprint is only taken once drawing has
    /// finished.
    pub fn capture(
        context: ReportContext,
        matrix: &ImageMatrix,
        plan: &LayoutPlan,
        handle: &CanvasHandle,
    ) -> Self {
        let cells = plan
            .cells()
            .iter()
            .filter_map(|cell| {
                let image = matrix.get(cell.row, cell.col)?;
                Some(CellReport {
                    row: cell.row,
                    col: cell.col,
                    source: image.label().to_string(),
                    source_width: image.width(),
                    source_height: image.height(),
                    x: cell.point.x,
                    y: cell.point.y,
                    width: cell.size.width,
                    height: cell.size.height,
                })
            })
            .collect();

        let pending_cells = handle.pending();
        let canvas = handle.canvas();

        Self {
            schema_version: REPORT_SCHEMA_V1.to_string(),
            app_version: crate::app_version().to_string(),
            shape: plan.shape(),
            rows: context.rows,
            target_width: plan.target_width(),
            target_height: context.target_height,
            padding: plan.padding(),
            draw_mode: context.draw_mode.to_string(),
            canvas_width: canvas.width(),
            canvas_height: canvas.height(),
            content_width: plan.content_width(),
            column_height: plan.column_height(),
            stacked_height: plan.stacked_height(),
            pending_cells,
            canvas_sha256: (pending_cells == 0).then(|| canvas.fingerprint()),
            cells,
        }
    }

    /// Serializes to pretty JSON.
    ///
    /// # Errors
    /// Returns the serializer error on failure.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parses a report from JSON.
    ///
    /// # Errors
    /// Returns the deserializer error on malformed input.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
