//! Serial and concurrent drivers that turn a layout plan into pixels.

use std::fmt;
use std::str::FromStr;
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

use collager_core::{ImageMatrix, Rect, Shape, Size, SourceImage};
use collager_layout::{LayoutError, LayoutPlan, PlacedCell, padded_canvas_size};
use log::{debug, info, warn};

use crate::ComposeError;
use crate::canvas::{Canvas, CanvasRegion};
use crate::draw::draw_cell;
use crate::resample::Resampler;

/// How cell tasks are executed and whether the caller waits for them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DrawMode {
    /// Every cell is drawn on the calling thread before returning.
    Serial,
    /// Cells are drawn by the worker pool; the caller waits for all of them.
    #[default]
    Joined,
    /// Cells are drawn by the worker pool; the canvas is returned at once.
    ///
    /// Consumers must call [`CanvasHandle::wait`] (or synchronize otherwise)
    /// before trusting the pixels.
    Detached,
}

impl fmt::Display for DrawMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawMode::Serial => f.write_str("serial"),
            DrawMode::Joined => f.write_str("joined"),
            DrawMode::Detached => f.write_str("detached"),
        }
    }
}

impl FromStr for DrawMode {
    type Err = ComposeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "serial" => Ok(DrawMode::Serial),
            "joined" | "join" => Ok(DrawMode::Joined),
            "detached" | "detach" => Ok(DrawMode::Detached),
            _ => Err(ComposeError::InvalidDrawMode(raw.to_string())),
        }
    }
}

/// Driver settings for one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Task execution strategy.
    pub mode: DrawMode,
    /// Upper bound on pool threads; `0` means available parallelism.
    pub workers: usize,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            mode: DrawMode::Joined,
            workers: 0,
        }
    }
}

impl ComposeOptions {
    fn resolved_workers(&self, tasks: usize) -> usize {
        let requested = if self.workers == 0 {
            thread::available_parallelism().map_or(1, usize::from)
        } else {
            self.workers
        };
        requested.min(tasks).max(1)
    }
}

/// Counting completion signal shared by every task of one build.
#[derive(Debug)]
struct Completion {
    remaining: Mutex<usize>,
    done: Condvar,
}

impl Completion {
    fn new(tasks: usize) -> Arc<Self> {
        Arc::new(Self {
            remaining: Mutex::new(tasks),
            done: Condvar::new(),
        })
    }

    fn finish_one(&self) {
        let mut remaining = match self.remaining.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            self.done.notify_all();
        }
    }

    fn remaining(&self) -> usize {
        match self.remaining.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn wait(&self) {
        let mut remaining = match self.remaining.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        while *remaining > 0 {
            remaining = match self.done.wait(remaining) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
    }
}

/// Counts its task as finished when dropped, including on panic or when the
/// task is discarded unrun.
#[derive(Debug)]
struct TaskGuard(Arc<Completion>);

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.0.finish_one();
    }
}

struct CellTask {
    region: CanvasRegion,
    image: SourceImage,
    cell: PlacedCell,
    shape: Shape,
    resampler: Arc<dyn Resampler>,
    _guard: TaskGuard,
}

impl CellTask {
    fn run(mut self) {
        draw_cell(
            &mut self.region,
            &self.image,
            &self.cell,
            self.shape,
            self.resampler.as_ref(),
        );
        debug!("drew cell ({}, {})", self.cell.row, self.cell.col);
    }
}

/// Canvas plus the completion state of the tasks drawing into it.
#[derive(Debug, Clone)]
pub struct CanvasHandle {
    canvas: Canvas,
    completion: Arc<Completion>,
}

impl CanvasHandle {
    /// The canvas, possibly still being drawn.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Returns `true` once every cell task has finished.
    pub fn is_complete(&self) -> bool {
        self.completion.remaining() == 0
    }

    /// Number of cell tasks not yet finished.
    pub fn pending(&self) -> usize {
        self.completion.remaining()
    }

    /// Blocks until every cell task has finished and returns the canvas.
    pub fn wait(&self) -> &Canvas {
        self.completion.wait();
        &self.canvas
    }

    /// Waits for completion and takes the canvas.
    pub fn into_canvas(self) -> Canvas {
        self.completion.wait();
        self.canvas
    }
}

/// Draws every cell of `matrix` serially onto a canvas sized from the given
/// content dimensions.
///
/// `canvas_height` is raised to the stacked row height when the positional
/// column height would clip the last row.
///
/// # Errors
/// Returns [`ComposeError::Layout`] for degenerate matrices and region errors
/// when placements overlap.
pub fn composite(
    matrix: &ImageMatrix,
    shape: Shape,
    padding: u32,
    target_width: u32,
    canvas_width: u32,
    canvas_height: u32,
    resampler: Arc<dyn Resampler>,
) -> Result<Canvas, ComposeError> {
    let plan = LayoutPlan::with_padding(matrix, shape, padding, target_width)?;
    let content = Size::new(canvas_width, canvas_height.max(plan.stacked_height()));
    let size = padded_canvas_size(content, plan.max_columns(), plan.rows(), padding)?;

    let options = ComposeOptions {
        mode: DrawMode::Serial,
        workers: 1,
    };
    let handle = draw_plan(matrix, &plan, size, options, resampler)?;
    Ok(handle.into_canvas())
}

/// Plans and draws `matrix` with one task per cell.
///
/// In [`DrawMode::Detached`] the handle is returned before any task is
/// guaranteed to have run.
///
/// # Errors
/// Returns [`ComposeError::Layout`] for degenerate matrices,
/// [`ComposeError::RegionOverlap`] when placements collide and
/// [`ComposeError::WorkerSpawn`] when no drawing thread can start.
pub fn run_composite(
    matrix: &ImageMatrix,
    shape: Shape,
    padding: u32,
    target_width: u32,
    options: ComposeOptions,
    resampler: Arc<dyn Resampler>,
) -> Result<CanvasHandle, ComposeError> {
    let plan = LayoutPlan::with_padding(matrix, shape, padding, target_width)?;
    let size = plan.canvas_size()?;
    draw_plan(matrix, &plan, size, options, resampler)
}

/// Draws a precomputed plan onto a fresh canvas of `size`.
///
/// # Errors
/// See [`run_composite`].
pub fn draw_plan(
    matrix: &ImageMatrix,
    plan: &LayoutPlan,
    size: Size,
    options: ComposeOptions,
    resampler: Arc<dyn Resampler>,
) -> Result<CanvasHandle, ComposeError> {
    let canvas = Canvas::new(size)?;
    let drawable: Vec<&PlacedCell> = plan
        .cells()
        .iter()
        .filter(|cell| {
            if cell.size.is_empty() {
                debug!(
                    "skipping cell ({}, {}): drawn size {}x{} is empty",
                    cell.row, cell.col, cell.size.width, cell.size.height
                );
                return false;
            }
            true
        })
        .collect();
    let completion = Completion::new(drawable.len());

    // Regions are claimed up front so every task owns a disjoint rectangle
    // before anything runs.
    let mut tasks = Vec::with_capacity(drawable.len());
    for cell in drawable {
        let image = matrix
            .get(cell.row, cell.col)
            .ok_or(LayoutError::CellOutOfRange {
                row: cell.row,
                col: cell.col,
            })?
            .clone();
        let region = canvas.claim_region(Rect::new(cell.point, cell.size))?;
        tasks.push(CellTask {
            region,
            image,
            cell: *cell,
            shape: plan.shape(),
            resampler: Arc::clone(&resampler),
            _guard: TaskGuard(Arc::clone(&completion)),
        });
    }

    let handle = CanvasHandle {
        canvas,
        completion,
    };

    info!(
        "drawing {} cells on {}x{} canvas (mode={})",
        tasks.len(),
        size.width,
        size.height,
        options.mode
    );

    match options.mode {
        DrawMode::Serial => tasks.into_iter().for_each(CellTask::run),
        DrawMode::Joined => {
            dispatch(tasks, options)?;
            handle.wait();
        }
        DrawMode::Detached => {
            dispatch(tasks, options)?;
            warn!(
                "returning canvas with {} cell tasks still pending",
                handle.pending()
            );
        }
    }

    Ok(handle)
}

/// Feeds `tasks` to a pool of named worker threads and returns immediately.
fn dispatch(tasks: Vec<CellTask>, options: ComposeOptions) -> Result<(), ComposeError> {
    if tasks.is_empty() {
        return Ok(());
    }

    let workers = options.resolved_workers(tasks.len());
    let (task_tx, task_rx) = mpsc::channel::<CellTask>();
    let task_rx = Arc::new(Mutex::new(task_rx));

    let mut spawned = 0usize;
    for index in 0..workers {
        let task_rx = Arc::clone(&task_rx);
        let spawn = thread::Builder::new()
            .name(format!("collager-draw-{index}"))
            .spawn(move || {
                loop {
                    let next = match task_rx.lock() {
                        Ok(receiver) => receiver.recv(),
                        Err(_) => return,
                    };
                    match next {
                        Ok(task) => task.run(),
                        Err(_) => return,
                    }
                }
            });

        match spawn {
            Ok(_) => spawned += 1,
            Err(error) if spawned > 0 => {
                warn!("draw worker {index} failed to start: {error}");
                break;
            }
            Err(error) => return Err(ComposeError::WorkerSpawn(error.to_string())),
        }
    }

    debug!("dispatching {} cell tasks to {spawned} workers", tasks.len());
    for task in tasks {
        // A send only fails once every worker is gone; the returned task is
        // dropped and its guard still counts it down.
        if task_tx.send(task).is_err() {
            warn!("draw workers exited before all cell tasks were queued");
            break;
        }
    }

    Ok(())
}
