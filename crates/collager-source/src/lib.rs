#![warn(missing_docs)]
//! # collager-source
//!
//! ## Purpose
//! Provides the image-source abstraction that feeds the collage pipeline.
//!
//! ## Responsibilities
//! - Define a backend-agnostic [`ImageSource`] trait.
//! - Load every decodable image under a directory tree concurrently.
//! - Expose a deterministic in-memory source for CI and unit tests.
//!
//! ## Data flow
//! Directory walk -> path queue -> bounded pool of decode workers -> image
//! channel / error channel -> unordered `Vec<SourceImage>` handed to the
//! partitioner.
//!
//! ## Ownership and lifetimes
//! Decoded images are owned, `Arc`-backed values; nothing borrowed from a
//! worker thread escapes it.
//!
//! ## Error model
//! A file that fails to decode is skipped and logged at `debug`. A directory
//! that cannot be walked aborts the load with [`SourceError::Traversal`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;

use collager_core::SourceImage;
use image::{ImageReader, Rgba, RgbaImage};
use log::{debug, info, warn};
use thiserror::Error;
use walkdir::WalkDir;

/// Trait implemented by concrete image providers.
pub trait ImageSource: Send + Sync {
    /// Produces an unordered set of decoded images.
    ///
    /// # Errors
    /// Returns [`SourceError`] when the source as a whole is unreadable.
    fn load(&self) -> Result<Vec<SourceImage>, SourceError>;
}

/// Loads every decodable file below a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryImageSource {
    root: PathBuf,
    workers: usize,
}

impl DirectoryImageSource {
    /// Creates a source rooted at `root` that decodes on up to
    /// available-parallelism threads.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            workers: 0,
        }
    }

    /// Caps the decode pool; `0` means available parallelism.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    fn resolved_workers(&self, files: usize) -> usize {
        let requested = if self.workers == 0 {
            thread::available_parallelism().map_or(1, usize::from)
        } else {
            self.workers
        };
        requested.min(files).max(1)
    }

    /// Directory this source walks.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists every regular file below the root, recursively.
    ///
    /// # Errors
    /// Returns [`SourceError::NotADirectory`] when the root is missing or not a
    /// directory and [`SourceError::Traversal`] when any entry cannot be read.
    pub fn discover_files(&self) -> Result<Vec<PathBuf>, SourceError> {
        if !self.root.is_dir() {
            return Err(SourceError::NotADirectory(self.root.clone()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|error| SourceError::Traversal {
                path: error
                    .path()
                    .map_or_else(|| self.root.clone(), Path::to_path_buf),
                message: error.to_string(),
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

impl ImageSource for DirectoryImageSource {
    fn load(&self) -> Result<Vec<SourceImage>, SourceError> {
        let files = self.discover_files()?;
        let expected = files.len();
        if expected == 0 {
            info!("loaded 0 images from {}", self.root.display());
            return Ok(Vec::new());
        }

        let workers = self.resolved_workers(expected);
        let (path_tx, path_rx) = mpsc::channel::<PathBuf>();
        let path_rx = Arc::new(Mutex::new(path_rx));
        let (image_tx, image_rx) = mpsc::channel::<SourceImage>();
        let (error_tx, error_rx) = mpsc::channel::<DecodeFailure>();

        let mut spawned = 0usize;
        for index in 0..workers {
            let path_rx = Arc::clone(&path_rx);
            let image_tx = image_tx.clone();
            let error_tx = error_tx.clone();
            let spawn = thread::Builder::new()
                .name(format!("collager-load-{index}"))
                .spawn(move || {
                    loop {
                        let next = match path_rx.lock() {
                            Ok(receiver) => receiver.recv(),
                            Err(_) => return,
                        };
                        let Ok(path) = next else {
                            return;
                        };
                        match decode_file(&path) {
                            Ok(image) => {
                                let _ = image_tx.send(image);
                            }
                            Err(failure) => {
                                let _ = error_tx.send(failure);
                            }
                        }
                    }
                });

            match spawn {
                Ok(_) => spawned += 1,
                Err(error) if spawned > 0 => {
                    warn!("load worker {index} failed to start: {error}");
                    break;
                }
                Err(error) => return Err(SourceError::Worker(error.to_string())),
            }
        }
        debug!("decoding {expected} files on {spawned} workers");

        for path in files {
            if path_tx.send(path).is_err() {
                warn!("load workers exited before all files were queued");
                break;
            }
        }

        // Workers hold the only remaining senders; the image channel closes
        // once the queue drains and every worker has exited.
        drop(path_tx);
        drop(image_tx);
        drop(error_tx);

        let images: Vec<SourceImage> = image_rx.iter().collect();
        let mut skipped = 0usize;
        for failure in error_rx.try_iter() {
            debug!(
                "skipping undecodable file {}: {}",
                failure.path.display(),
                failure.message
            );
            skipped += 1;
        }

        if images.len() + skipped != expected {
            warn!(
                "{} of {expected} files were never decoded",
                expected - images.len() - skipped
            );
        }

        info!(
            "loaded {} images from {} ({skipped} skipped)",
            images.len(),
            self.root.display()
        );
        Ok(images)
    }
}

/// Per-file decode failure; swallowed by [`DirectoryImageSource::load`].
#[derive(Debug)]
struct DecodeFailure {
    path: PathBuf,
    message: String,
}

fn decode_file(path: &Path) -> Result<SourceImage, DecodeFailure> {
    let failure = |message: String| DecodeFailure {
        path: path.to_path_buf(),
        message,
    };

    let image = ImageReader::open(path)
        .map_err(|error| failure(error.to_string()))?
        .with_guessed_format()
        .map_err(|error| failure(error.to_string()))?
        .decode()
        .map_err(|error| failure(error.to_string()))?;

    Ok(SourceImage::from_dynamic(path.display().to_string(), image))
}

/// Deterministic in-memory source for test and CI usage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryImageSource {
    images: Vec<SourceImage>,
}

impl InMemoryImageSource {
    /// Wraps caller-provided images.
    pub fn new(images: Vec<SourceImage>) -> Self {
        Self { images }
    }

    /// Generates `count` solid images with varied, reproducible dimensions.
    pub fn synthetic(count: usize) -> Self {
        let images = (0..count)
            .map(|index| {
                let width = 40 + (index as u32 * 37) % 90;
                let height = 30 + (index as u32 * 53) % 110;
                let shade = (index * 29 % 256) as u8;
                SourceImage::new(
                    format!("synthetic-{index}"),
                    RgbaImage::from_pixel(width, height, Rgba([shade, 255 - shade, 128, 255])),
                )
            })
            .collect();
        Self { images }
    }
}

impl ImageSource for InMemoryImageSource {
    fn load(&self) -> Result<Vec<SourceImage>, SourceError> {
        Ok(self.images.clone())
    }
}

/// Image source error type.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Root path is missing or not a directory.
    #[error("image directory {} does not exist or is not a directory", .0.display())]
    NotADirectory(PathBuf),
    /// Directory walk failed part-way.
    #[error("failed to read {}: {message}", .path.display())]
    Traversal {
        /// Entry that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        message: String,
    },
    /// A decode worker thread could not be started.
    #[error("failed to spawn load worker: {0}")]
    Worker(String),
}
