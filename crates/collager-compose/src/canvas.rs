//! Shared RGBA canvas and exclusive per-cell write regions.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use collager_core::{Point, Rect, Size, required_rgba_len};
use image::{Rgba, RgbaImage};
use sha2::{Digest, Sha256};

use crate::ComposeError;

/// Read access to a 2-D pixel source in canvas coordinates.
pub trait Surface {
    /// Area this surface covers.
    fn bounds(&self) -> Rect;

    /// Reads one pixel, or `None` outside [`Surface::bounds`].
    fn get_pixel(&self, x: i32, y: i32) -> Option<Rgba<u8>>;
}

/// Write access to a 2-D pixel destination.
pub trait SurfaceMut: Surface {
    /// Writes one pixel; returns `false` when the write was clipped.
    fn set_pixel(&mut self, x: i32, y: i32, pixel: Rgba<u8>) -> bool;
}

#[derive(Debug)]
struct PixelBuffer {
    width: u32,
    height: u32,
    // Packed little-endian RGBA. Relaxed atomics stand in for a lock: racing
    // writers can only tear at pixel granularity.
    pixels: Box<[AtomicU32]>,
    claims: Mutex<Vec<Rect>>,
}

/// Mutable RGBA pixel buffer shared by every drawing task of one build.
///
/// Clones alias the same pixels. The background is transparent black.
#[derive(Debug, Clone)]
pub struct Canvas {
    buffer: Arc<PixelBuffer>,
}

impl Canvas {
    /// Allocates a transparent canvas.
    ///
    /// # Errors
    /// Returns [`ComposeError::CanvasOverflow`] when the pixel count overflows.
    pub fn new(size: Size) -> Result<Self, ComposeError> {
        let pixel_count = required_rgba_len(size.width, size.height)
            .map_err(|_| ComposeError::CanvasOverflow)?
            / 4;
        let pixels = (0..pixel_count).map(|_| AtomicU32::new(0)).collect();

        Ok(Self {
            buffer: Arc::new(PixelBuffer {
                width: size.width,
                height: size.height,
                pixels,
                claims: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Canvas width in pixels.
    pub fn width(&self) -> u32 {
        self.buffer.width
    }

    /// Canvas height in pixels.
    pub fn height(&self) -> u32 {
        self.buffer.height
    }

    /// Canvas dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = u32::try_from(x).ok().filter(|x| *x < self.buffer.width)?;
        let y = u32::try_from(y).ok().filter(|y| *y < self.buffer.height)?;
        Some(y as usize * self.buffer.width as usize + x as usize)
    }

    /// Writes one pixel through a shared reference.
    ///
    /// Returns `false` when `(x, y)` is outside the canvas.
    pub fn store(&self, x: i32, y: i32, pixel: Rgba<u8>) -> bool {
        match self.index(x, y) {
            Some(index) => {
                self.buffer.pixels[index].store(u32::from_le_bytes(pixel.0), Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Reserves `rect` for exclusive drawing by one task.
    ///
    /// # Errors
    /// Returns [`ComposeError::RegionOutOfBounds`] when `rect` leaves the
    /// canvas and [`ComposeError::RegionOverlap`] when it shares a pixel with an
    /// earlier claim.
    pub fn claim_region(&self, rect: Rect) -> Result<CanvasRegion, ComposeError> {
        if !self.bounds().encloses(&rect) {
            return Err(ComposeError::RegionOutOfBounds { rect });
        }

        let mut claims = self
            .buffer
            .claims
            .lock()
            .map_err(|_| ComposeError::ClaimsPoisoned)?;
        if let Some(existing) = claims.iter().find(|claimed| claimed.intersects(&rect)) {
            return Err(ComposeError::RegionOverlap {
                rect,
                existing: *existing,
            });
        }
        claims.push(rect);

        Ok(CanvasRegion {
            canvas: self.clone(),
            rect,
        })
    }

    /// Copies the current pixels into an owned image.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.width(), self.height());
        for (pixel, cell) in image.pixels_mut().zip(self.buffer.pixels.iter()) {
            *pixel = Rgba(cell.load(Ordering::Relaxed).to_le_bytes());
        }
        image
    }

    /// SHA-256 over dimensions and pixel bytes, hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.width().to_le_bytes());
        hasher.update(self.height().to_le_bytes());
        for cell in self.buffer.pixels.iter() {
            hasher.update(cell.load(Ordering::Relaxed).to_le_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

impl Surface for Canvas {
    fn bounds(&self) -> Rect {
        Rect::new(Point::new(0, 0), self.size())
    }

    fn get_pixel(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        self.index(x, y)
            .map(|index| Rgba(self.buffer.pixels[index].load(Ordering::Relaxed).to_le_bytes()))
    }
}

impl SurfaceMut for Canvas {
    fn set_pixel(&mut self, x: i32, y: i32, pixel: Rgba<u8>) -> bool {
        self.store(x, y, pixel)
    }
}

/// Exclusive write handle over one claimed canvas rectangle.
///
/// Coordinates stay in canvas space; writes outside the claimed rectangle are
/// clipped.
#[derive(Debug)]
pub struct CanvasRegion {
    canvas: Canvas,
    rect: Rect,
}

impl CanvasRegion {
    /// Claimed rectangle.
    pub fn rect(&self) -> Rect {
        self.rect
    }
}

impl Surface for CanvasRegion {
    fn bounds(&self) -> Rect {
        self.rect
    }

    fn get_pixel(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        if !self.rect.contains(i64::from(x), i64::from(y)) {
            return None;
        }
        self.canvas.get_pixel(x, y)
    }
}

impl SurfaceMut for CanvasRegion {
    fn set_pixel(&mut self, x: i32, y: i32, pixel: Rgba<u8>) -> bool {
        if !self.rect.contains(i64::from(x), i64::from(y)) {
            return false;
        }
        self.canvas.store(x, y, pixel)
    }
}
