//! Resampling collaborators.

use image::RgbaImage;
use image::imageops::{self, FilterType};

/// Scales an image to an exact width and height.
///
/// Implementations must be callable from any drawing worker.
pub trait Resampler: Send + Sync {
    /// Returns `image` resampled to `width x height`.
    fn resample(&self, image: &RgbaImage, width: u32, height: u32) -> RgbaImage;
}

/// Filter-based resampler backed by `image::imageops::resize`.
#[derive(Debug, Clone, Copy)]
pub struct FilterResampler {
    filter: FilterType,
}

impl FilterResampler {
    /// Lanczos3: the default high-quality filter.
    pub fn lanczos() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }

    /// Nearest neighbour: exact colors, used for pixel-precise checks.
    pub fn nearest() -> Self {
        Self {
            filter: FilterType::Nearest,
        }
    }
}

impl Default for FilterResampler {
    fn default() -> Self {
        Self::lanczos()
    }
}

impl Resampler for FilterResampler {
    fn resample(&self, image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
        if image.dimensions() == (width, height) {
            return image.clone();
        }
        imageops::resize(image, width, height, self.filter)
    }
}
