//! Per-cell compositing: opaque rectangles and masked circles.

use collager_core::{Point, Shape, SourceImage};
use collager_layout::PlacedCell;
use image::{Rgba, RgbaImage};

use crate::canvas::{Surface, SurfaceMut};
use crate::mask::CircleMask;
use crate::resample::Resampler;

/// Copies `source` onto `destination` at `origin`, replacing every pixel.
///
/// Alpha is copied too; nothing is blended.
pub fn draw_opaque<D: SurfaceMut>(destination: &mut D, origin: Point, source: &RgbaImage) {
    for (x, y, pixel) in source.enumerate_pixels() {
        destination.set_pixel(offset(origin.x, x), offset(origin.y, y), *pixel);
    }
}

/// Composites `source` "over" `destination` through `mask`.
///
/// The mask is read in source coordinates. Pixels with zero coverage leave the
/// destination untouched.
pub fn draw_masked_over<D, M>(destination: &mut D, origin: Point, source: &RgbaImage, mask: &M)
where
    D: SurfaceMut,
    M: Surface,
{
    for (x, y, pixel) in source.enumerate_pixels() {
        let coverage = mask
            .get_pixel(offset(0, x), offset(0, y))
            .map_or(0, |mask_pixel| mask_pixel[3]);
        if coverage == 0 {
            continue;
        }

        let target_x = offset(origin.x, x);
        let target_y = offset(origin.y, y);
        let Some(background) = destination.get_pixel(target_x, target_y) else {
            continue;
        };
        destination.set_pixel(target_x, target_y, blend_over(background, *pixel, coverage));
    }
}

fn offset(base: i32, delta: u32) -> i32 {
    base.saturating_add(i32::try_from(delta).unwrap_or(i32::MAX))
}

/// Straight-alpha Porter-Duff "over" with an extra coverage factor.
pub fn blend_over(background: Rgba<u8>, foreground: Rgba<u8>, coverage: u8) -> Rgba<u8> {
    let source_alpha = f32::from(foreground[3]) / 255.0 * f32::from(coverage) / 255.0;
    let background_alpha = f32::from(background[3]) / 255.0;
    let out_alpha = source_alpha + background_alpha * (1.0 - source_alpha);
    if out_alpha <= f32::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |index: usize| -> u8 {
        let source = f32::from(foreground[index]) * source_alpha;
        let below = f32::from(background[index]) * background_alpha * (1.0 - source_alpha);
        ((source + below) / out_alpha).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Resamples `source` straight to the `diameter x diameter` tile drawn for a
/// circle cell. Non-square images are squashed, never cropped.
pub fn circle_tile(source: &SourceImage, diameter: u32, resampler: &dyn Resampler) -> RgbaImage {
    resampler.resample(source.pixels(), diameter, diameter)
}

/// Draws one placed cell onto `destination`.
///
/// Cells with an empty size are skipped.
pub fn draw_cell<D: SurfaceMut>(
    destination: &mut D,
    image: &SourceImage,
    cell: &PlacedCell,
    shape: Shape,
    resampler: &dyn Resampler,
) {
    if cell.size.is_empty() {
        return;
    }

    match shape {
        Shape::Rectangle => {
            let resampled = resampler.resample(image.pixels(), cell.size.width, cell.size.height);
            draw_opaque(destination, cell.point, &resampled);
        }
        Shape::Circle => {
            let diameter = cell.size.width;
            let tile = circle_tile(image, diameter, resampler);
            draw_masked_over(destination, cell.point, &tile, &CircleMask::for_tile(diameter));
        }
    }
}
