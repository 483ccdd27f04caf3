//! Integration tests for rectangle and circle compositing.

mod common;

use std::sync::Arc;

use collager_compose::{Canvas, FilterResampler, Surface, composite, draw_cell};
use collager_core::{Point, Rect, Shape, Size, SourceImage};
use collager_layout::{LayoutPlan, partition};
use common::solid;
use image::{Rgba, RgbaImage};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[test]
fn compositing_tests_draws_rectangles_inside_padding() {
    let red = solid("red", 10, 10, [255, 0, 0]);
    let blue = solid("blue", 10, 10, [0, 0, 255]);
    let layout = partition(&[red, blue], 1, Shape::Rectangle, 20).expect("layout should be valid");

    let canvas = composite(
        &layout.matrix,
        Shape::Rectangle,
        1,
        20,
        layout.canvas_width,
        layout.canvas_height,
        Arc::new(FilterResampler::nearest()),
    )
    .expect("composite should succeed");

    assert_eq!(canvas.size(), Size::new(23, 12));
    assert_eq!(canvas.get_pixel(0, 0), Some(TRANSPARENT));
    assert_eq!(canvas.get_pixel(1, 1), Some(Rgba([255, 0, 0, 255])));
    assert_eq!(canvas.get_pixel(10, 10), Some(Rgba([255, 0, 0, 255])));
    assert_eq!(canvas.get_pixel(11, 1), Some(TRANSPARENT));
    assert_eq!(canvas.get_pixel(12, 1), Some(Rgba([0, 0, 255, 255])));
    assert_eq!(canvas.get_pixel(22, 11), Some(TRANSPARENT));
}

#[test]
fn compositing_tests_rectangle_copies_alpha_without_blending() {
    let translucent = SourceImage::solid("glass", 4, 4, [10, 20, 30, 100]);
    let layout = partition(&[translucent], 1, Shape::Rectangle, 4).expect("layout should be valid");

    let canvas = composite(
        &layout.matrix,
        Shape::Rectangle,
        1,
        4,
        layout.canvas_width,
        layout.canvas_height,
        Arc::new(FilterResampler::nearest()),
    )
    .expect("composite should succeed");

    assert_eq!(canvas.get_pixel(2, 2), Some(Rgba([10, 20, 30, 100])));
}

#[test]
fn compositing_tests_circle_masks_tile_corners() {
    let green = solid("green", 100, 100, [0, 200, 0]);
    let layout = partition(&[green], 1, Shape::Circle, 100).expect("layout should be valid");

    let canvas = composite(
        &layout.matrix,
        Shape::Circle,
        20,
        100,
        layout.canvas_width,
        layout.canvas_height,
        Arc::new(FilterResampler::nearest()),
    )
    .expect("composite should succeed");

    assert_eq!(canvas.size(), Size::new(120, 120));
    assert_eq!(canvas.get_pixel(60, 60), Some(Rgba([0, 200, 0, 255])));
    assert_eq!(canvas.get_pixel(20, 60), Some(Rgba([0, 200, 0, 255])));
    assert_eq!(canvas.get_pixel(20, 20), Some(TRANSPARENT));
    assert_eq!(canvas.get_pixel(99, 99), Some(TRANSPARENT));
    assert_eq!(canvas.get_pixel(5, 5), Some(TRANSPARENT));
}

#[test]
fn compositing_tests_circle_leaves_background_outside_mask() {
    let canvas = Canvas::new(Size::new(40, 40)).expect("canvas should allocate");
    let white = Rgba([255, 255, 255, 255]);
    for y in 0..40 {
        for x in 0..40 {
            canvas.store(x, y, white);
        }
    }

    let image = solid("wide", 60, 30, [0, 0, 200]);
    let layout = partition(&[image.clone()], 1, Shape::Circle, 60).expect("layout should be valid");
    let plan = LayoutPlan::with_padding(&layout.matrix, Shape::Circle, 5, 60).expect("plan should build");
    let cell = plan.cells()[0];
    assert_eq!(cell.size, Size::new(24, 24));

    let mut region = canvas
        .claim_region(Rect::new(cell.point, cell.size))
        .expect("region should be free");
    draw_cell(&mut region, &image, &cell, Shape::Circle, &FilterResampler::nearest());

    assert_eq!(cell.point, Point::new(5, 5));
    assert_eq!(canvas.get_pixel(17, 17), Some(Rgba([0, 0, 200, 255])));
    assert_eq!(canvas.get_pixel(5, 5), Some(white));
    assert_eq!(canvas.get_pixel(28, 28), Some(white));
    assert_eq!(canvas.get_pixel(30, 17), Some(white));
}

#[test]
fn compositing_tests_every_cell_is_drawn() {
    let colors: Vec<[u8; 3]> = (0..7_u8).map(|index| [index * 30 + 10, 255 - index * 20, index]).collect();
    let images: Vec<SourceImage> = colors
        .iter()
        .enumerate()
        .map(|(index, color)| solid(&format!("cell-{index}"), 30 + index as u32 * 5, 20 + index as u32 * 3, *color))
        .collect();
    let layout = partition(&images, 3, Shape::Rectangle, 150).expect("layout should be valid");
    let plan = LayoutPlan::build(&layout.matrix, Shape::Rectangle, 150).expect("plan should build");

    let canvas = composite(
        &layout.matrix,
        Shape::Rectangle,
        1,
        150,
        layout.canvas_width,
        layout.canvas_height,
        Arc::new(FilterResampler::nearest()),
    )
    .expect("composite should succeed");

    for cell in plan.cells() {
        let image = layout.matrix.get(cell.row, cell.col).expect("cell should exist");
        let center_x = cell.point.x + (cell.size.width / 2) as i32;
        let center_y = cell.point.y + (cell.size.height / 2) as i32;
        let expected = image.pixel_at(0, 0).expect("image should have pixels");
        assert_eq!(canvas.get_pixel(center_x, center_y), Some(expected));
    }
}

#[test]
fn compositing_tests_circle_keeps_side_bands_of_wide_images() {
    let banded = SourceImage::new(
        "banded",
        RgbaImage::from_fn(200, 100, |x, _| {
            if x < 50 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 255, 0, 255])
            }
        }),
    );
    let layout = partition(&[banded], 1, Shape::Circle, 200).expect("layout should be valid");

    let canvas = composite(
        &layout.matrix,
        Shape::Circle,
        20,
        200,
        layout.canvas_width,
        layout.canvas_height,
        Arc::new(FilterResampler::nearest()),
    )
    .expect("composite should succeed");

    // The 200x100 image is squashed into an 80x80 tile at (20, 20), so its
    // left quarter survives near the tile's left edge.
    assert_eq!(canvas.size(), Size::new(120, 120));
    assert_eq!(canvas.get_pixel(30, 60), Some(Rgba([255, 0, 0, 255])));
    assert_eq!(canvas.get_pixel(90, 60), Some(Rgba([0, 255, 0, 255])));

    let snapshot = canvas.to_rgba_image();
    assert_eq!(snapshot.dimensions(), (120, 120));
    assert_eq!(*snapshot.get_pixel(30, 60), Rgba([255, 0, 0, 255]));
    assert_eq!(*snapshot.get_pixel(0, 0), TRANSPARENT);
}
