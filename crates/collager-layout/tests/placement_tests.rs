//! Integration tests for placement recomputation.

mod common;

use collager_core::{Point, Rect, Shape, Size};
use collager_layout::{LayoutError, LayoutPlan, locate, locate_cell, partition};
use common::{random_images, sized_image};

#[test]
fn placement_tests_walks_rows_with_padding() {
    let tall = sized_image(0, 100, 100);
    let short = sized_image(1, 100, 50);
    let lower = sized_image(2, 50, 25);
    let result = partition(&[short.clone(), tall.clone(), lower.clone()], 2, Shape::Rectangle, 200)
        .expect("layout should be valid");

    let first = locate(&tall, &result.matrix, 1, 200, Shape::Rectangle).expect("tall should be found");
    let second = locate(&short, &result.matrix, 1, 200, Shape::Rectangle).expect("short should be found");
    let third = locate(&lower, &result.matrix, 1, 200, Shape::Rectangle).expect("lower should be found");

    assert_eq!(first.point, Point::new(1, 1));
    assert_eq!(first.size, Size::new(100, 100));
    assert_eq!(second.point, Point::new(102, 1));
    assert_eq!(second.size, Size::new(100, 50));
    // Second row starts below the tallest cell of the first row.
    assert_eq!(third.point, Point::new(1, 102));
    assert_eq!(third.size, Size::new(200, 100));
}

#[test]
fn placement_tests_is_idempotent() {
    let images = random_images(21, 12, 250);
    let result = partition(&images, 3, Shape::Circle, 700).expect("layout should be valid");

    for image in &images {
        let first = locate(image, &result.matrix, 20, 700, Shape::Circle).expect("image should be found");
        let second = locate(image, &result.matrix, 20, 700, Shape::Circle).expect("image should be found");
        assert_eq!(first, second);
    }
}

#[test]
fn placement_tests_reports_foreign_image() {
    let images: Vec<_> = (0..3).map(|index| sized_image(index, 10, 10)).collect();
    let result = partition(&images, 1, Shape::Rectangle, 30).expect("layout should be valid");
    let stranger = sized_image(0, 10, 10);

    assert_eq!(
        locate(&stranger, &result.matrix, 1, 30, Shape::Rectangle),
        Err(LayoutError::ImageNotFound)
    );
}

#[test]
fn placement_tests_index_lookup_matches_identity_lookup() {
    let images = random_images(5, 10, 120);
    let result = partition(&images, 3, Shape::Rectangle, 480).expect("layout should be valid");
    let plan = LayoutPlan::build(&result.matrix, Shape::Rectangle, 480).expect("plan should build");

    for (row, col, image) in result.matrix.cells() {
        let by_identity = locate(image, &result.matrix, 1, 480, Shape::Rectangle).expect("image should be found");
        let by_index = locate_cell(&result.matrix, row, col, 1, 480, Shape::Rectangle).expect("cell should exist");
        assert_eq!(by_identity, by_index);
        assert_eq!(plan.cell(row, col).map(|cell| cell.placement()), Some(by_index));
    }
    assert!(plan.cell(3, 0).is_none());

    assert_eq!(
        locate_cell(&result.matrix, 3, 0, 1, 480, Shape::Rectangle),
        Err(LayoutError::CellOutOfRange { row: 3, col: 0 })
    );
}

#[test]
fn placement_tests_rectangle_preserves_aspect_ratio() {
    let images = random_images(8, 24, 400);
    let result = partition(&images, 4, Shape::Rectangle, 1_200).expect("layout should be valid");

    for image in &images {
        let placement = locate(image, &result.matrix, 1, 1_200, Shape::Rectangle).expect("image should be found");
        let (width, height) = (i64::from(placement.size.width), i64::from(placement.size.height));
        let (original_width, original_height) = (i64::from(image.width()), i64::from(image.height()));

        // Truncation moves each axis by less than one pixel.
        let skew = (width * original_height - height * original_width).abs();
        assert!(skew <= original_width.max(original_height), "aspect drift for {}", image.label());
    }
}

#[test]
fn placement_tests_circle_sizes_are_square_crops() {
    let images = random_images(9, 15, 300);
    let plan_matrix = partition(&images, 4, Shape::Circle, 800).expect("layout should be valid").matrix;
    let plan = LayoutPlan::build(&plan_matrix, Shape::Circle, 800).expect("plan should build");

    for cell in plan.cells() {
        let expected = (f64::from(cell.scaled.width.min(cell.scaled.height)) * 0.8) as u32;
        assert_eq!(cell.size, Size::new(expected, expected));
    }
}

#[test]
fn placement_tests_never_clip_or_overlap() {
    for (seed, shape) in [(31_u64, Shape::Rectangle), (32, Shape::Circle), (33, Shape::Rectangle)] {
        let images = random_images(seed, 23, 350);
        let matrix = partition(&images, 5, shape, 1_000).expect("layout should be valid").matrix;
        let plan = LayoutPlan::build(&matrix, shape, 1_000).expect("plan should build");
        let canvas = Rect::new(Point::new(0, 0), plan.canvas_size().expect("canvas should fit"));

        let regions: Vec<Rect> = plan.cells().iter().map(|cell| Rect::new(cell.point, cell.size)).collect();
        for (index, region) in regions.iter().enumerate() {
            assert!(canvas.encloses(region), "cell {index} clips the canvas");
            for other in &regions[index + 1..] {
                assert!(!region.intersects(other), "cells overlap");
            }
        }
    }
}

#[test]
fn placement_tests_canvas_covers_stacked_rows() {
    // Row 0 holds a tall cell in column 0; row 1 holds a tall cell in column 1.
    // Positional column sums undercount the stacked row heights.
    let images = vec![
        sized_image(0, 100, 300),
        sized_image(1, 100, 100),
        sized_image(2, 100, 20),
        sized_image(3, 10, 15),
    ];
    let result = partition(&images, 2, Shape::Rectangle, 200).expect("layout should be valid");
    let plan = LayoutPlan::build(&result.matrix, Shape::Rectangle, 200).expect("plan should build");

    assert!(plan.stacked_height() > plan.column_height());
    assert_eq!(plan.column_height(), result.canvas_height);
    let canvas = plan.canvas_size().expect("canvas should fit");
    assert_eq!(canvas.height, plan.stacked_height() + 3);
}
