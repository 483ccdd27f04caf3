//! Tests identity lookup and row-major iteration of image matrices.

use collager_core::{ImageMatrix, SourceImage};

fn fixture_matrix() -> (ImageMatrix, Vec<SourceImage>) {
    let images: Vec<SourceImage> = (0..5_u8)
        .map(|index| SourceImage::solid(format!("img-{index}"), 4, 4, [index, 0, 0, 255]))
        .collect();
    let rows = vec![images[0..3].to_vec(), images[3..5].to_vec()];
    (ImageMatrix::from_rows(rows), images)
}

#[test]
fn matrix_identity_tests_finds_every_image_by_reference() {
    let (matrix, images) = fixture_matrix();

    assert_eq!(matrix.position_of(&images[0]), Some((0, 0)));
    assert_eq!(matrix.position_of(&images[2]), Some((0, 2)));
    assert_eq!(matrix.position_of(&images[4]), Some((1, 1)));
}

#[test]
fn matrix_identity_tests_rejects_pixel_equal_stranger() {
    let (matrix, _) = fixture_matrix();
    let stranger = SourceImage::solid("img-0", 4, 4, [0, 0, 0, 255]);

    assert_eq!(matrix.position_of(&stranger), None);
}

#[test]
fn matrix_identity_tests_iterates_row_major() {
    let (matrix, _) = fixture_matrix();
    let order: Vec<(usize, usize)> = matrix.cells().map(|(row, col, _)| (row, col)).collect();

    assert_eq!(order, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1)]);
    assert_eq!(matrix.len(), 5);
    assert_eq!(matrix.max_columns(), 3);
    assert_eq!(matrix.columns_per_row(), vec![3, 2]);
}
