//! Integration tests for VERSION propagation into reports.

mod common;

use std::fs;

use collager_app::app_version;
use collager_compose::DrawMode;
use collager_core::Shape;

#[test]
fn version_display_tests_matches_root_version_file() {
    let root_version_path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../VERSION");
    let root_version = fs::read_to_string(root_version_path).expect("VERSION should be readable");
    assert_eq!(app_version(), root_version.trim());

    let report = common::fixture_output(Shape::Circle, DrawMode::Serial).report();
    assert_eq!(report.app_version, root_version.trim());
}
