#![warn(missing_docs)]
//! # collager binary
//!
//! Loads a directory of images, lays them out and prints the layout report.

use std::fs::File;
use std::io;
use std::sync::Arc;

use clap::Parser;
use collager_app::cli::Cli;
use collager_app::{
    AppError, CollageDisplay, CollageRequest, ReportDisplay, draw_mode_from_env, run,
};
use collager_compose::{ComposeOptions, FilterResampler};
use collager_source::DirectoryImageSource;
use log::error;

/// CLI entry point.
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(error) = execute(cli) {
        error!("{error}");
        eprintln!("collager: {error}");
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> Result<(), AppError> {
    let mode = cli.draw_mode.unwrap_or_else(draw_mode_from_env);
    let request = CollageRequest::new(cli.shape, cli.rows, cli.width, cli.height, &cli.directory)?
        .with_options(ComposeOptions {
            mode,
            workers: cli.workers,
        });

    let source = DirectoryImageSource::new(&request.source_dir);
    let output = run(&request, &source, Arc::new(FilterResampler::lanczos()))?;
    let report = output.report();

    match cli.report {
        Some(path) => ReportDisplay::new(File::create(path)?).present(output.handle.canvas(), &report),
        None => ReportDisplay::new(io::stdout().lock()).present(output.handle.canvas(), &report),
    }
}
