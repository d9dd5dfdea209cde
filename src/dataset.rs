use log::{error, info};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::class_table::ClassTable;
use crate::config::{DetArgs, RunOptions, SegArgs};
use crate::conversion::{convert_detection_file, convert_segmentation_file, ConversionContext};
use crate::error::{FileError, Result};
use crate::io::{find_json_files, setup_output_directories};
use crate::palette::ColorPalette;
use crate::types::{FileReport, ProcessingStats};
use crate::utils::create_progress_bar;

/// Convert every file, in parallel. Without `fail_fast` a failing file is
/// logged and counted and the rest of the batch still runs.
pub fn process_files<F>(
    files: &[PathBuf],
    options: &RunOptions,
    label: &str,
    convert: F,
) -> std::result::Result<ProcessingStats, FileError>
where
    F: Fn(&Path) -> Result<FileReport> + Sync,
{
    let pb = create_progress_bar(files.len() as u64, label);

    let stats = if options.fail_fast {
        files
            .par_iter()
            .map(|path| {
                let outcome = convert(path.as_path()).map_err(|source| FileError {
                    path: path.clone(),
                    source,
                });
                pb.inc(1);
                outcome.map(ProcessingStats::from)
            })
            .try_reduce(ProcessingStats::new, |a, b| Ok(a.merge(b)))
    } else {
        Ok(files
            .par_iter()
            .map(|path| {
                let stats = match convert(path.as_path()) {
                    Ok(report) => ProcessingStats::from(report),
                    Err(e) => {
                        error!("Failed to convert {}: {}", path.display(), e);
                        ProcessingStats::failure()
                    }
                };
                pb.inc(1);
                stats
            })
            .reduce(ProcessingStats::new, ProcessingStats::merge))
    };

    match &stats {
        Ok(_) => pb.finish_with_message(format!("{} complete", label)),
        Err(_) => pb.abandon(),
    }
    stats
}

/// The detection batch: class list, output tree, one `.txt` per JSON file.
pub fn process_detection_dataset(
    args: &DetArgs,
) -> std::result::Result<ProcessingStats, Box<dyn std::error::Error>> {
    let options = RunOptions::from(args);
    let classes = ClassTable::from_file(&args.labels)?;
    info!("Class names: {:?}", classes.names());

    let files = find_json_files(&args.input_dir)?;
    let dirs = setup_output_directories(&args.output_dir, &options)?;
    info!("Found {} JSON files.", files.len());

    let ctx = ConversionContext::detection(classes, dirs);
    let stats = process_files(&files, &options, "Detection", |path| {
        convert_detection_file(path, &ctx)
    })?;
    Ok(stats)
}

/// The segmentation batch: class list with background first, a palette with
/// one colour per class, one indexed PNG per JSON file.
pub fn process_segmentation_dataset(
    args: &SegArgs,
) -> std::result::Result<ProcessingStats, Box<dyn std::error::Error>> {
    let options = RunOptions::from(args);
    let classes = ClassTable::from_file(&args.labels)?.require_background()?;
    info!("Class names: {:?}", classes.names());

    let palette = match &args.palette {
        Some(path) => ColorPalette::from_file(path)?,
        None => {
            info!("No palette given, using the VOC label colormap.");
            ColorPalette::label_colormap(classes.len())
        }
    };
    palette.ensure_len(classes.len())?;

    let files = find_json_files(&args.input_dir)?;
    let dirs = setup_output_directories(&args.output_dir, &options)?;
    info!("Found {} JSON files.", files.len());

    let ctx = ConversionContext::segmentation(classes, palette, dirs);
    let stats = process_files(&files, &options, "Segmentation", |path| {
        convert_segmentation_file(path, &ctx)
    })?;
    Ok(stats)
}
