use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use labelme2dataset::{process_detection_dataset, DetArgs};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = DetArgs::parse();

    if !args.input_dir.is_dir() {
        error!(
            "The specified input_dir does not exist: {}",
            args.input_dir.display()
        );
        return ExitCode::FAILURE;
    }

    info!("Starting LabelMe to detection conversion...");

    match process_detection_dataset(&args) {
        Ok(stats) => {
            stats.print_summary();
            if stats.failed_conversions > 0 {
                ExitCode::FAILURE
            } else {
                info!("Conversion process completed successfully.");
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("Failed to process dataset: {}", e);
            ExitCode::FAILURE
        }
    }
}
