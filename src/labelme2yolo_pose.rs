use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use labelme2yolo_pose::{process_dataset, Args};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    info!("Starting LabelMe to YOLO pose conversion...");

    match process_dataset(&args) {
        Ok(stats) if stats.failed_conversions > 0 => ExitCode::FAILURE,
        Ok(_) => {
            info!("Conversion process completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
