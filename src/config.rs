use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

use crate::conversion::ConvertOptions;

/// Command-line arguments for converting LabelMe JSON to YOLO pose labels.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Class file, one class name per line (line index is the class id)
    #[arg(long = "classes", default_value = "labels/classes.txt")]
    pub classes: PathBuf,

    /// Directory receiving the YOLO pose label files
    #[arg(short = 'o', long = "output_dir", default_value = "labels/train")]
    pub output_dir: PathBuf,

    /// Glob pattern selecting the LabelMe JSON files
    #[arg(short = 'i', long = "json_glob", default_value = "images/train/*.json")]
    pub json_glob: String,

    /// Number of keypoints per row; instances with fewer are zero-padded
    #[arg(
        short = 'k',
        long = "key_point_count",
        default_value_t = 4,
        value_parser = validate_key_point_count
    )]
    pub key_point_count: usize,

    /// What to do with instances carrying more keypoints than key_point_count
    #[arg(long = "overflow", value_enum, default_value = "preserve")]
    pub overflow: KeypointOverflow,

    /// What to do with points whose group_id has no rectangle
    #[arg(long = "orphan_keypoints", value_enum, default_value = "error")]
    pub orphan_keypoints: OrphanKeypoints,

    /// Also write a dataset.yaml describing the pose dataset to this path
    #[arg(long = "dataset_yaml")]
    pub dataset_yaml: Option<PathBuf>,
}

impl Args {
    pub fn to_convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            max_keypoints: self.key_point_count,
            overflow: self.overflow,
            orphans: self.orphan_keypoints,
        }
    }
}

// Handling of instances with more keypoints than the padded row width
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum KeypointOverflow {
    /// Keep every keypoint; the row grows past the fixed width
    #[default]
    Preserve,
    /// Drop keypoints beyond key_point_count
    Truncate,
    /// Reject the record
    Error,
}

// Handling of points that reference a group without a rectangle
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum OrphanKeypoints {
    /// Reject the record
    #[default]
    Error,
    /// Drop the point and log a warning
    Skip,
}

// The keypoint count must be a positive integer
pub fn validate_key_point_count(s: &str) -> Result<usize, String> {
    match usize::from_str(s) {
        Ok(val) if val > 0 => Ok(val),
        _ => Err("KEY_POINT_COUNT must be a positive integer".to_string()),
    }
}
