//! LabelMe to YOLO pose converter
//!
//! This library converts LabelMe rectangle and point annotations into YOLO pose
//! label files: one row per object instance, holding the class id, the
//! normalized bounding box and the normalized keypoints of the instance.

pub mod class_map;
pub mod config;
pub mod conversion;
pub mod dataset;
pub mod error;
pub mod io;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use class_map::ClassMap;
pub use config::{Args, KeypointOverflow, OrphanKeypoints};
pub use conversion::{convert, format_rows, ConvertOptions, Instance, Keypoint, OutputRow};
pub use dataset::process_dataset;
pub use error::{ConvertError, ProcessError};
pub use io::{process_json_file, LabelFile};
pub use types::{ImageAnnotation, ProcessingStats, Shape};
