use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const SHAPE_RECTANGLE: &str = "rectangle";
pub const SHAPE_POINT: &str = "point";

// The Shape struct representing annotated shapes
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Shape {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    #[serde(default)]
    pub group_id: Option<i64>,
    pub shape_type: String,
}

impl Shape {
    pub fn is_rectangle(&self) -> bool {
        self.shape_type == SHAPE_RECTANGLE
    }

    pub fn is_point(&self) -> bool {
        self.shape_type == SHAPE_POINT
    }
}

// The ImageAnnotation struct representing the annotation information of an image
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnnotation {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub flags: Option<HashMap<String, bool>>,
    pub shapes: Vec<Shape>,
    pub image_path: String,
    /// Any JSON number; LabelMe writes integers, other tools write floats.
    pub image_height: f64,
    pub image_width: f64,
}

// Struct to hold processing statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub total_files_processed: usize,
    pub successful_conversions: usize,
    pub failed_conversions: usize,
    pub rows_written: usize,
    pub overwritten_label_files: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_total(&mut self) {
        self.total_files_processed += 1;
    }

    pub fn record_success(&mut self, rows: usize) {
        self.successful_conversions += 1;
        self.rows_written += rows;
    }

    pub fn increment_overwritten(&mut self) {
        self.overwritten_label_files += 1;
    }

    pub fn increment_failed(&mut self) {
        self.failed_conversions += 1;
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Total files processed: {}", self.total_files_processed);
        log::info!("Successful conversions: {}", self.successful_conversions);
        log::info!("Instance rows written: {}", self.rows_written);
        log::info!("Failed conversions: {}", self.failed_conversions);

        if self.overwritten_label_files > 0 {
            log::warn!(
                "{} label files were overwritten by records sharing an image name",
                self.overwritten_label_files
            );
        }

        if self.failed_conversions > 0 {
            log::warn!(
                "{} of {} annotation files were not converted, see the errors above",
                self.failed_conversions,
                self.total_files_processed
            );
        }
    }
}
