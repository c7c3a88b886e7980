//! Errors raised while converting a single annotation record.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure converting one LabelMe record. Any of these aborts the record
/// without touching the rest of the batch.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("point '{label}' references group_id {group_id:?}, which has no rectangle")]
    DanglingKeypoint { label: String, group_id: Option<i64> },

    #[error("point label '{label}' is not an integer visibility code")]
    InvalidVisibility {
        label: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("{shape_type} '{label}' needs at least {expected} points, found {found}")]
    MalformedShape {
        label: String,
        shape_type: String,
        expected: usize,
        found: usize,
    },

    #[error("image size {width}x{height} cannot be used for normalization")]
    ZeroImageSize { width: f64, height: f64 },

    #[error("instance '{label}' (group_id {group_id:?}) has {found} keypoints, at most {max} allowed")]
    TooManyKeypoints {
        label: String,
        group_id: Option<i64>,
        found: usize,
        max: usize,
    },

    #[error("imagePath '{0}' has no usable file name")]
    MissingImagePath(String),

    #[error("failed to parse annotation JSON")]
    Json(#[from] serde_json::Error),
}

/// Failure processing one annotation file in a batch.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The file system refused a read or write. Aborts the batch.
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The record itself is unusable. Only this file is skipped.
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

impl ProcessError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        ProcessError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, ProcessError::Io { .. })
    }
}
