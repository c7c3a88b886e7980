use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConvertError;
use crate::types::ImageAnnotation;

/// Parse one LabelMe record
pub fn parse_annotation(content: &str) -> Result<ImageAnnotation, ConvertError> {
    Ok(serde_json::from_str(content)?)
}

/// Label file name for a record: base name of `imagePath` with a `.txt` extension.
///
/// Both `/` and `\` count as separators, since LabelMe writes the path of the
/// machine the image was labeled on.
pub fn label_file_name(image_path: &str) -> Result<String, ConvertError> {
    let base = image_path
        .rsplit(&['/', '\\'][..])
        .next()
        .unwrap_or_default();
    // a leading dot belongs to the name, not to an extension
    let stem = match base.rfind('.') {
        Some(dot) if base[..dot].chars().any(|c| c != '.') => &base[..dot],
        _ => base,
    };
    let sanitized = sanitize_filename::sanitize(stem);
    if sanitized.is_empty() {
        return Err(ConvertError::MissingImagePath(image_path.to_string()));
    }
    Ok(format!("{}.txt", sanitized))
}

const PROGRESS_TEMPLATE: &str =
    "{prefix:.bold} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}";

/// Progress bar over the annotation files of a run. The message slot shows the
/// file currently being converted.
pub fn create_progress_bar(json_files: usize) -> ProgressBar {
    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    ProgressBar::new(json_files as u64)
        .with_style(style)
        .with_prefix("labels")
}

/// Create the output directory if needed. Existing label files are kept.
pub fn create_output_directory(path: &Path) -> std::io::Result<PathBuf> {
    if path.exists() {
        log::debug!("Output directory {:?} already exists", path);
    } else {
        fs::create_dir_all(path)?;
    }
    Ok(path.to_path_buf())
}
