use anyhow::{bail, Context};
use glob::glob;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::class_map::ClassMap;
use crate::conversion::{convert, format_rows, ConvertOptions};
use crate::error::ProcessError;
use crate::utils::{label_file_name, parse_annotation};

/// A label file written for one annotation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFile {
    pub path: PathBuf,
    pub rows: usize,
}

/// Collect the JSON files matching `pattern`, sorted by path
pub fn discover_json_files(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let entries = glob(pattern).with_context(|| format!("Invalid JSON glob pattern: {}", pattern))?;

    let mut json_paths = Vec::new();
    for entry in entries {
        let path = entry.context("Failed to read a path matched by the JSON glob")?;
        if path.is_file() {
            json_paths.push(path);
        }
    }
    json_paths.sort();
    Ok(json_paths)
}

/// Read, convert and write one annotation file into `labels_dir`
pub fn process_json_file(
    json_path: &Path,
    labels_dir: &Path,
    class_map: &ClassMap,
    options: &ConvertOptions,
) -> Result<LabelFile, ProcessError> {
    let content = fs::read_to_string(json_path).map_err(|e| ProcessError::io(json_path, e))?;
    let annotation = parse_annotation(&content)?;
    let rows = convert(&annotation, class_map, options)?;

    let label_output_path = labels_dir.join(label_file_name(&annotation.image_path)?);
    write_label_file(&label_output_path, &format_rows(&rows))
        .map_err(|e| ProcessError::io(&label_output_path, e))?;

    Ok(LabelFile {
        path: label_output_path,
        rows: rows.len(),
    })
}

fn write_label_file(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(contents.as_bytes())?;
    writer.flush()
}

/// Directory holding the images of a JSON glob such as `images/train/*.json`
pub fn images_dir_of(pattern: &str) -> PathBuf {
    let mut dir = PathBuf::new();
    let pattern = Path::new(pattern);
    let parent = pattern.parent().unwrap_or_else(|| Path::new(""));
    for component in parent.components() {
        let text = component.as_os_str().to_string_lossy();
        if text.contains(|c: char| matches!(c, '*' | '?' | '[')) {
            break;
        }
        dir.push(component);
    }
    if dir.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        dir
    }
}

/// Create the dataset.yaml file for YOLO pose training
pub fn create_dataset_yaml(
    yaml_path: &Path,
    images_dir: &Path,
    class_map: &ClassMap,
    max_keypoints: usize,
) -> anyhow::Result<()> {
    if class_map.is_empty() {
        bail!("Refusing to write {} for an empty class list", yaml_path.display());
    }
    if let Some(parent) = yaml_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let root = match yaml_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => fs::canonicalize(parent),
        None => std::env::current_dir(),
    }
    .context("Failed to resolve the dataset root")?;

    let images = images_dir.to_string_lossy();
    let mut yaml_content = format!(
        "path: {}\ntrain: {}\nval: {}\n",
        root.to_string_lossy(),
        images,
        images
    );
    yaml_content.push_str(&format!("\nkpt_shape: [{}, 3]\n", max_keypoints));
    yaml_content.push_str("\nnames:\n");
    for (id, label) in class_map.names().iter().enumerate() {
        yaml_content.push_str(&format!("    {}: {}\n", id, label));
    }

    let mut dataset_yaml = BufWriter::new(
        File::create(yaml_path)
            .with_context(|| format!("Failed to create {}", yaml_path.display()))?,
    );
    dataset_yaml.write_all(yaml_content.as_bytes())?;
    dataset_yaml.flush()?;
    Ok(())
}
