use anyhow::Context;
use log::{error, info, warn};
use std::collections::HashSet;

use crate::class_map::ClassMap;
use crate::config::Args;
use crate::io::{create_dataset_yaml, discover_json_files, images_dir_of, process_json_file};
use crate::types::ProcessingStats;
use crate::utils::{create_output_directory, create_progress_bar};

/// Main conversion pipeline. Records are handled one after another; a record
/// that fails to convert is logged and skipped, I/O failures abort the run.
pub fn process_dataset(args: &Args) -> anyhow::Result<ProcessingStats> {
    let class_map = ClassMap::load(&args.classes)
        .with_context(|| format!("Failed to read class file {}", args.classes.display()))?;
    info!(
        "Loaded {} classes from {}",
        class_map.len(),
        args.classes.display()
    );

    let labels_dir = create_output_directory(&args.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            args.output_dir.display()
        )
    })?;

    let json_paths = discover_json_files(&args.json_glob)?;
    info!(
        "Found {} JSON files matching {}",
        json_paths.len(),
        args.json_glob
    );

    let options = args.to_convert_options();
    let mut stats = ProcessingStats::new();
    let pb = create_progress_bar(json_paths.len());
    let mut written = HashSet::new();

    for json_path in &json_paths {
        stats.increment_total();
        pb.println(format!("In: {}", json_path.display()));
        if let Some(name) = json_path.file_name() {
            pb.set_message(name.to_string_lossy().into_owned());
        }

        match process_json_file(json_path, &labels_dir, &class_map, &options) {
            Ok(label_file) => {
                pb.println(format!("Out: {}", label_file.path.display()));
                if !written.insert(label_file.path.clone()) {
                    warn!(
                        "{} overwrote a label file already written in this run: {}",
                        json_path.display(),
                        label_file.path.display()
                    );
                    stats.increment_overwritten();
                }
                stats.record_success(label_file.rows);
            }
            Err(e) if e.is_fatal() => {
                pb.abandon();
                return Err(e).with_context(|| {
                    format!("Aborting after failure on {}", json_path.display())
                });
            }
            Err(e) => {
                error!("Failed to convert {}: {:#}", json_path.display(), anyhow::Error::new(e));
                stats.increment_failed();
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Conversion complete");

    if let Some(yaml_path) = &args.dataset_yaml {
        info!("Creating {}...", yaml_path.display());
        create_dataset_yaml(
            yaml_path,
            &images_dir_of(&args.json_glob),
            &class_map,
            options.max_keypoints,
        )?;
    }

    stats.print_summary();
    Ok(stats)
}
