use std::fs;
use std::path::Path;

use labelme2yolo_pose::io::{discover_json_files, images_dir_of};
use labelme2yolo_pose::{
    process_dataset, process_json_file, Args, ClassMap, ConvertOptions, KeypointOverflow,
    OrphanKeypoints, ProcessError,
};

const PEN_JSON: &str = r#"{
    "version": "2.4.4",
    "flags": {},
    "shapes": [
        {"label": "pen", "points": [[0, 0], [50, 0], [50, 100], [0, 100]], "group_id": 0, "shape_type": "rectangle"},
        {"label": "2", "points": [[10, 20]], "group_id": 0, "shape_type": "point"},
        {"label": "1", "points": [[40, 80]], "group_id": 0, "shape_type": "point"},
        {"label": "cat", "points": [[60, 0], [100, 0], [100, 40], [60, 40]], "group_id": 1, "shape_type": "rectangle"}
    ],
    "imagePath": "..\\images\\train\\pen_0001.jpg",
    "imageData": null,
    "imageHeight": 200,
    "imageWidth": 100
}"#;

const DANGLING_JSON: &str = r#"{
    "shapes": [
        {"label": "pen", "points": [[0, 0], [50, 0], [50, 100], [0, 100]], "group_id": 0, "shape_type": "rectangle"},
        {"label": "1", "points": [[40, 80]], "group_id": 9, "shape_type": "point"}
    ],
    "imagePath": "pen_0002.jpg",
    "imageHeight": 200,
    "imageWidth": 100
}"#;

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn args_for(root: &Path) -> Args {
    Args {
        classes: root.join("labels/classes.txt"),
        output_dir: root.join("labels/train"),
        json_glob: format!("{}/images/train/*.json", root.display()),
        key_point_count: 2,
        overflow: KeypointOverflow::Preserve,
        orphan_keypoints: OrphanKeypoints::Error,
        dataset_yaml: None,
    }
}

#[test]
fn test_process_json_file_writes_label_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let json_path = temp_dir.path().join("pen_0001.json");
    write(&json_path, PEN_JSON);
    let labels_dir = temp_dir.path().join("labels");
    fs::create_dir_all(&labels_dir).unwrap();

    let class_map = ClassMap::from_names(["pen"]);
    let label_file = process_json_file(
        &json_path,
        &labels_dir,
        &class_map,
        &ConvertOptions::with_max_keypoints(2),
    )
    .unwrap();

    assert_eq!(label_file.path, labels_dir.join("pen_0001.txt"));
    assert_eq!(label_file.rows, 1);
    assert_eq!(
        fs::read_to_string(&label_file.path).unwrap(),
        "0 0.25 0.25 0.5 0.5 0.1 0.1 2 0.4 0.4 1\n"
    );
}

#[test]
fn test_process_json_file_error_kinds() {
    let temp_dir = tempfile::tempdir().unwrap();
    let labels_dir = temp_dir.path().join("labels");
    fs::create_dir_all(&labels_dir).unwrap();
    let class_map = ClassMap::from_names(["pen"]);
    let options = ConvertOptions::default();

    let missing = process_json_file(
        &temp_dir.path().join("missing.json"),
        &labels_dir,
        &class_map,
        &options,
    )
    .unwrap_err();
    assert!(missing.is_fatal());
    assert!(matches!(missing, ProcessError::Io { .. }));

    let dangling_path = temp_dir.path().join("pen_0002.json");
    write(&dangling_path, DANGLING_JSON);
    let dangling = process_json_file(&dangling_path, &labels_dir, &class_map, &options).unwrap_err();
    assert!(!dangling.is_fatal());
    assert!(!labels_dir.join("pen_0002.txt").exists());
}

#[test]
fn test_process_dataset_skips_bad_records() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    write(&root.join("labels/classes.txt"), "pen\ncup\n");
    write(&root.join("images/train/pen_0001.json"), PEN_JSON);
    write(&root.join("images/train/pen_0002.json"), DANGLING_JSON);
    write(&root.join("images/train/broken.json"), "{ not json");

    let stats = process_dataset(&args_for(root)).unwrap();

    assert_eq!(stats.total_files_processed, 3);
    assert_eq!(stats.successful_conversions, 1);
    assert_eq!(stats.failed_conversions, 2);
    assert_eq!(stats.rows_written, 1);

    let written: Vec<_> = fs::read_dir(root.join("labels/train"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(written, vec!["pen_0001.txt".to_string()]);
}

#[test]
fn test_process_dataset_skip_policy_converts_dangling_record() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    write(&root.join("labels/classes.txt"), "pen\n");
    write(&root.join("images/train/pen_0002.json"), DANGLING_JSON);

    let mut args = args_for(root);
    args.orphan_keypoints = OrphanKeypoints::Skip;
    let stats = process_dataset(&args).unwrap();

    assert_eq!(stats.successful_conversions, 1);
    assert_eq!(
        fs::read_to_string(root.join("labels/train/pen_0002.txt")).unwrap(),
        "0 0.25 0.25 0.5 0.5 0 0 0 0 0 0\n"
    );
}

#[test]
fn test_process_dataset_counts_colliding_label_files() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    write(&root.join("labels/classes.txt"), "pen\n");
    write(&root.join("images/train/a/pen_0001.json"), PEN_JSON);
    write(&root.join("images/train/b/pen_0001.json"), PEN_JSON);

    let mut args = args_for(root);
    args.json_glob = format!("{}/images/train/*/*.json", root.display());
    let stats = process_dataset(&args).unwrap();

    assert_eq!(stats.successful_conversions, 2);
    assert_eq!(stats.overwritten_label_files, 1);
    assert!(root.join("labels/train/pen_0001.txt").exists());
}

#[test]
fn test_process_dataset_requires_class_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    write(&root.join("images/train/pen_0001.json"), PEN_JSON);

    assert!(process_dataset(&args_for(root)).is_err());
    assert!(!root.join("labels/train").exists());
}

#[test]
fn test_process_dataset_writes_dataset_yaml() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    write(&root.join("labels/classes.txt"), "pen\ncup\n");
    write(&root.join("images/train/pen_0001.json"), PEN_JSON);

    let mut args = args_for(root);
    args.dataset_yaml = Some(root.join("dataset.yaml"));
    process_dataset(&args).unwrap();

    let yaml_content = fs::read_to_string(root.join("dataset.yaml")).unwrap();
    assert!(yaml_content.contains("path:"));
    assert!(yaml_content.contains("images/train"));
    assert!(yaml_content.contains("kpt_shape: [2, 3]"));
    assert!(yaml_content.contains("names:"));
    assert!(yaml_content.contains("0: pen"));
    assert!(yaml_content.contains("1: cup"));
}

#[test]
fn test_discover_json_files_is_sorted() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();
    write(&root.join("b.json"), "{}");
    write(&root.join("a.json"), "{}");
    write(&root.join("c.txt"), "");

    let found = discover_json_files(&format!("{}/*.json", root.display())).unwrap();

    assert_eq!(found, vec![root.join("a.json"), root.join("b.json")]);
    assert!(discover_json_files("images/[").is_err());
}

#[test]
fn test_images_dir_of() {
    assert_eq!(images_dir_of("images/train/*.json"), Path::new("images/train"));
    assert_eq!(images_dir_of("data/**/*.json"), Path::new("data"));
    assert_eq!(images_dir_of("*.json"), Path::new("."));
}
