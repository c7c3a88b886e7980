//! Grouping of LabelMe shapes into pose instances and their YOLO pose rows.
//!
//! Conversion runs in two passes over a record's shapes. The first collects
//! every rectangle into an [`InstanceBuilder`] keyed by `group_id`, the second
//! appends each point to the builder of its group. Builders are then frozen
//! into [`Instance`]s and rendered as [`OutputRow`]s.

use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;

use crate::class_map::ClassMap;
use crate::config::{KeypointOverflow, OrphanKeypoints};
use crate::error::ConvertError;
use crate::types::{ImageAnnotation, Shape};

/// Grouping key of a shape. Shapes without a `group_id` share the `None` group.
pub type GroupKey = Option<i64>;

/// Knobs for a single conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Rows are padded with `0 0 0` triples up to this many keypoints.
    pub max_keypoints: usize,
    pub overflow: KeypointOverflow,
    pub orphans: OrphanKeypoints,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            max_keypoints: 4,
            overflow: KeypointOverflow::default(),
            orphans: OrphanKeypoints::default(),
        }
    }
}

impl ConvertOptions {
    pub fn with_max_keypoints(max_keypoints: usize) -> Self {
        Self {
            max_keypoints,
            ..Self::default()
        }
    }

    /// Field count of a row that does not overflow.
    pub fn row_width(&self) -> usize {
        5 + 3 * self.max_keypoints
    }
}

/// A keypoint in pixel space with its visibility code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    pub visibility: i64,
}

/// Mutable instance state between the two passes.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceBuilder {
    pub group_id: GroupKey,
    pub label: String,
    /// `[x1, y1, x2, y2]`, opposite corners in pixels.
    pub rect: [f64; 4],
    pub keypoints: Vec<Keypoint>,
}

/// A frozen object instance ready for emission.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    group_id: GroupKey,
    label: String,
    rect: [f64; 4],
    keypoints: Vec<Keypoint>,
}

impl Instance {
    pub fn group_id(&self) -> GroupKey {
        self.group_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn rect(&self) -> [f64; 4] {
        self.rect
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }
}

impl From<InstanceBuilder> for Instance {
    fn from(builder: InstanceBuilder) -> Self {
        Self {
            group_id: builder.group_id,
            label: builder.label,
            rect: builder.rect,
            keypoints: builder.keypoints,
        }
    }
}

/// Instance builders in first-seen order of their group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceBuilders {
    builders: Vec<InstanceBuilder>,
    index: HashMap<GroupKey, usize>,
}

impl InstanceBuilders {
    /// Insert a builder. A group seen before is overwritten in place, keeping
    /// its original position.
    pub fn insert(&mut self, builder: InstanceBuilder) {
        match self.index.get(&builder.group_id) {
            Some(&slot) => {
                debug!(
                    "Rectangle '{}' replaces an earlier rectangle of group_id {:?}",
                    builder.label, builder.group_id
                );
                self.builders[slot] = builder;
            }
            None => {
                self.index.insert(builder.group_id, self.builders.len());
                self.builders.push(builder);
            }
        }
    }

    pub fn get_mut(&mut self, group_id: GroupKey) -> Option<&mut InstanceBuilder> {
        let slot = *self.index.get(&group_id)?;
        self.builders.get_mut(slot)
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    pub fn freeze(self) -> Vec<Instance> {
        self.builders.into_iter().map(Instance::from).collect()
    }
}

/// One field of an output row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    Int(i64),
    Float(f64),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Field::Int(v) => write!(f, "{}", v),
            // whole floats keep a decimal so they never read as class ids or visibilities
            Field::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            Field::Float(v) => write!(f, "{}", v),
        }
    }
}

/// A YOLO pose row: `class cx cy w h [x y v]...`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    fields: Vec<Field>,
}

impl OutputRow {
    fn new(class_id: usize, bbox: [f64; 4]) -> Self {
        let mut fields = Vec::with_capacity(5);
        fields.push(Field::Int(class_id as i64));
        fields.extend(bbox.iter().map(|&v| Field::Float(v)));
        Self { fields }
    }

    fn push_keypoint(&mut self, x: f64, y: f64, visibility: i64) {
        self.fields
            .extend([Field::Float(x), Field::Float(y), Field::Int(visibility)]);
    }

    fn push_padding(&mut self) {
        self.fields
            .extend([Field::Int(0), Field::Int(0), Field::Int(0)]);
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn class_id(&self) -> Option<i64> {
        match self.fields.first() {
            Some(Field::Int(id)) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for OutputRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", field)?;
        }
        Ok(())
    }
}

/// Round to 6 decimals, halves away from zero.
pub fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

fn malformed(shape: &Shape, expected: usize) -> ConvertError {
    ConvertError::MalformedShape {
        label: shape.label.clone(),
        shape_type: shape.shape_type.clone(),
        expected,
        found: shape.points.len(),
    }
}

/// Opposite corners of a rectangle shape. Four-point rectangles use points 0
/// and 2; two-point rectangles use both points.
fn rectangle_corners(shape: &Shape) -> Result<[f64; 4], ConvertError> {
    let (p0, p2) = match shape.points.as_slice() {
        [p0, p1] => (p0, p1),
        [p0, _, p2, ..] => (p0, p2),
        _ => return Err(malformed(shape, 2)),
    };
    Ok([p0.0, p0.1, p2.0, p2.1])
}

/// First pass: one builder per rectangle group, last rectangle wins.
pub fn collect_instances(shapes: &[Shape]) -> Result<InstanceBuilders, ConvertError> {
    let mut builders = InstanceBuilders::default();
    for shape in shapes.iter().filter(|s| s.is_rectangle()) {
        builders.insert(InstanceBuilder {
            group_id: shape.group_id,
            label: shape.label.clone(),
            rect: rectangle_corners(shape)?,
            keypoints: Vec::new(),
        });
    }
    Ok(builders)
}

/// Second pass: append each point shape to the builder of its group.
pub fn attach_keypoints(
    builders: &mut InstanceBuilders,
    shapes: &[Shape],
    orphans: OrphanKeypoints,
) -> Result<(), ConvertError> {
    for shape in shapes.iter().filter(|s| s.is_point()) {
        let visibility =
            shape
                .label
                .trim()
                .parse::<i64>()
                .map_err(|source| ConvertError::InvalidVisibility {
                    label: shape.label.clone(),
                    source,
                })?;
        let &(x, y) = shape.points.first().ok_or_else(|| malformed(shape, 1))?;

        match builders.get_mut(shape.group_id) {
            Some(builder) => builder.keypoints.push(Keypoint { x, y, visibility }),
            None => match orphans {
                OrphanKeypoints::Error => {
                    return Err(ConvertError::DanglingKeypoint {
                        label: shape.label.clone(),
                        group_id: shape.group_id,
                    })
                }
                OrphanKeypoints::Skip => warn!(
                    "Skipping point '{}' at ({}, {}): no rectangle with group_id {:?}",
                    shape.label, x, y, shape.group_id
                ),
            },
        }
    }
    Ok(())
}

/// Render frozen instances as rows, dropping labels missing from `class_map`.
pub fn emit_rows(
    instances: &[Instance],
    image_width: f64,
    image_height: f64,
    class_map: &ClassMap,
    options: &ConvertOptions,
) -> Result<Vec<OutputRow>, ConvertError> {
    let mut rows = Vec::with_capacity(instances.len());

    for instance in instances {
        let class_id = match class_map.get(&instance.label) {
            Some(class_id) => class_id,
            None => {
                debug!(
                    "Dropping instance with unknown class '{}' (group_id {:?})",
                    instance.label, instance.group_id
                );
                continue;
            }
        };

        let usable = |v: f64| v.is_finite() && v > 0.0;
        if !usable(image_width) || !usable(image_height) {
            return Err(ConvertError::ZeroImageSize {
                width: image_width,
                height: image_height,
            });
        }
        let (w, h) = (image_width, image_height);

        let [x1, y1, x2, y2] = instance.rect;
        let bbox = [
            round6((x1 + x2) / 2.0 / w),
            round6((y1 + y2) / 2.0 / h),
            round6((x1 - x2).abs() / w),
            round6((y1 - y2).abs() / h),
        ];

        let keypoints = match options.overflow {
            _ if instance.keypoints.len() <= options.max_keypoints => &instance.keypoints[..],
            KeypointOverflow::Preserve => &instance.keypoints[..],
            KeypointOverflow::Truncate => &instance.keypoints[..options.max_keypoints],
            KeypointOverflow::Error => {
                return Err(ConvertError::TooManyKeypoints {
                    label: instance.label.clone(),
                    group_id: instance.group_id,
                    found: instance.keypoints.len(),
                    max: options.max_keypoints,
                })
            }
        };

        let mut row = OutputRow::new(class_id, bbox);
        for kp in keypoints {
            row.push_keypoint(round6(kp.x / w), round6(kp.y / h), kp.visibility);
        }
        for _ in keypoints.len()..options.max_keypoints {
            row.push_padding();
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Convert one LabelMe record into YOLO pose rows.
pub fn convert(
    annotation: &ImageAnnotation,
    class_map: &ClassMap,
    options: &ConvertOptions,
) -> Result<Vec<OutputRow>, ConvertError> {
    let mut builders = collect_instances(&annotation.shapes)?;
    attach_keypoints(&mut builders, &annotation.shapes, options.orphans)?;
    emit_rows(
        &builders.freeze(),
        annotation.image_width,
        annotation.image_height,
        class_map,
        options,
    )
}

/// Label file contents, one `\n`-terminated line per row.
pub fn format_rows(rows: &[OutputRow]) -> String {
    let mut out = String::with_capacity(rows.len() * 64);
    for row in rows {
        out.push_str(&row.to_string());
        out.push('\n');
    }
    out
}
