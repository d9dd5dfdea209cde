use log::warn;
use std::fmt;

use crate::class_table::ClassTable;
use crate::error::ConvertError;
use crate::geometry::Geometry;
use crate::types::{ImageSize, Shape, ShapeKind};

/// Axis-aligned box in pixel coordinates, corners sorted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxAnnotation {
    pub class_id: usize,
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

/// A box as the YOLO family expects it: center and size relative to the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub class_id: usize,
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoxAnnotation {
    /// Build from two opposite corners given in any order.
    pub fn from_corners(class_id: usize, (x1, y1): (f64, f64), (x2, y2): (f64, f64)) -> Self {
        Self {
            class_id,
            xmin: x1.min(x2),
            ymin: y1.min(y2),
            xmax: x1.max(x2),
            ymax: y1.max(y2),
        }
    }

    /// Width and height count pixels inclusively, hence the `+ 1`.
    pub fn normalize(&self, size: ImageSize) -> NormalizedBox {
        let (w, h) = (f64::from(size.width), f64::from(size.height));
        NormalizedBox {
            class_id: self.class_id,
            center_x: (self.xmin + self.xmax) / 2.0 / w,
            center_y: (self.ymin + self.ymax) / 2.0 / h,
            width: (self.xmax - self.xmin + 1.0) / w,
            height: (self.ymax - self.ymin + 1.0) / h,
        }
    }
}

// `{:?}` on f64 is the shortest round-trip form and keeps a trailing `.0`
impl fmt::Display for NormalizedBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} {:?} {:?} {:?}",
            self.class_id, self.center_x, self.center_y, self.width, self.height
        )
    }
}

/// Collect one box per rectangle shape.
///
/// Other shape types are skipped with a warning. A rectangle whose label is
/// not in `classes` aborts the image: every box written must have a class id.
pub fn shapes_to_boxes(
    shapes: &[Shape],
    classes: &ClassTable,
) -> Result<(Vec<BoxAnnotation>, usize), ConvertError> {
    let mut boxes = Vec::with_capacity(shapes.len());
    let mut skipped = 0;

    for shape in shapes {
        if shape.kind() != ShapeKind::Rectangle {
            warn!(
                "Skipping shape: label={}, shape_type={}",
                shape.label,
                shape.shape_type.as_deref().unwrap_or("null")
            );
            skipped += 1;
            continue;
        }

        let class_id = classes.id_of(&shape.label)?;
        let Geometry::Rectangle { corners: [a, b] } = Geometry::from_shape(shape)? else {
            continue;
        };
        boxes.push(BoxAnnotation::from_corners(class_id, (a.x, a.y), (b.x, b.y)));
    }

    Ok((boxes, skipped))
}

/// The detection label file body: one line per box, `\n` terminated.
pub fn format_yolo_lines(boxes: &[BoxAnnotation], size: ImageSize) -> String {
    let mut out = String::with_capacity(boxes.len() * 48);
    for b in boxes {
        out.push_str(&b.normalize(size).to_string());
        out.push('\n');
    }
    out
}
