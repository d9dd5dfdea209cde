//! Folding an image's shapes into class and instance rasters.
//!
//! Shapes are painted strictly in list order and later shapes overwrite
//! earlier ones wherever they overlap. Shapes whose label is not in the class
//! table are left out of both rasters.

use image::Luma;
use log::debug;
use std::collections::HashMap;

use crate::class_table::ClassTable;
use crate::error::ShapeError;
use crate::rasterize::{shape_to_mask, RasterOptions};
use crate::types::{ImageSize, LabelRaster, Shape};

/// Class ids and instance ids for one image. 0 means background / no instance.
#[derive(Debug, Clone)]
pub struct LabelRasters {
    pub class: LabelRaster,
    pub instance: LabelRaster,
    /// Shapes painted into the rasters.
    pub painted: usize,
    /// Shapes dropped because their label is not a known class.
    pub skipped: usize,
}

/// Hands out instance ids, starting at 1, in first-seen order.
///
/// Shapes sharing a `(label, group_id)` share an id. A shape without a group
/// id is its own instance and always gets a fresh id.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    grouped: HashMap<(String, i64), i32>,
    next_id: i32,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, label: &str, group_id: Option<i64>) -> i32 {
        match group_id {
            Some(group_id) => {
                let key = (label.to_string(), group_id);
                if let Some(&id) = self.grouped.get(&key) {
                    return id;
                }
                let id = self.allocate();
                self.grouped.insert(key, id);
                id
            }
            None => self.allocate(),
        }
    }

    fn allocate(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    /// Number of distinct instances handed out so far.
    pub fn len(&self) -> usize {
        self.next_id as usize
    }

    pub fn is_empty(&self) -> bool {
        self.next_id == 0
    }
}

pub fn shapes_to_label(
    size: ImageSize,
    shapes: &[Shape],
    classes: &ClassTable,
    options: &RasterOptions,
) -> Result<LabelRasters, ShapeError> {
    let mut class = LabelRaster::new(size.width, size.height);
    let mut instance = LabelRaster::new(size.width, size.height);
    let mut instances = InstanceRegistry::new();
    let (mut painted, mut skipped) = (0, 0);

    for shape in shapes {
        let Some(class_id) = classes.get(&shape.label) else {
            debug!("Dropping shape with unknown label '{}'", shape.label);
            skipped += 1;
            continue;
        };
        let instance_id = instances.assign(&shape.label, shape.group_id);
        let mask = shape_to_mask(size, shape, options)?;

        let class_id = Luma([class_id as i32]);
        let instance_id = Luma([instance_id]);
        for (x, y) in mask.covered() {
            class.put_pixel(x, y, class_id);
            instance.put_pixel(x, y, instance_id);
        }
        painted += 1;
    }

    Ok(LabelRasters {
        class,
        instance,
        painted,
        skipped,
    })
}
