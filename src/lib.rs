//! LabelMe to detection / segmentation dataset converter
//!
//! This library turns LabelMe JSON annotations into two training formats:
//! normalized bounding-box text files for object detection, and indexed-colour
//! class label images for semantic segmentation.

pub mod class_table;
pub mod codec;
pub mod config;
pub mod conversion;
pub mod dataset;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod io;
pub mod label;
pub mod palette;
pub mod rasterize;
pub mod types;
pub mod utils;
pub mod visualize;

// Re-export commonly used types and functions
pub use class_table::{ClassTable, BACKGROUND_CLASS};
pub use codec::{decode_label_png, encode_label_png, load_label_png, save_label_png};
pub use config::{DetArgs, RunOptions, SegArgs};
pub use dataset::{process_detection_dataset, process_segmentation_dataset};
pub use detection::{shapes_to_boxes, BoxAnnotation, NormalizedBox};
pub use error::{ConvertError, ShapeError, UnknownClass};
pub use geometry::{Geometry, Vertex};
pub use label::{shapes_to_label, LabelRasters};
pub use palette::ColorPalette;
pub use rasterize::{shape_to_mask, Mask, RasterOptions};
pub use types::{ImageAnnotation, ImageSize, LabelRaster, ProcessingStats, Shape, ShapeKind};
