use image::RgbImage;
use log::{debug, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::class_table::ClassTable;
use crate::codec::encode_label_png;
use crate::detection::{format_yolo_lines, shapes_to_boxes};
use crate::error::{ConvertError, Result};
use crate::io::load_image;
use crate::label::shapes_to_label;
use crate::palette::{ColorPalette, MAX_COLORS};
use crate::rasterize::RasterOptions;
use crate::types::{FileReport, ImageAnnotation, ImageSize, OutputDirs};
use crate::utils::{output_stem, read_and_parse_json};
use crate::visualize::{draw_boxes, overlay_labels};

const OVERLAY_ALPHA: f32 = 0.5;

/// Read-only state shared by every file of a run.
#[derive(Debug, Clone)]
pub struct ConversionContext {
    pub classes: ClassTable,
    /// Class colours: the label image colour table for segmentation, box
    /// colours for detection previews.
    pub palette: ColorPalette,
    pub dirs: OutputDirs,
    pub raster: RasterOptions,
}

impl ConversionContext {
    pub fn detection(classes: ClassTable, dirs: OutputDirs) -> Self {
        let palette = ColorPalette::label_colormap(classes.len() + 1);
        Self {
            classes,
            palette,
            dirs,
            raster: RasterOptions::default(),
        }
    }

    pub fn segmentation(classes: ClassTable, palette: ColorPalette, dirs: OutputDirs) -> Self {
        Self {
            classes,
            palette,
            dirs,
            raster: RasterOptions::default(),
        }
    }
}

struct LoadedRecord {
    annotation: ImageAnnotation,
    image: Option<RgbImage>,
    size: ImageSize,
}

/// Parse the JSON and, when previews are wanted, the image it points at.
/// Geometry always uses the annotated size so outputs do not depend on
/// whether previews are enabled.
fn load_record(json_path: &Path, want_image: bool) -> Result<LoadedRecord> {
    debug!("Generating annotations from: {}", json_path.display());
    let annotation = read_and_parse_json(json_path)?;
    let size = annotation.size();
    if size.width == 0 || size.height == 0 {
        return Err(ConvertError::EmptyImage(size));
    }

    let image = if want_image {
        load_image(&annotation, json_path)?
    } else {
        None
    };
    match &image {
        Some(image) => {
            let decoded = ImageSize::new(image.height(), image.width());
            if decoded != size {
                warn!(
                    "{}: image is {} but the annotation says {}, keeping the annotated size",
                    json_path.display(),
                    decoded,
                    size
                );
            }
        }
        None if want_image => {
            warn!("{}: no image pixels, skipping visualization", json_path.display());
        }
        None => {}
    }

    Ok(LoadedRecord {
        annotation,
        image,
        size,
    })
}

/// Write `<stem>.txt` with one normalized box per rectangle shape. The file
/// is created even when the image has no rectangles.
pub fn convert_detection_file(json_path: &Path, ctx: &ConversionContext) -> Result<FileReport> {
    let record = load_record(json_path, ctx.dirs.viz.is_some())?;
    let (boxes, skipped) = shapes_to_boxes(&record.annotation.shapes, &ctx.classes)?;

    let mut report = FileReport {
        shapes_written: boxes.len(),
        shapes_skipped: skipped,
        missing_image: false,
    };
    let viz = match (&ctx.dirs.viz, &record.image) {
        (Some(_), Some(image)) => Some(draw_boxes(image, &boxes, &ctx.palette)),
        (Some(_), None) => {
            report.missing_image = true;
            None
        }
        (None, _) => None,
    };

    let stem = output_stem(json_path);
    let label_path = ctx.dirs.root.join(format!("{}.txt", stem));
    let mut writer = BufWriter::new(File::create(&label_path)?);
    writer.write_all(format_yolo_lines(&boxes, record.size).as_bytes())?;
    writer.flush()?;

    if let (Some(viz_dir), Some(viz)) = (&ctx.dirs.viz, viz) {
        viz.save(viz_dir.join(format!("{}.png", stem)))?;
    }
    Ok(report)
}

/// Write `<stem>.png` holding class ids, plus `instances/<stem>.png` and a
/// preview when those outputs are enabled. Both label images are encoded
/// before either is written, so a raster that cannot be stored leaves no
/// output behind. Instance ids share the 8-bit index range, which caps an
/// image at 254 instances.
pub fn convert_segmentation_file(json_path: &Path, ctx: &ConversionContext) -> Result<FileReport> {
    let record = load_record(json_path, ctx.dirs.viz.is_some())?;
    let rasters = shapes_to_label(
        record.size,
        &record.annotation.shapes,
        &ctx.classes,
        &ctx.raster,
    )?;

    let mut class_png = Vec::new();
    encode_label_png(&mut class_png, &rasters.class, &ctx.palette)?;
    let instance_png = match &ctx.dirs.instances {
        Some(_) => {
            let colormap = ColorPalette::label_colormap(MAX_COLORS);
            let mut bytes = Vec::new();
            encode_label_png(&mut bytes, &rasters.instance, &colormap)?;
            Some(bytes)
        }
        None => None,
    };

    let mut report = FileReport {
        shapes_written: rasters.painted,
        shapes_skipped: rasters.skipped,
        missing_image: false,
    };
    let viz = match (&ctx.dirs.viz, &record.image) {
        (Some(_), Some(image)) => Some(overlay_labels(
            image,
            &rasters.class,
            &ctx.palette,
            OVERLAY_ALPHA,
        )),
        (Some(_), None) => {
            report.missing_image = true;
            None
        }
        (None, _) => None,
    };

    let stem = output_stem(json_path);
    fs::write(ctx.dirs.root.join(format!("{}.png", stem)), class_png)?;
    if let (Some(instances_dir), Some(bytes)) = (&ctx.dirs.instances, instance_png) {
        fs::write(instances_dir.join(format!("{}.png", stem)), bytes)?;
    }
    if let (Some(viz_dir), Some(viz)) = (&ctx.dirs.viz, viz) {
        viz.save(viz_dir.join(format!("{}.png", stem)))?;
    }
    Ok(report)
}
