use image::{ImageBuffer, Luma};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Per-pixel integer labels (class ids or instance ids), 0 meaning none.
pub type LabelRaster = ImageBuffer<Luma<i32>, Vec<i32>>;

// The Shape struct representing one annotated shape in a LabelMe file
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Shape {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    #[serde(default)]
    pub group_id: Option<i64>,
    /// Missing or null means polygon.
    #[serde(default)]
    pub shape_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub flags: Option<HashMap<String, bool>>,
}

impl Shape {
    pub fn new(label: &str, kind: ShapeKind, points: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.to_string(),
            points,
            group_id: None,
            shape_type: Some(kind.as_str().to_string()),
            description: None,
            flags: None,
        }
    }

    pub fn with_group_id(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn kind(&self) -> ShapeKind {
        ShapeKind::from_tag(self.shape_type.as_deref())
    }
}

/// The `shape_type` tag as written by LabelMe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Line,
    Linestrip,
    Point,
    Polygon,
}

impl ShapeKind {
    /// Unrecognised or missing tags fall back to polygon.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("rectangle") => ShapeKind::Rectangle,
            Some("circle") => ShapeKind::Circle,
            Some("line") => ShapeKind::Line,
            Some("linestrip") => ShapeKind::Linestrip,
            Some("point") => ShapeKind::Point,
            _ => ShapeKind::Polygon,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Line => "line",
            ShapeKind::Linestrip => "linestrip",
            ShapeKind::Point => "point",
            ShapeKind::Polygon => "polygon",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// The ImageAnnotation struct representing the annotation information of an image
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnnotation {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub flags: Option<HashMap<String, bool>>,
    pub shapes: Vec<Shape>,
    pub image_path: String,
    #[serde(default)]
    pub image_data: Option<String>,
    pub image_height: u32,
    pub image_width: u32,
}

impl ImageAnnotation {
    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.image_height, self.image_width)
    }
}

/// Height and width of an image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub height: u32,
    pub width: u32,
}

impl ImageSize {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// Per-run counters, merged across worker threads
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub total_files_processed: usize,
    pub successful_conversions: usize,
    pub failed_conversions: usize,
    pub shapes_written: usize,
    pub shapes_skipped: usize,
    pub missing_images: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters for one file whose conversion failed.
    pub fn failure() -> Self {
        Self {
            total_files_processed: 1,
            failed_conversions: 1,
            ..Self::default()
        }
    }

    pub fn merge(mut self, other: Self) -> Self {
        self.total_files_processed += other.total_files_processed;
        self.successful_conversions += other.successful_conversions;
        self.failed_conversions += other.failed_conversions;
        self.shapes_written += other.shapes_written;
        self.shapes_skipped += other.shapes_skipped;
        self.missing_images += other.missing_images;
        self
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Total files processed: {}", self.total_files_processed);
        log::info!("Successful conversions: {}", self.successful_conversions);
        log::info!("Shapes written: {}", self.shapes_written);
        log::info!("Shapes skipped: {}", self.shapes_skipped);
        if self.missing_images > 0 {
            log::warn!(
                "Visualization skipped for {} files without image pixels",
                self.missing_images
            );
        }
        if self.failed_conversions > 0 {
            log::error!("Failed conversions: {}", self.failed_conversions);
        }
    }
}

/// What one successfully converted file contributed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileReport {
    pub shapes_written: usize,
    pub shapes_skipped: usize,
    pub missing_image: bool,
}

impl From<FileReport> for ProcessingStats {
    fn from(report: FileReport) -> Self {
        Self {
            total_files_processed: 1,
            successful_conversions: 1,
            failed_conversions: 0,
            shapes_written: report.shapes_written,
            shapes_skipped: report.shapes_skipped,
            missing_images: usize::from(report.missing_image),
        }
    }
}

// Paths of the directories a run writes into
#[derive(Debug, Clone)]
pub struct OutputDirs {
    pub root: std::path::PathBuf,
    pub viz: Option<std::path::PathBuf>,
    pub instances: Option<std::path::PathBuf>,
}
