use thiserror::Error;

use crate::types::ImageSize;

/// A shape whose point count does not fit its `shape_type`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeError {
    #[error("shape '{label}' of shape_type={kind} must have {expected} points, found {found}")]
    Arity {
        label: String,
        kind: &'static str,
        expected: &'static str,
        found: usize,
    },
}

/// A label that is not part of the class table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown class '{0}'")]
pub struct UnknownClass(pub String);

#[derive(Error, Debug)]
pub enum ClassTableError {
    #[error("Failed to read class list: {0}")]
    Io(#[from] std::io::Error),

    #[error("Class list is empty")]
    Empty,

    #[error("Duplicate class name '{name}' at entry {index}")]
    Duplicate { name: String, index: usize },

    #[error("First class must be '{expected}', found '{found}'")]
    MissingBackground {
        expected: &'static str,
        found: String,
    },
}

#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Failed to read palette: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid colour at line {line}: '{text}'")]
    Parse { line: usize, text: String },

    #[error("Palette has {colors} colours but the class list has {classes} classes")]
    CountMismatch { classes: usize, colors: usize },

    #[error("Palette has {0} colours, at most 255 are supported")]
    TooManyColors(usize),
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Label value {value} is outside [-1, 254], cannot save as an indexed PNG")]
    OutOfRange { value: i32 },

    #[error("Label value {value} has no colour, palette has {palette_len} entries")]
    MissingColor { value: i32, palette_len: usize },

    #[error("Expected an 8-bit indexed PNG, found {0}")]
    NotIndexed(String),

    #[error("PNG encoding error: {0}")]
    Encoding(#[from] png::EncodingError),

    #[error("PNG decoding error: {0}")]
    Decoding(#[from] png::DecodingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything that can abort the conversion of a single annotation file.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid image data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Image size {0} has no pixels")]
    EmptyImage(ImageSize),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    UnknownClass(#[from] UnknownClass),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// A [`ConvertError`] tagged with the file it happened in.
#[derive(Error, Debug)]
#[error("{}: {}", .path.display(), .source)]
pub struct FileError {
    pub path: std::path::PathBuf,
    #[source]
    pub source: ConvertError,
}

pub type Result<T> = std::result::Result<T, ConvertError>;
