use base64::{engine::general_purpose::STANDARD, Engine as _};
use glob::glob;
use image::RgbImage;
use log::{info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::RunOptions;
use crate::error::Result;
use crate::types::{ImageAnnotation, OutputDirs};

/// Create the output directory tree. Refuses to touch an existing directory
/// so a previous run is never overwritten.
pub fn setup_output_directories(output_dir: &Path, options: &RunOptions) -> io::Result<OutputDirs> {
    if output_dir.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Output directory already exists: {}", output_dir.display()),
        ));
    }
    fs::create_dir_all(output_dir)?;
    info!("Creating annotations: {}", output_dir.display());

    let viz = if options.visualize {
        let dir = output_dir.join("viz");
        fs::create_dir(&dir)?;
        Some(dir)
    } else {
        None
    };
    let instances = if options.instances {
        let dir = output_dir.join("instances");
        fs::create_dir(&dir)?;
        Some(dir)
    } else {
        None
    };

    Ok(OutputDirs {
        root: output_dir.to_path_buf(),
        viz,
        instances,
    })
}

/// All `*.json` files directly inside `input_dir`, sorted by path.
pub fn find_json_files(input_dir: &Path) -> std::result::Result<Vec<PathBuf>, glob::PatternError> {
    let pattern = format!(
        "{}/*.json",
        glob::Pattern::escape(&input_dir.to_string_lossy())
    );
    let mut files: Vec<PathBuf> = glob(&pattern)?
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(e) => {
                warn!("Cannot read {}: {}", e.path().display(), e.error());
                None
            }
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Pixels of the annotated image: the embedded `imageData` when present,
/// otherwise `imagePath` next to the JSON file. `None` when neither exists.
pub fn load_image(annotation: &ImageAnnotation, json_path: &Path) -> Result<Option<RgbImage>> {
    if let Some(data) = annotation.image_data.as_deref().filter(|d| !d.is_empty()) {
        let bytes = STANDARD.decode(data.trim())?;
        return Ok(Some(image::load_from_memory(&bytes)?.to_rgb8()));
    }

    if annotation.image_path.is_empty() {
        return Ok(None);
    }
    let image_path = json_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(&annotation.image_path);
    if !image_path.exists() {
        return Ok(None);
    }
    Ok(Some(image::open(&image_path)?.to_rgb8()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn annotation(image_path: &str, image_data: Option<String>) -> ImageAnnotation {
        ImageAnnotation {
            version: "5.0.1".to_string(),
            flags: None,
            shapes: vec![],
            image_path: image_path.to_string(),
            image_data,
            image_height: 2,
            image_width: 3,
        }
    }

    fn png_bytes(image: &RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn refuses_existing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let options = RunOptions {
            visualize: true,
            ..RunOptions::default()
        };
        let err = setup_output_directories(dir.path(), &options).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);

        let out = dir.path().join("out");
        let dirs = setup_output_directories(&out, &options).unwrap();
        assert_eq!(dirs.viz, Some(out.join("viz")));
        assert!(out.join("viz").is_dir());
        assert!(dirs.instances.is_none());
    }

    #[test]
    fn finds_only_top_level_json_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("a.jpg"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/c.json"), "{}").unwrap();

        let files = find_json_files(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("a.json"), dir.path().join("b.json")]);
    }

    #[test]
    fn loads_embedded_image_data() {
        let image = RgbImage::from_pixel(3, 2, Rgb([1, 2, 3]));
        let encoded = STANDARD.encode(png_bytes(&image));

        let loaded = load_image(&annotation("missing.jpg", Some(encoded)), Path::new("x.json"))
            .unwrap()
            .unwrap();
        assert_eq!(loaded, image);
    }

    #[test]
    fn falls_back_to_image_path() {
        let dir = tempfile::tempdir().unwrap();
        let image = RgbImage::from_pixel(3, 2, Rgb([9, 9, 9]));
        fs::write(dir.path().join("img.png"), png_bytes(&image)).unwrap();
        let json_path = dir.path().join("img.json");

        let loaded = load_image(&annotation("img.png", None), &json_path).unwrap();
        assert_eq!(loaded, Some(image));

        assert!(load_image(&annotation("gone.png", None), &json_path)
            .unwrap()
            .is_none());
    }

    #[test]
    fn corrupt_image_data_is_an_error() {
        let result = load_image(
            &annotation("", Some("@@not base64@@".to_string())),
            Path::new("x.json"),
        );
        assert!(result.is_err());
    }
}
