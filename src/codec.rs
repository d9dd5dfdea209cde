//! Indexed-colour PNG encoding of label rasters.
//!
//! Pixel value = label, colour table = [`ColorPalette`]. Labels must lie in
//! `[-1, 254]`. The ignore label `-1` is stored in its own slot, index 255,
//! rather than being reinterpreted as a byte, and maps back to `-1` on decode.

use image::Rgb;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::CodecError;
use crate::palette::ColorPalette;
use crate::types::LabelRaster;

/// Label value for pixels downstream training should ignore.
pub const IGNORE_LABEL: i32 = -1;
/// Palette index that stores [`IGNORE_LABEL`].
pub const IGNORE_INDEX: u8 = 255;
/// Colour of the ignore slot (the VOC "void" colour).
pub const IGNORE_COLOR: Rgb<u8> = Rgb([224, 224, 192]);

/// Map every label to its palette index, rejecting anything that would not
/// survive the trip through an 8-bit index.
pub fn label_indices(raster: &LabelRaster, palette: &ColorPalette) -> Result<Vec<u8>, CodecError> {
    raster
        .pixels()
        .map(|p| match p[0] {
            IGNORE_LABEL => Ok(IGNORE_INDEX),
            value @ 0..=254 => {
                if value as usize >= palette.len() {
                    Err(CodecError::MissingColor {
                        value,
                        palette_len: palette.len(),
                    })
                } else {
                    Ok(value as u8)
                }
            }
            value => Err(CodecError::OutOfRange { value }),
        })
        .collect()
}

fn plte_bytes(palette: &ColorPalette, with_ignore: bool) -> Vec<u8> {
    let mut plte = palette.to_rgb_bytes();
    if with_ignore {
        plte.resize(usize::from(IGNORE_INDEX) * 3, 0);
        plte.extend_from_slice(&IGNORE_COLOR.0);
    }
    plte
}

pub fn encode_label_png<W: Write>(
    writer: W,
    raster: &LabelRaster,
    palette: &ColorPalette,
) -> Result<(), CodecError> {
    let indices = label_indices(raster, palette)?;
    let with_ignore = indices.contains(&IGNORE_INDEX);

    let mut encoder = png::Encoder::new(writer, raster.width(), raster.height());
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_palette(plte_bytes(palette, with_ignore));
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&indices)?;
    writer.finish()?;
    Ok(())
}

/// Write `raster` as an indexed PNG, adding `.png` if `path` lacks it.
/// Returns the path actually written.
pub fn save_label_png(
    path: &Path,
    raster: &LabelRaster,
    palette: &ColorPalette,
) -> Result<PathBuf, CodecError> {
    let path = if path.extension().is_some_and(|ext| ext == "png") {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".png");
        PathBuf::from(name)
    };

    // Validate before creating the file so a bad raster leaves nothing behind.
    label_indices(raster, palette)?;
    let file = BufWriter::new(File::create(&path)?);
    encode_label_png(file, raster, palette)?;
    Ok(path)
}

/// Read an 8-bit indexed PNG back into labels and its colour table.
pub fn decode_label_png<R: Read>(reader: R) -> Result<(LabelRaster, ColorPalette), CodecError> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::IDENTITY);
    let mut reader = decoder.read_info()?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    if info.color_type != png::ColorType::Indexed || info.bit_depth != png::BitDepth::Eight {
        return Err(CodecError::NotIndexed(format!(
            "{:?} at {:?}",
            info.color_type, info.bit_depth
        )));
    }

    let colors = reader
        .info()
        .palette
        .as_deref()
        .unwrap_or_default()
        .chunks_exact(3)
        .take(crate::palette::MAX_COLORS)
        .map(|c| Rgb([c[0], c[1], c[2]]))
        .collect::<Vec<_>>();
    let palette = ColorPalette::new(colors).map_err(|e| CodecError::NotIndexed(e.to_string()))?;

    let (width, height) = (info.width, info.height);
    let mut raster = LabelRaster::new(width, height);
    for (y, row) in buf.chunks_exact(info.line_size).take(height as usize).enumerate() {
        for (x, &index) in row.iter().take(width as usize).enumerate() {
            let value = if index == IGNORE_INDEX {
                IGNORE_LABEL
            } else {
                i32::from(index)
            };
            raster.put_pixel(x as u32, y as u32, image::Luma([value]));
        }
    }

    Ok((raster, palette))
}

pub fn load_label_png(path: &Path) -> Result<(LabelRaster, ColorPalette), CodecError> {
    decode_label_png(BufReader::new(File::open(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn raster_from(width: u32, height: u32, values: &[i32]) -> LabelRaster {
        LabelRaster::from_raw(width, height, values.to_vec()).unwrap()
    }

    fn encode(raster: &LabelRaster, palette: &ColorPalette) -> Result<Vec<u8>, CodecError> {
        let mut bytes = Vec::new();
        encode_label_png(&mut bytes, raster, palette)?;
        Ok(bytes)
    }

    #[test]
    fn every_valid_label_round_trips() {
        let palette = ColorPalette::label_colormap(255);
        let values: Vec<i32> = (0..=254).collect();
        let raster = raster_from(15, 17, &values);

        let bytes = encode(&raster, &palette).unwrap();
        let (decoded, decoded_palette) = decode_label_png(bytes.as_slice()).unwrap();

        assert_eq!(decoded.dimensions(), (15, 17));
        assert_eq!(decoded.as_raw(), raster.as_raw());
        assert_eq!(decoded_palette, palette);
    }

    #[test]
    fn palette_is_attached_as_color_table() {
        let palette = ColorPalette::new(vec![Rgb([0, 0, 0]), Rgb([10, 20, 30])]).unwrap();
        let raster = raster_from(2, 1, &[0, 1]);

        let bytes = encode(&raster, &palette).unwrap();
        let (_, decoded_palette) = decode_label_png(bytes.as_slice()).unwrap();
        assert_eq!(decoded_palette.color(1), Some(Rgb([10, 20, 30])));

        let rgb = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(rgb.get_pixel(1, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn ignore_label_gets_its_own_slot() {
        let palette = ColorPalette::label_colormap(3);
        let raster = raster_from(3, 1, &[0, IGNORE_LABEL, 2]);

        let bytes = encode(&raster, &palette).unwrap();
        let (decoded, decoded_palette) = decode_label_png(bytes.as_slice()).unwrap();
        assert_eq!(decoded.get_pixel(1, 0), &Luma([IGNORE_LABEL]));
        assert_eq!(decoded.get_pixel(2, 0), &Luma([2]));

        let rgb = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(rgb.get_pixel(1, 0), &IGNORE_COLOR);
        assert_eq!(decoded_palette.color(2), palette.color(2));
    }

    #[test]
    fn out_of_range_labels_are_rejected() {
        let palette = ColorPalette::label_colormap(255);
        for bad in [-2, 255, 1000] {
            let raster = raster_from(1, 1, &[bad]);
            assert!(matches!(
                encode(&raster, &palette),
                Err(CodecError::OutOfRange { value }) if value == bad
            ));
        }
    }

    #[test]
    fn labels_without_a_colour_are_rejected() {
        let palette = ColorPalette::label_colormap(2);
        let raster = raster_from(1, 1, &[5]);
        assert!(matches!(
            encode(&raster, &palette),
            Err(CodecError::MissingColor { value: 5, palette_len: 2 })
        ));
    }

    #[test]
    fn save_appends_png_extension_and_leaves_no_file_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let palette = ColorPalette::label_colormap(2);

        let written = save_label_png(&dir.path().join("label"), &raster_from(1, 1, &[1]), &palette)
            .unwrap();
        assert_eq!(written, dir.path().join("label.png"));
        let (decoded, _) = load_label_png(&written).unwrap();
        assert_eq!(decoded.get_pixel(0, 0), &Luma([1]));

        let bad = dir.path().join("bad.png");
        assert!(save_label_png(&bad, &raster_from(1, 1, &[300]), &palette).is_err());
        assert!(!bad.exists());
    }

    #[test]
    fn rgb_png_is_not_a_label_image() {
        let mut bytes = Vec::new();
        image::RgbImage::new(2, 2)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        assert!(matches!(
            decode_label_png(bytes.as_slice()),
            Err(CodecError::NotIndexed(_))
        ));
    }
}
