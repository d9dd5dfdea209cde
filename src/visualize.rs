//! Preview images for a quick visual check of the converted labels.

use image::{imageops, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::detection::BoxAnnotation;
use crate::palette::ColorPalette;
use crate::rasterize::clamped_pixel;
use crate::types::LabelRaster;

const BOX_THICKNESS: u32 = 2;

fn class_color(colormap: &ColorPalette, id: usize) -> Rgb<u8> {
    if colormap.is_empty() {
        return Rgb([255, 0, 0]);
    }
    colormap.color(id % colormap.len()).unwrap_or(Rgb([255, 0, 0]))
}

/// Outline every box on a copy of `image`, coloured by class.
pub fn draw_boxes(image: &RgbImage, boxes: &[BoxAnnotation], colormap: &ColorPalette) -> RgbImage {
    let mut canvas = image.clone();
    for b in boxes {
        // Skip black (id 0 of the VOC colormap) so every class stays visible.
        let color = class_color(colormap, b.class_id + 1);
        let (w, h) = canvas.dimensions();
        let (left, top) = (clamped_pixel(b.xmin, w), clamped_pixel(b.ymin, h));
        let (right, bottom) = (clamped_pixel(b.xmax, w), clamped_pixel(b.ymax, h));
        for inset in 0..BOX_THICKNESS as i32 {
            let width = right - left + 1 - 2 * inset;
            let height = bottom - top + 1 - 2 * inset;
            if width <= 0 || height <= 0 {
                break;
            }
            let rect = Rect::at(left + inset, top + inset).of_size(width as u32, height as u32);
            draw_hollow_rect_mut(&mut canvas, rect, color);
        }
    }
    canvas
}

/// Greyscale copy of `image` with every labelled pixel tinted by its class
/// colour. Background (0) and ignore (-1) pixels stay grey.
pub fn overlay_labels(
    image: &RgbImage,
    labels: &LabelRaster,
    palette: &ColorPalette,
    alpha: f32,
) -> RgbImage {
    let gray = imageops::grayscale(image);
    let mut canvas = RgbImage::new(image.width(), image.height());

    for (x, y, out) in canvas.enumerate_pixels_mut() {
        let g = gray.get_pixel(x, y)[0];
        let label = labels.get_pixel_checked(x, y).map_or(0, |p| p[0]);
        *out = match usize::try_from(label) {
            Ok(id) if id > 0 => blend(g, class_color(palette, id), alpha),
            _ => Rgb([g, g, g]),
        };
    }
    canvas
}

fn blend(gray: u8, color: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let mix = |c: u8| (f32::from(c) * alpha + f32::from(gray) * (1.0 - alpha)).round() as u8;
    Rgb([mix(color[0]), mix(color[1]), mix(color[2])])
}
