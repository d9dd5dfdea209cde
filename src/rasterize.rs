//! Shape rasterization onto a binary pixel mask.

use image::{GrayImage, Luma};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut,
};
use imageproc::point::Point;
use imageproc::rect::Rect;

use crate::error::ShapeError;
use crate::geometry::{Geometry, Vertex};
use crate::types::{ImageSize, Shape};

const ON: Luma<u8> = Luma([255]);

/// Stroke settings for shapes that have no area of their own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Stroke width of `line` and `linestrip` shapes.
    pub line_width: f64,
    /// Disk radius drawn for `point` shapes.
    pub point_radius: f64,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            line_width: 10.0,
            point_radius: 5.0,
        }
    }
}

/// Binary coverage of one shape, `height` x `width`.
#[derive(Debug, Clone)]
pub struct Mask {
    canvas: GrayImage,
}

impl Mask {
    pub fn new(size: ImageSize) -> Self {
        Self {
            canvas: GrayImage::new(size.width, size.height),
        }
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    /// Whether pixel (x, y) is covered. Out-of-bounds pixels never are.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height() && self.canvas.get_pixel(x, y)[0] != 0
    }

    /// Covered pixel coordinates in row-major order.
    pub fn covered(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] != 0)
            .map(|(x, y, _)| (x, y))
    }

    pub fn area(&self) -> usize {
        self.canvas.pixels().filter(|p| p[0] != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.canvas.pixels().all(|p| p[0] == 0)
    }
}

/// Rasterize a LabelMe shape, checking its point count first.
pub fn shape_to_mask(
    size: ImageSize,
    shape: &Shape,
    options: &RasterOptions,
) -> Result<Mask, ShapeError> {
    let geometry = Geometry::from_shape(shape)?;
    Ok(geometry_to_mask(size, &geometry, options))
}

pub fn geometry_to_mask(size: ImageSize, geometry: &Geometry, options: &RasterOptions) -> Mask {
    let mut mask = Mask::new(size);
    if size.width == 0 || size.height == 0 {
        return mask;
    }
    let canvas = &mut mask.canvas;

    match geometry {
        Geometry::Rectangle { corners: [a, b] } => {
            let (x0, x1) = sorted(a.x, b.x);
            let (y0, y1) = sorted(a.y, b.y);
            fill_rect(canvas, x0, y0, x1, y1);
        }
        Geometry::Circle { center, rim } => {
            fill_disk(canvas, center, center.distance(rim));
        }
        Geometry::Polyline(vertices) => {
            for pair in vertices.windows(2) {
                stroke_segment(canvas, &pair[0], &pair[1], options.line_width);
            }
        }
        Geometry::Point(center) => {
            fill_disk(canvas, center, options.point_radius);
        }
        Geometry::Polygon(vertices) => {
            fill_polygon(canvas, vertices);
        }
    }

    mask
}

fn sorted(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn pixel(v: f64) -> i32 {
    v.round() as i32
}

/// Rounded coordinate pulled into `[-1, limit]`. Anything past the canvas
/// edge draws the same, and the span arithmetic stays in range.
pub(crate) fn clamped_pixel(v: f64, limit: u32) -> i32 {
    v.round().clamp(-1.0, f64::from(limit)) as i32
}

fn fill_rect(canvas: &mut GrayImage, x0: f64, y0: f64, x1: f64, y1: f64) {
    let (w, h) = canvas.dimensions();
    let (left, top) = (clamped_pixel(x0, w), clamped_pixel(y0, h));
    let (right, bottom) = (clamped_pixel(x1, w), clamped_pixel(y1, h));
    let width = (right - left + 1).max(1) as u32;
    let height = (bottom - top + 1).max(1) as u32;
    draw_filled_rect_mut(canvas, Rect::at(left, top).of_size(width, height), ON);
}

fn fill_disk(canvas: &mut GrayImage, center: &Vertex, radius: f64) {
    draw_filled_circle_mut(canvas, (pixel(center.x), pixel(center.y)), pixel(radius), ON);
}

/// Filled polygon, edges included. Collapses to a line or a single pixel
/// when rounding leaves fewer than three distinct vertices.
fn fill_polygon(canvas: &mut GrayImage, vertices: &[Vertex]) {
    let mut points: Vec<Point<i32>> = Vec::with_capacity(vertices.len());
    for v in vertices {
        let p = Point::new(pixel(v.x), pixel(v.y));
        if points.last() != Some(&p) {
            points.push(p);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    match points.len() {
        0 => {}
        1 => {
            let p = points[0];
            draw_line_segment_mut(canvas, (p.x as f32, p.y as f32), (p.x as f32, p.y as f32), ON);
        }
        2 => {
            let (a, b) = (points[0], points[1]);
            draw_line_segment_mut(canvas, (a.x as f32, a.y as f32), (b.x as f32, b.y as f32), ON);
        }
        _ => draw_polygon_mut(canvas, &points, ON),
    }
}

/// One wide segment as a filled quadrilateral, without end caps or joins.
fn stroke_segment(canvas: &mut GrayImage, a: &Vertex, b: &Vertex, width: f64) {
    let length = a.distance(b);
    if length == 0.0 {
        fill_disk(canvas, a, width / 2.0);
        return;
    }
    let half = width / 2.0;
    let nx = -(b.y - a.y) / length * half;
    let ny = (b.x - a.x) / length * half;
    let quad = [
        Vertex::new(a.x + nx, a.y + ny),
        Vertex::new(b.x + nx, b.y + ny),
        Vertex::new(b.x - nx, b.y - ny),
        Vertex::new(a.x - nx, a.y - ny),
    ];
    fill_polygon(canvas, &quad);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ShapeKind;

    fn size(h: u32, w: u32) -> ImageSize {
        ImageSize::new(h, w)
    }

    #[test]
    fn rectangle_covers_inclusive_corners() {
        let shape = Shape::new("r", ShapeKind::Rectangle, vec![(5.0, 5.0), (15.0, 15.0)]);
        let mask = shape_to_mask(size(32, 32), &shape, &RasterOptions::default()).unwrap();

        for y in 5..=15 {
            for x in 5..=15 {
                assert!(mask.contains(x, y), "pixel ({}, {}) should be covered", x, y);
            }
        }
        assert!(!mask.contains(0, 0));
        assert!(!mask.contains(16, 16));
        assert_eq!(mask.area(), 11 * 11);
    }

    #[test]
    fn rectangle_corner_order_does_not_matter() {
        let options = RasterOptions::default();
        let forward = Shape::new("r", ShapeKind::Rectangle, vec![(2.0, 3.0), (8.0, 9.0)]);
        let reversed = Shape::new("r", ShapeKind::Rectangle, vec![(8.0, 3.0), (2.0, 9.0)]);
        let a = shape_to_mask(size(12, 12), &forward, &options).unwrap();
        let b = shape_to_mask(size(12, 12), &reversed, &options).unwrap();
        assert_eq!(a.covered().collect::<Vec<_>>(), b.covered().collect::<Vec<_>>());
    }

    #[test]
    fn circle_radius_comes_from_rim_point() {
        let shape = Shape::new("c", ShapeKind::Circle, vec![(10.0, 10.0), (13.0, 10.0)]);
        let mask = shape_to_mask(size(32, 32), &shape, &RasterOptions::default()).unwrap();
        assert!(mask.contains(10, 10));
        assert!(mask.contains(13, 10));
        assert!(!mask.contains(10, 20));
        assert!(!mask.contains(15, 10));
    }

    #[test]
    fn point_draws_a_disk() {
        let shape = Shape::new("p", ShapeKind::Point, vec![(10.0, 10.0)]);
        let mask = shape_to_mask(size(32, 32), &shape, &RasterOptions::default()).unwrap();
        assert!(mask.contains(10, 10));
        assert!(mask.contains(14, 10));
        assert!(!mask.contains(17, 10));
    }

    #[test]
    fn line_is_stroked_with_width() {
        let shape = Shape::new("l", ShapeKind::Line, vec![(2.0, 20.0), (30.0, 20.0)]);
        let mask = shape_to_mask(size(40, 40), &shape, &RasterOptions::default()).unwrap();
        assert!(mask.contains(16, 20));
        assert!(mask.contains(16, 17));
        assert!(mask.contains(16, 23));
        assert!(!mask.contains(16, 10));
        assert!(!mask.contains(16, 30));
    }

    #[test]
    fn linestrip_does_not_close_the_path() {
        let shape = Shape::new(
            "l",
            ShapeKind::Linestrip,
            vec![(5.0, 5.0), (30.0, 5.0), (30.0, 30.0)],
        );
        let mask = shape_to_mask(size(40, 40), &shape, &RasterOptions::default()).unwrap();
        assert!(mask.contains(17, 5));
        assert!(mask.contains(30, 17));
        assert!(mask.contains(33, 20));
        // Midpoint of the edge from the last vertex back to the first.
        assert!(!mask.contains(17, 17));
        assert!(!mask.contains(12, 20));
    }

    #[test]
    fn diagonal_line_follows_the_segment() {
        let shape = Shape::new("l", ShapeKind::Line, vec![(5.0, 5.0), (30.0, 30.0)]);
        let mask = shape_to_mask(size(40, 40), &shape, &RasterOptions::default()).unwrap();
        assert!(mask.contains(17, 17));
        assert!(mask.contains(20, 16));
        assert!(mask.contains(16, 20));
        assert!(!mask.contains(25, 10));
        assert!(!mask.contains(10, 25));
        assert!(!mask.contains(35, 35));
    }

    #[test]
    fn polygon_is_filled() {
        let shape = Shape::new(
            "t",
            ShapeKind::Polygon,
            vec![(0.0, 0.0), (20.0, 0.0), (0.0, 20.0)],
        );
        let mask = shape_to_mask(size(24, 24), &shape, &RasterOptions::default()).unwrap();
        assert!(mask.contains(0, 0));
        assert!(mask.contains(5, 5));
        assert!(!mask.contains(18, 18));
    }

    #[test]
    fn shapes_outside_the_image_are_clipped() {
        let shape = Shape::new("r", ShapeKind::Rectangle, vec![(-10.0, -10.0), (3.0, 3.0)]);
        let mask = shape_to_mask(size(8, 8), &shape, &RasterOptions::default()).unwrap();
        assert_eq!(mask.area(), 16);

        let outside = Shape::new("r", ShapeKind::Rectangle, vec![(50.0, 50.0), (60.0, 60.0)]);
        let mask = shape_to_mask(size(8, 8), &outside, &RasterOptions::default()).unwrap();
        assert!(mask.is_empty());
    }

    #[test]
    fn far_out_rectangle_corners_are_clipped() {
        let shape = Shape::new(
            "r",
            ShapeKind::Rectangle,
            vec![(-2e9, 0.0), (2e9, 3.0)],
        );
        let mask = shape_to_mask(size(8, 8), &shape, &RasterOptions::default()).unwrap();
        assert_eq!(mask.area(), 8 * 4);
        assert!(mask.contains(0, 0));
        assert!(mask.contains(7, 3));
        assert!(!mask.contains(0, 4));

        let huge = Shape::new("r", ShapeKind::Rectangle, vec![(1e12, 1e12), (-1e12, -1e12)]);
        let mask = shape_to_mask(size(8, 8), &huge, &RasterOptions::default()).unwrap();
        assert_eq!(mask.area(), 64);
    }

    #[test]
    fn arity_errors_are_not_swallowed() {
        let shape = Shape::new("c", ShapeKind::Circle, vec![(1.0, 1.0)]);
        assert!(shape_to_mask(size(8, 8), &shape, &RasterOptions::default()).is_err());
    }
}
