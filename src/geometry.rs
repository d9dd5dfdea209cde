//! Typed geometry for LabelMe shapes.
//!
//! A [`Shape`] carries its geometry as a string tag plus a loose point list.
//! [`Geometry`] is the checked form: each variant holds exactly the points its
//! kind needs, so the rasterizer never has to re-validate arity.

use crate::error::ShapeError;
use crate::types::{Shape, ShapeKind};

/// A point in image coordinates (x to the right, y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Vertex) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Vertex {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Two opposite corners, in any order.
    Rectangle { corners: [Vertex; 2] },
    /// Center plus one point on the circumference.
    Circle { center: Vertex, rim: Vertex },
    /// Open path; the last vertex is never joined back to the first.
    Polyline(Vec<Vertex>),
    Point(Vertex),
    Polygon(Vec<Vertex>),
}

impl Geometry {
    pub fn from_shape(shape: &Shape) -> Result<Self, ShapeError> {
        let vertices: Vec<Vertex> = shape.points.iter().copied().map(Vertex::from).collect();
        let kind = shape.kind();
        let found = vertices.len();
        let arity = |expected: &'static str| ShapeError::Arity {
            label: shape.label.clone(),
            kind: kind.as_str(),
            expected,
            found,
        };

        match kind {
            ShapeKind::Rectangle => match vertices[..] {
                [a, b] => Ok(Geometry::Rectangle { corners: [a, b] }),
                _ => Err(arity("exactly 2")),
            },
            ShapeKind::Circle => match vertices[..] {
                [center, rim] => Ok(Geometry::Circle { center, rim }),
                _ => Err(arity("exactly 2")),
            },
            ShapeKind::Line => {
                if found != 2 {
                    return Err(arity("exactly 2"));
                }
                Ok(Geometry::Polyline(vertices))
            }
            ShapeKind::Linestrip => {
                if found < 2 {
                    return Err(arity("at least 2"));
                }
                Ok(Geometry::Polyline(vertices))
            }
            ShapeKind::Point => match vertices[..] {
                [center] => Ok(Geometry::Point(center)),
                _ => Err(arity("exactly 1")),
            },
            ShapeKind::Polygon => {
                if found < 3 {
                    return Err(arity("more than 2"));
                }
                Ok(Geometry::Polygon(vertices))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_needs_two_points() {
        let shape = Shape::new("cat", ShapeKind::Rectangle, vec![(1.0, 2.0)]);
        let err = Geometry::from_shape(&shape).unwrap_err();
        assert_eq!(
            err,
            ShapeError::Arity {
                label: "cat".to_string(),
                kind: "rectangle",
                expected: "exactly 2",
                found: 1,
            }
        );
    }

    #[test]
    fn point_needs_one_point() {
        let shape = Shape::new("p", ShapeKind::Point, vec![(1.0, 2.0), (3.0, 4.0)]);
        assert!(Geometry::from_shape(&shape).is_err());
    }

    #[test]
    fn line_needs_exactly_two_points() {
        let shape = Shape::new("l", ShapeKind::Line, vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert!(Geometry::from_shape(&shape).is_err());
    }

    #[test]
    fn linestrip_is_an_open_polyline() {
        let shape = Shape::new(
            "road",
            ShapeKind::Linestrip,
            vec![(0.0, 0.0), (5.0, 0.0), (5.0, 5.0)],
        );
        match Geometry::from_shape(&shape).unwrap() {
            Geometry::Polyline(vertices) => assert_eq!(vertices.len(), 3),
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn unknown_shape_type_is_a_polygon() {
        let mut shape = Shape::new("x", ShapeKind::Polygon, vec![(0.0, 0.0), (1.0, 0.0)]);
        shape.shape_type = Some("mystery".to_string());
        assert!(matches!(
            Geometry::from_shape(&shape),
            Err(ShapeError::Arity { kind: "polygon", .. })
        ));

        shape.shape_type = None;
        shape.points.push((0.0, 1.0));
        assert!(matches!(
            Geometry::from_shape(&shape),
            Ok(Geometry::Polygon(ref v)) if v.len() == 3
        ));
    }
}
