//! Vector shapes for simulation parts.
//!
//! Shapes are a closed set of tagged variants rather than a trait object
//! hierarchy: every variant only needs a closed-form containment test, an
//! enclosed area, and an axis-aligned bounding box. The rasterizer and the
//! photon tracer both work purely through those three operations, plus a
//! sampled outline used when discretizing part boundaries into radiation
//! segments.

use crate::core_types::vec2::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in world coordinates (m).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// Create a bounding box from min/max corners.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Bounds { min, max }
    }

    /// Box width (m).
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Box height (m).
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Check if a point lies inside the box.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// A closed 2D shape in world coordinates.
///
/// The y axis points down (row 0 of the grid is the top of the domain), so
/// "top" edges have smaller y than "bottom" edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Axis-aligned rectangle with top-left corner and extent.
    Rectangle { x: f32, y: f32, w: f32, h: f32 },
    /// Ellipse with center and semi-axes.
    Ellipse { cx: f32, cy: f32, rx: f32, ry: f32 },
    /// Simple polygon (no self-intersection assumed), vertices in order.
    Polygon { vertices: Vec<Vec2> },
    /// Smooth closed blob: a Catmull-Rom spline through control points.
    Blob { points: Vec<Vec2> },
    /// Circular ring with inner and outer radius.
    Annulus {
        cx: f32,
        cy: f32,
        inner: f32,
        outer: f32,
    },
    /// Elliptical ring with inner and outer semi-axes.
    EllipticalAnnulus {
        cx: f32,
        cy: f32,
        inner_rx: f32,
        inner_ry: f32,
        outer_rx: f32,
        outer_ry: f32,
    },
}

/// Number of spline samples per blob control point when flattening to a
/// polygon for containment and outline queries.
const BLOB_SAMPLES_PER_POINT: usize = 8;

impl Shape {
    /// Test whether a world-space point lies inside the shape.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        match self {
            Shape::Rectangle {
                x: rx,
                y: ry,
                w,
                h,
            } => x >= *rx && x <= rx + w && y >= *ry && y <= ry + h,
            Shape::Ellipse { cx, cy, rx, ry } => {
                if *rx <= 0.0 || *ry <= 0.0 {
                    return false;
                }
                let dx = (x - cx) / rx;
                let dy = (y - cy) / ry;
                dx * dx + dy * dy <= 1.0
            }
            Shape::Polygon { vertices } => polygon_contains(vertices, x, y),
            Shape::Blob { points } => {
                let outline = blob_outline(points, BLOB_SAMPLES_PER_POINT * points.len().max(1));
                polygon_contains(&outline, x, y)
            }
            Shape::Annulus {
                cx,
                cy,
                inner,
                outer,
            } => {
                let r2 = (x - cx) * (x - cx) + (y - cy) * (y - cy);
                r2 >= inner * inner && r2 <= outer * outer
            }
            Shape::EllipticalAnnulus {
                cx,
                cy,
                inner_rx,
                inner_ry,
                outer_rx,
                outer_ry,
            } => {
                let inside = |sx: f32, sy: f32| {
                    if sx <= 0.0 || sy <= 0.0 {
                        return false;
                    }
                    let dx = (x - cx) / sx;
                    let dy = (y - cy) / sy;
                    dx * dx + dy * dy <= 1.0
                };
                inside(*outer_rx, *outer_ry) && !inside(*inner_rx, *inner_ry)
            }
        }
    }

    /// Enclosed area (m²).
    pub fn area(&self) -> f32 {
        match self {
            Shape::Rectangle { w, h, .. } => w * h,
            Shape::Ellipse { rx, ry, .. } => std::f32::consts::PI * rx * ry,
            Shape::Polygon { vertices } => shoelace_area(vertices),
            Shape::Blob { points } => {
                let outline = blob_outline(points, BLOB_SAMPLES_PER_POINT * points.len().max(1));
                shoelace_area(&outline)
            }
            Shape::Annulus { inner, outer, .. } => {
                std::f32::consts::PI * (outer * outer - inner * inner)
            }
            Shape::EllipticalAnnulus {
                inner_rx,
                inner_ry,
                outer_rx,
                outer_ry,
                ..
            } => std::f32::consts::PI * (outer_rx * outer_ry - inner_rx * inner_ry),
        }
    }

    /// Axis-aligned bounding box.
    pub fn bounding_box(&self) -> Bounds {
        match self {
            Shape::Rectangle { x, y, w, h } => {
                Bounds::new(Vec2::new(*x, *y), Vec2::new(x + w, y + h))
            }
            Shape::Ellipse { cx, cy, rx, ry } => {
                Bounds::new(Vec2::new(cx - rx, cy - ry), Vec2::new(cx + rx, cy + ry))
            }
            Shape::Polygon { vertices } => points_bounds(vertices),
            Shape::Blob { points } => {
                let outline = blob_outline(points, BLOB_SAMPLES_PER_POINT * points.len().max(1));
                points_bounds(&outline)
            }
            Shape::Annulus { cx, cy, outer, .. } => Bounds::new(
                Vec2::new(cx - outer, cy - outer),
                Vec2::new(cx + outer, cy + outer),
            ),
            Shape::EllipticalAnnulus {
                cx,
                cy,
                outer_rx,
                outer_ry,
                ..
            } => Bounds::new(
                Vec2::new(cx - outer_rx, cy - outer_ry),
                Vec2::new(cx + outer_rx, cy + outer_ry),
            ),
        }
    }

    /// Sample the shape outline as a closed loop of points, ordered along the
    /// perimeter. Annular shapes return the outer ring followed by the inner
    /// ring (each ring closed on itself).
    ///
    /// Used by the radiative view-factor network to discretize part
    /// boundaries into segments.
    pub fn outline(&self, samples: usize) -> Vec<Vec2> {
        let n = samples.max(4);
        match self {
            Shape::Rectangle { x, y, w, h } => {
                let per_side = (n / 4).max(1);
                let mut pts = Vec::with_capacity(per_side * 4);
                for i in 0..per_side {
                    let t = i as f32 / per_side as f32;
                    pts.push(Vec2::new(x + w * t, *y));
                }
                for i in 0..per_side {
                    let t = i as f32 / per_side as f32;
                    pts.push(Vec2::new(x + w, y + h * t));
                }
                for i in 0..per_side {
                    let t = i as f32 / per_side as f32;
                    pts.push(Vec2::new(x + w * (1.0 - t), y + h));
                }
                for i in 0..per_side {
                    let t = i as f32 / per_side as f32;
                    pts.push(Vec2::new(*x, y + h * (1.0 - t)));
                }
                pts
            }
            Shape::Ellipse { cx, cy, rx, ry } => ellipse_ring(*cx, *cy, *rx, *ry, n),
            Shape::Polygon { vertices } => resample_loop(vertices, n),
            Shape::Blob { points } => blob_outline(points, n),
            Shape::Annulus {
                cx,
                cy,
                inner,
                outer,
            } => {
                let mut pts = ellipse_ring(*cx, *cy, *outer, *outer, n);
                pts.extend(ellipse_ring(*cx, *cy, *inner, *inner, n));
                pts
            }
            Shape::EllipticalAnnulus {
                cx,
                cy,
                inner_rx,
                inner_ry,
                outer_rx,
                outer_ry,
            } => {
                let mut pts = ellipse_ring(*cx, *cy, *outer_rx, *outer_ry, n);
                pts.extend(ellipse_ring(*cx, *cy, *inner_rx, *inner_ry, n));
                pts
            }
        }
    }
}

/// Even-odd ray casting containment test.
fn polygon_contains(vertices: &[Vec2], x: f32, y: f32) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (vi, vj) = (vertices[i], vertices[j]);
        if ((vi.y > y) != (vj.y > y))
            && (x < (vj.x - vi.x) * (y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Shoelace formula, returns the absolute enclosed area.
fn shoelace_area(vertices: &[Vec2]) -> f32 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        sum += (vertices[j].x + vertices[i].x) * (vertices[j].y - vertices[i].y);
        j = i;
    }
    (sum * 0.5).abs()
}

fn points_bounds(points: &[Vec2]) -> Bounds {
    let mut min = Vec2::new(f32::INFINITY, f32::INFINITY);
    let mut max = Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    Bounds::new(min, max)
}

fn ellipse_ring(cx: f32, cy: f32, rx: f32, ry: f32, n: usize) -> Vec<Vec2> {
    (0..n)
        .map(|i| {
            let a = std::f32::consts::TAU * i as f32 / n as f32;
            Vec2::new(cx + rx * a.cos(), cy + ry * a.sin())
        })
        .collect()
}

/// Resample a closed polygon loop to roughly `n` points, preserving corners
/// by walking the perimeter at uniform arc length.
fn resample_loop(vertices: &[Vec2], n: usize) -> Vec<Vec2> {
    if vertices.len() < 3 || n <= vertices.len() {
        return vertices.to_vec();
    }
    let mut perimeter = 0.0;
    for i in 0..vertices.len() {
        let next = vertices[(i + 1) % vertices.len()];
        perimeter += (next - vertices[i]).norm();
    }
    if perimeter <= 0.0 {
        return vertices.to_vec();
    }
    let step = perimeter / n as f32;
    let mut out = Vec::with_capacity(n);
    let mut seg = 0;
    let mut seg_start = vertices[0];
    let mut seg_end = vertices[1 % vertices.len()];
    let mut seg_len = (seg_end - seg_start).norm();
    let mut travelled = 0.0;
    for i in 0..n {
        let target = i as f32 * step;
        while travelled + seg_len < target && seg < vertices.len() {
            travelled += seg_len;
            seg += 1;
            seg_start = vertices[seg % vertices.len()];
            seg_end = vertices[(seg + 1) % vertices.len()];
            seg_len = (seg_end - seg_start).norm();
        }
        let t = if seg_len > 0.0 {
            (target - travelled) / seg_len
        } else {
            0.0
        };
        out.push(seg_start + (seg_end - seg_start) * t.clamp(0.0, 1.0));
    }
    out
}

/// Flatten a closed Catmull-Rom spline through `points` into `n` samples.
fn blob_outline(points: &[Vec2], n: usize) -> Vec<Vec2> {
    let m = points.len();
    if m < 3 {
        return points.to_vec();
    }
    let n = n.max(m);
    let mut out = Vec::with_capacity(n);
    let per_span = (n / m).max(1);
    for i in 0..m {
        let p0 = points[(i + m - 1) % m];
        let p1 = points[i];
        let p2 = points[(i + 1) % m];
        let p3 = points[(i + 2) % m];
        for s in 0..per_span {
            let t = s as f32 / per_span as f32;
            let t2 = t * t;
            let t3 = t2 * t;
            // Catmull-Rom basis with tension 0.5
            let x = 0.5
                * ((2.0 * p1.x)
                    + (-p0.x + p2.x) * t
                    + (2.0 * p0.x - 5.0 * p1.x + 4.0 * p2.x - p3.x) * t2
                    + (-p0.x + 3.0 * p1.x - 3.0 * p2.x + p3.x) * t3);
            let y = 0.5
                * ((2.0 * p1.y)
                    + (-p0.y + p2.y) * t
                    + (2.0 * p0.y - 5.0 * p1.y + 4.0 * p2.y - p3.y) * t2
                    + (-p0.y + 3.0 * p1.y - 3.0 * p2.y + p3.y) * t3);
            out.push(Vec2::new(x, y));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle_contains_and_area() {
        let r = Shape::Rectangle {
            x: 1.0,
            y: 2.0,
            w: 3.0,
            h: 4.0,
        };
        assert!(r.contains(2.0, 3.0));
        assert!(!r.contains(0.5, 3.0));
        assert_eq!(r.area(), 12.0);

        let bb = r.bounding_box();
        assert_eq!(bb.width(), 3.0);
        assert_eq!(bb.height(), 4.0);
    }

    #[test]
    fn test_ellipse_contains() {
        let e = Shape::Ellipse {
            cx: 0.0,
            cy: 0.0,
            rx: 2.0,
            ry: 1.0,
        };
        assert!(e.contains(1.9, 0.0));
        assert!(!e.contains(0.0, 1.1));
        assert!((e.area() - std::f32::consts::PI * 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_polygon_contains() {
        // Unit right triangle
        let p = Shape::Polygon {
            vertices: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 1.0),
            ],
        };
        assert!(p.contains(0.2, 0.2));
        assert!(!p.contains(0.8, 0.8));
        assert!((p.area() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_annulus_excludes_hole() {
        let a = Shape::Annulus {
            cx: 0.0,
            cy: 0.0,
            inner: 1.0,
            outer: 2.0,
        };
        assert!(a.contains(1.5, 0.0));
        assert!(!a.contains(0.5, 0.0));
        assert!(!a.contains(2.5, 0.0));
    }

    #[test]
    fn test_elliptical_annulus_contains() {
        let a = Shape::EllipticalAnnulus {
            cx: 0.0,
            cy: 0.0,
            inner_rx: 1.0,
            inner_ry: 0.5,
            outer_rx: 2.0,
            outer_ry: 1.0,
        };
        assert!(a.contains(1.5, 0.0));
        assert!(!a.contains(0.9, 0.0));
        assert!(!a.contains(0.0, 1.5));
    }

    #[test]
    fn test_blob_approximates_control_polygon() {
        let b = Shape::Blob {
            points: vec![
                Vec2::new(-1.0, -1.0),
                Vec2::new(1.0, -1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(-1.0, 1.0),
            ],
        };
        // The spline stays near the control square, so the center is inside
        assert!(b.contains(0.0, 0.0));
        assert!(!b.contains(3.0, 3.0));
        assert!(b.area() > 1.0);
    }

    #[test]
    fn test_outline_is_on_perimeter() {
        let e = Shape::Ellipse {
            cx: 0.0,
            cy: 0.0,
            rx: 2.0,
            ry: 2.0,
        };
        for p in e.outline(32) {
            assert!((p.norm() - 2.0).abs() < 1e-4);
        }
    }
}
