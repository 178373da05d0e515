//! Small polygon helpers shared by candidate extraction and tag selection.

use nalgebra::Point2;

/// Componentwise arithmetic mean of the four corners.
///
/// Unweighted on purpose: degenerate and collinear quads still yield the
/// plain average of their points.
#[inline]
pub fn quad_center(corners: &[Point2<f32>; 4]) -> Point2<f32> {
    let mut x = 0.0f32;
    let mut y = 0.0f32;
    for c in corners {
        x += c.x;
        y += c.y;
    }
    Point2::new(x / 4.0, y / 4.0)
}

/// Shoelace area. Positive when the polygon runs clockwise on screen
/// (image coordinates, y pointing down).
pub fn signed_area(poly: &[Point2<f32>]) -> f32 {
    let n = poly.len();
    if n < 3 {
        return 0.0;
    }
    let mut acc = 0.0f32;
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        acc += a.x * b.y - b.x * a.y;
    }
    0.5 * acc
}

/// Perimeter of a closed polygon.
pub fn polygon_perimeter(poly: &[Point2<f32>]) -> f32 {
    let n = poly.len();
    if n < 2 {
        return 0.0;
    }
    (0..n).map(|i| (poly[(i + 1) % n] - poly[i]).norm()).sum()
}

/// Inclusive point-in-convex-quad test; works for either winding.
pub fn quad_contains_point(quad: &[Point2<f32>; 4], p: Point2<f32>) -> bool {
    let mut sign = 0.0f32;
    for i in 0..4 {
        let a = quad[i];
        let b = quad[(i + 1) % 4];
        let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
        if cross == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}
