//! Quadrilateral candidate extraction from a grayscale image.
//!
//! Pipeline: global Otsu binarization, 8-connected dark components in raster
//! order, convex hull of each component's pixel-edge outline, closed
//! Douglas-Peucker approximation, then geometric filtering. Candidates that
//! sit inside a larger candidate (inner marker cells) are dropped before
//! decoding.

use crate::params::DetectorParameters;
use crate::threshold::{contrast, otsu_threshold};
use artag_core::{polygon_perimeter, quad_center, quad_contains_point, signed_area, GrayImageView};
use nalgebra::{Point2, Vector2};
use std::collections::VecDeque;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Corners of one candidate, clockwise on screen, starting near the top-left.
pub type Quad = [Point2<f32>; 4];

/// Extract quadrilateral marker candidates.
///
/// Candidates are returned in raster order of their top-most dark pixel.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(width = image.width, height = image.height))
)]
pub fn find_quad_candidates(image: &GrayImageView<'_>, params: &DetectorParameters) -> Vec<Quad> {
    let Some(mask) = DarkMask::binarize(image, params.min_contrast) else {
        return Vec::new();
    };

    let max_dim = image.width.max(image.height) as f32;
    let min_perimeter = params.min_marker_perimeter_rate * max_dim;
    let max_perimeter = params.max_marker_perimeter_rate * max_dim;

    let mut candidates = Vec::new();
    for component in mask.components() {
        let (bw, bh) = component.bbox_size();
        if ((2 * (bw + bh)) as f32) < min_perimeter {
            continue;
        }
        if let Some(c) = component_to_quad(&component, params, min_perimeter, max_perimeter, &mask)
        {
            candidates.push(c);
        }
    }

    let quads = drop_nested(candidates);
    log::debug!("quad extraction: {} candidates", quads.len());
    quads
}

struct Candidate {
    corners: Quad,
    perimeter: f32,
}

fn component_to_quad(
    component: &Component,
    params: &DetectorParameters,
    min_perimeter: f32,
    max_perimeter: f32,
    mask: &DarkMask,
) -> Option<Candidate> {
    let hull = convex_hull(&component.outline_points());
    let hull_perimeter = polygon_perimeter(&hull);
    if hull_perimeter < min_perimeter || hull_perimeter > max_perimeter {
        return None;
    }

    let eps = params.polygonal_approx_accuracy_rate * hull_perimeter;
    let approx = approx_polygon_closed(&hull, eps);
    let &[a, b, c, d] = approx.as_slice() else {
        return None;
    };
    let mut idx = [a, b, c, d];
    snap_corners(&hull, &mut idx);
    let mut corners = idx.map(|i| hull[i]);
    if signed_area(&corners) < 0.0 {
        corners.reverse();
    }

    let perimeter = polygon_perimeter(&corners);
    let min_dist = params.min_corner_distance_rate * perimeter;
    for i in 0..4 {
        for j in (i + 1)..4 {
            if (corners[i] - corners[j]).norm() < min_dist {
                return None;
            }
        }
    }

    if params.corner_refinement {
        let boundary: Vec<Point2<f32>> = component
            .boundary
            .iter()
            .map(|&(x, y)| Point2::new(x as f32 + 0.5, y as f32 + 0.5))
            .collect();
        corners = refine_corners(&corners, &boundary);
    }

    let margin = params.min_distance_to_border as f32;
    let max_x = mask.width as f32 - 1.0 - margin;
    let max_y = mask.height as f32 - 1.0 - margin;
    if corners
        .iter()
        .any(|p| p.x < margin || p.y < margin || p.x > max_x || p.y > max_y)
    {
        return None;
    }

    let start = (0..4)
        .min_by(|&i, &j| {
            let ki = (corners[i].x + corners[i].y, corners[i].y);
            let kj = (corners[j].x + corners[j].y, corners[j].y);
            ki.partial_cmp(&kj).unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(0);
    corners.rotate_left(start);

    Some(Candidate { corners, perimeter })
}

fn drop_nested(candidates: Vec<Candidate>) -> Vec<Quad> {
    candidates
        .iter()
        .enumerate()
        .filter(|(i, cand)| {
            let center = quad_center(&cand.corners);
            !candidates.iter().enumerate().any(|(j, other)| {
                j != *i
                    && other.perimeter > cand.perimeter
                    && quad_contains_point(&other.corners, center)
            })
        })
        .map(|(_, cand)| cand.corners)
        .collect()
}

struct DarkMask {
    width: usize,
    height: usize,
    dark: Vec<bool>,
}

impl DarkMask {
    fn binarize(image: &GrayImageView<'_>, min_contrast: u8) -> Option<Self> {
        if image.width == 0 || image.height == 0 || contrast(image.data) < min_contrast {
            return None;
        }
        let thr = otsu_threshold(image.data);
        Some(Self {
            width: image.width,
            height: image.height,
            dark: image.data.iter().map(|&v| v <= thr).collect(),
        })
    }

    #[inline]
    fn is_dark(&self, x: i64, y: i64) -> bool {
        x >= 0
            && y >= 0
            && (x as usize) < self.width
            && (y as usize) < self.height
            && self.dark[y as usize * self.width + x as usize]
    }

    /// 8-connected dark components, seeded in raster order.
    fn components(&self) -> Vec<Component> {
        let mut visited = vec![false; self.dark.len()];
        let mut queue = VecDeque::new();
        let mut out = Vec::new();

        for seed in 0..self.dark.len() {
            if !self.dark[seed] || visited[seed] {
                continue;
            }
            visited[seed] = true;
            queue.push_back(seed);
            let mut comp = Component::new(seed % self.width, seed / self.width);

            while let Some(idx) = queue.pop_front() {
                let (x, y) = (idx % self.width, idx / self.width);
                comp.extend_bbox(x, y);
                let (xi, yi) = (x as i64, y as i64);
                let on_edge = [(1, 0), (-1, 0), (0, 1), (0, -1)]
                    .iter()
                    .any(|&(dx, dy)| !self.is_dark(xi + dx, yi + dy));
                if on_edge {
                    comp.boundary.push((x, y));
                }

                for dy in -1..=1i64 {
                    for dx in -1..=1i64 {
                        let (nx, ny) = (xi + dx, yi + dy);
                        if !self.is_dark(nx, ny) {
                            continue;
                        }
                        let n = ny as usize * self.width + nx as usize;
                        if !visited[n] {
                            visited[n] = true;
                            queue.push_back(n);
                        }
                    }
                }
            }
            out.push(comp);
        }
        out
    }
}

struct Component {
    min_x: usize,
    max_x: usize,
    min_y: usize,
    max_y: usize,
    /// Dark pixels with at least one non-dark 4-neighbor.
    boundary: Vec<(usize, usize)>,
}

impl Component {
    fn new(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            max_x: x,
            min_y: y,
            max_y: y,
            boundary: Vec::new(),
        }
    }

    fn extend_bbox(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    fn bbox_size(&self) -> (usize, usize) {
        (self.max_x - self.min_x + 1, self.max_y - self.min_y + 1)
    }

    /// Pixel-corner points of all boundary pixels, so the hull follows pixel edges.
    fn outline_points(&self) -> Vec<(i64, i64)> {
        let mut pts = Vec::with_capacity(self.boundary.len() * 4);
        for &(x, y) in &self.boundary {
            let (x, y) = (x as i64, y as i64);
            pts.extend_from_slice(&[(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)]);
        }
        pts
    }
}

fn cross(o: (i64, i64), a: (i64, i64), b: (i64, i64)) -> i64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// Monotone chain hull without collinear points; positive shoelace area.
fn convex_hull(points: &[(i64, i64)]) -> Vec<Point2<f32>> {
    let mut pts = points.to_vec();
    pts.sort_unstable();
    pts.dedup();
    if pts.len() <= 2 {
        return pts
            .into_iter()
            .map(|(x, y)| Point2::new(x as f32, y as f32))
            .collect();
    }

    let mut hull: Vec<(i64, i64)> = Vec::with_capacity(pts.len() + 1);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();

    hull.into_iter()
        .map(|(x, y)| Point2::new(x as f32, y as f32))
        .collect()
}

/// Distance from `p` to the infinite line through `a` and `b`.
fn line_distance(p: Point2<f32>, a: Point2<f32>, b: Point2<f32>) -> f32 {
    let d = b - a;
    let len = d.norm();
    if len < 1e-6 {
        return (p - a).norm();
    }
    (d.x * (p.y - a.y) - d.y * (p.x - a.x)).abs() / len
}

/// Closed Douglas-Peucker over a convex polygon. Returns vertex indices in order.
fn approx_polygon_closed(poly: &[Point2<f32>], eps: f32) -> Vec<usize> {
    let n = poly.len();
    if n <= 3 {
        return (0..n).collect();
    }

    let far = (1..n)
        .max_by(|&i, &j| {
            let di = (poly[i] - poly[0]).norm_squared();
            let dj = (poly[j] - poly[0]).norm_squared();
            di.partial_cmp(&dj).unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(1);

    let first: Vec<usize> = (0..=far).collect();
    let second: Vec<usize> = (far..n).chain(std::iter::once(0)).collect();
    let mut out = Vec::new();
    douglas_peucker(poly, &first, eps, &mut out);
    douglas_peucker(poly, &second, eps, &mut out);

    // The forced split points may be redundant.
    while out.len() > 3 {
        let m = out.len();
        let redundant = (0..m).find(|&i| {
            let prev = poly[out[(i + m - 1) % m]];
            let next = poly[out[(i + 1) % m]];
            line_distance(poly[out[i]], prev, next) <= eps
        });
        match redundant {
            Some(i) => {
                out.remove(i);
            }
            None => break,
        }
    }
    out
}

/// Appends every kept index of `chain` except its last one.
fn douglas_peucker(poly: &[Point2<f32>], chain: &[usize], eps: f32, out: &mut Vec<usize>) {
    if chain.len() <= 2 {
        out.push(chain[0]);
        return;
    }
    let a = poly[chain[0]];
    let b = poly[chain[chain.len() - 1]];
    let mut best = -1.0f32;
    let mut split = 0;
    for (k, &i) in chain.iter().enumerate().take(chain.len() - 1).skip(1) {
        let d = line_distance(poly[i], a, b);
        if d > best {
            best = d;
            split = k;
        }
    }
    if best > eps {
        douglas_peucker(poly, &chain[..=split], eps, out);
        douglas_peucker(poly, &chain[split..], eps, out);
    } else {
        out.push(chain[0]);
    }
}

/// Move each corner to the hull vertex between its neighbors that lies
/// farthest from the neighbors' chord.
fn snap_corners(hull: &[Point2<f32>], idx: &mut [usize; 4]) {
    let n = hull.len();
    for _ in 0..2 {
        for k in 0..4 {
            let prev = idx[(k + 3) % 4];
            let next = idx[(k + 1) % 4];
            let (a, b) = (hull[prev], hull[next]);
            let mut best = idx[k];
            let mut best_d = line_distance(hull[best], a, b);
            let mut j = (prev + 1) % n;
            while j != next {
                let d = line_distance(hull[j], a, b);
                if d > best_d {
                    best_d = d;
                    best = j;
                }
                j = (j + 1) % n;
            }
            idx[k] = best;
        }
    }
}

struct Line {
    point: Point2<f32>,
    dir: Vector2<f32>,
}

/// Total-least-squares line through the points.
fn fit_line(points: &[Point2<f32>]) -> Line {
    let n = points.len() as f32;
    let (sx, sy) = points
        .iter()
        .fold((0.0f32, 0.0f32), |(sx, sy), p| (sx + p.x, sy + p.y));
    let (mx, my) = (sx / n, sy / n);
    let (mut sxx, mut syy, mut sxy) = (0.0f32, 0.0f32, 0.0f32);
    for p in points {
        let (dx, dy) = (p.x - mx, p.y - my);
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    let theta = 0.5 * (2.0 * sxy).atan2(sxx - syy);
    Line {
        point: Point2::new(mx, my),
        dir: Vector2::new(theta.cos(), theta.sin()),
    }
}

fn intersect(l1: &Line, l2: &Line) -> Option<Point2<f32>> {
    let den = l1.dir.x * l2.dir.y - l1.dir.y * l2.dir.x;
    if den.abs() < 1e-3 {
        return None;
    }
    let q = l2.point - l1.point;
    let t = (q.x * l2.dir.y - q.y * l2.dir.x) / den;
    Some(l1.point + l1.dir * t)
}

/// Refit each side to the boundary pixel centers near it and intersect
/// adjacent sides. Corners that would move too far are kept as is.
fn refine_corners(corners: &Quad, boundary: &[Point2<f32>]) -> Quad {
    const SIDE_BAND: (f32, f32) = (0.15, 0.85);

    let mut lines = Vec::with_capacity(4);
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        let len = (b - a).norm();
        if len < 1e-3 {
            return *corners;
        }
        let dir = (b - a) / len;
        let outward = Vector2::new(dir.y, -dir.x);
        let band = (0.05 * len).max(2.0);

        let near: Vec<Point2<f32>> = boundary
            .iter()
            .copied()
            .filter(|p| {
                let r = *p - a;
                let t = r.dot(&dir) / len;
                t >= SIDE_BAND.0 && t <= SIDE_BAND.1 && r.dot(&outward).abs() <= band
            })
            .collect();
        if near.len() < 2 {
            return *corners;
        }

        let mut line = fit_line(&near);
        if line.dir.dot(&dir) < 0.0 {
            line.dir = -line.dir;
        }
        // Pixel centers sit half a pixel inside the dark edge.
        line.point += Vector2::new(line.dir.y, -line.dir.x) * 0.5;
        lines.push(line);
    }

    let mut out = *corners;
    for i in 0..4 {
        let prev = &lines[(i + 3) % 4];
        let Some(p) = intersect(prev, &lines[i]) else {
            continue;
        };
        let side = (corners[i] - corners[(i + 3) % 4])
            .norm()
            .min((corners[(i + 1) % 4] - corners[i]).norm());
        if (p - corners[i]).norm() <= (0.1 * side).max(2.0) {
            out[i] = p;
        }
    }
    out
}
