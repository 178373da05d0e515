//! Debug overlays for rejected candidates.

use artag_aruco::Quad;
use artag_core::RgbImage;
use nalgebra::Point2;

const OVERLAY_COLOR: [u8; 3] = [255, 255, 255];
const THICKNESS: i64 = 3;

/// Draw a white axis-aligned box for every rejected quad, spanning from its
/// first corner to the corner farthest from it.
pub fn draw_rejected(rgb: &RgbImage, rejected: &[Quad]) -> RgbImage {
    let mut out = rgb.clone();
    for quad in rejected {
        let far = farthest_corner(quad);
        draw_rect_outline(&mut out, quad[0], quad[far]);
    }
    out
}

/// Index of the corner farthest from corner 0; ties prefer the later corner.
fn farthest_corner(quad: &Quad) -> usize {
    let d: Vec<f32> = (1..4).map(|i| (quad[i] - quad[0]).norm()).collect();
    let max = d.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if d[2] == max {
        3
    } else if d[1] == max {
        2
    } else {
        1
    }
}

fn draw_rect_outline(img: &mut RgbImage, a: Point2<f32>, b: Point2<f32>) {
    if img.width == 0 || img.height == 0 {
        return;
    }
    let (x0, x1) = ordered(a.x, b.x);
    let (y0, y1) = ordered(a.y, b.y);
    // The stroke is centered on the rectangle edge.
    let outer = THICKNESS / 2;
    let inner = THICKNESS - outer;

    let (w, h) = (img.width as i64, img.height as i64);
    if x1 + outer < 0 || y1 + outer < 0 || x0 - outer >= w || y0 - outer >= h {
        return;
    }
    let (sx0, sx1) = ((x0 - outer).max(0), (x1 + outer).min(w - 1));
    let (sy0, sy1) = ((y0 - outer).max(0), (y1 + outer).min(h - 1));

    for y in sy0..=sy1 {
        for x in sx0..=sx1 {
            let interior =
                x >= x0 + inner && x <= x1 - inner && y >= y0 + inner && y <= y1 - inner;
            if !interior {
                img.set_pixel(x as usize, y as usize, OVERLAY_COLOR);
            }
        }
    }
}

fn ordered(a: f32, b: f32) -> (i64, i64) {
    let (a, b) = (a.round() as i64, b.round() as i64);
    (a.min(b), a.max(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(pts: [(f32, f32); 4]) -> Quad {
        pts.map(|(x, y)| Point2::new(x, y))
    }

    #[test]
    fn farthest_corner_is_the_diagonal_of_a_square() {
        let q = quad([(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        assert_eq!(farthest_corner(&q), 2);
        let q = quad([(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (10.0, 10.0)]);
        assert_eq!(farthest_corner(&q), 3);
    }

    #[test]
    fn outline_is_three_pixels_wide() {
        let img = RgbImage::new_filled(20, 20, [0, 0, 0]);
        let q = quad([(5.0, 5.0), (14.0, 5.0), (14.0, 14.0), (5.0, 14.0)]);
        let out = draw_rejected(&img, &[q]);
        let white = [255, 255, 255];
        assert_eq!(out.pixel(4, 9), white);
        assert_eq!(out.pixel(5, 9), white);
        assert_eq!(out.pixel(6, 9), white);
        assert_eq!(out.pixel(7, 9), [0, 0, 0]);
        assert_eq!(out.pixel(9, 9), [0, 0, 0]);
        assert_eq!(out.pixel(3, 9), [0, 0, 0]);
        assert_eq!(out.pixel(15, 15), white);
        assert_eq!(img.pixel(5, 5), [0, 0, 0]);
    }

    #[test]
    fn clips_boxes_at_the_image_border() {
        let img = RgbImage::new_filled(8, 8, [9, 9, 9]);
        let q = quad([(-3.0, -3.0), (20.0, -3.0), (20.0, 20.0), (-3.0, 20.0)]);
        let out = draw_rejected(&img, &[q]);
        assert_eq!(out, img);

        let q = quad([(0.0, 0.0), (7.0, 0.0), (7.0, 7.0), (0.0, 7.0)]);
        let out = draw_rejected(&img, &[q]);
        assert_eq!(out.pixel(0, 0), [255, 255, 255]);
        assert_eq!(out.pixel(3, 3), [9, 9, 9]);
    }
}
