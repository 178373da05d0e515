//! Projective map between the canonical marker grid and image pixels.

use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};

/// Planar projective map `dst ~ H * src`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    /// Map a point; the result is non-finite for points on the line at infinity.
    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(f64::from(p.x), f64::from(p.y), 1.0);
        Point2::new((v.x / v.z) as f32, (v.y / v.z) as f32)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }
}

/// Similarity moving four points to zero centroid and mean radius `sqrt(2)`.
struct Conditioner {
    t: Matrix3<f64>,
    points: [Point2<f64>; 4],
}

impl Conditioner {
    fn new(pts: &[Point2<f32>; 4]) -> Self {
        let pts = pts.map(|p| Point2::new(f64::from(p.x), f64::from(p.y)));
        let cx = pts.iter().map(|p| p.x).sum::<f64>() / 4.0;
        let cy = pts.iter().map(|p| p.y).sum::<f64>() / 4.0;
        let radius = pts
            .iter()
            .map(|p| (p.x - cx).hypot(p.y - cy))
            .sum::<f64>()
            / 4.0;
        let s = if radius > 1e-12 {
            std::f64::consts::SQRT_2 / radius
        } else {
            1.0
        };
        let t = Matrix3::new(
            s, 0.0, -s * cx, //
            0.0, s, -s * cy, //
            0.0, 0.0, 1.0,
        );
        let points = pts.map(|p| Point2::new(s * (p.x - cx), s * (p.y - cy)));
        Self { t, points }
    }
}

/// Solve `dst ~ H * src` from four correspondences in matching order.
///
/// `src` is usually the canonical cell grid and `dst` the quad in the image.
/// Returns `None` for degenerate input such as coincident corners.
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    let src_n = Conditioner::new(src);
    let dst_n = Conditioner::new(dst);

    // Unknowns h11..h32 with h33 = 1; two rows per correspondence.
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for (k, (s, d)) in src_n.points.iter().zip(&dst_n.points).enumerate() {
        let (x, y, u, v) = (s.x, s.y, d.x, d.y);
        let rows = [
            ([x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y], u),
            ([0.0, 0.0, 0.0, x, y, 1.0, -v * x, -v * y], v),
        ];
        for (j, (coeffs, rhs)) in rows.into_iter().enumerate() {
            let r = 2 * k + j;
            for (c, value) in coeffs.into_iter().enumerate() {
                a[(r, c)] = value;
            }
            b[r] = rhs;
        }
    }

    let x = a.lu().solve(&b)?;
    let conditioned = Matrix3::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    );

    let h = dst_n.t.try_inverse()? * conditioned * src_n.t;
    let scale = h[(2, 2)];
    if scale.abs() < 1e-12 {
        return None;
    }
    let h = h / scale;
    h.iter().all(|v| v.is_finite()).then(|| Homography::new(h))
}
