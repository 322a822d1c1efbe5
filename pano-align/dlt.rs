//! Normalised Direct Linear Transform for homographies.
//!
//! Points are shifted to zero mean and scaled to an average distance of
//! `sqrt(2)` from the origin before building the `2n x 9` design matrix, and
//! `A h = 0` is solved through the SVD. The estimate is de-normalised and
//! scaled so that `H[2,2] == 1` where possible.

use nalgebra::{DMatrix, Matrix3};
use pano_core::{Homography, Point};

/// Similarity that normalises `points`, and the normalised points.
/// `None` when all points coincide.
pub fn normalize_points(points: &[Point]) -> Option<(Vec<Point>, Matrix3<f64>)> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let (cx, cy) = (sx / n, sy / n);
    let mean_dist = points
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;
    if !(mean_dist > f64::EPSILON) {
        return None;
    }
    let s = std::f64::consts::SQRT_2 / mean_dist;
    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let normalized = points
        .iter()
        .map(|p| Point::new(s * (p.x - cx), s * (p.y - cy)))
        .collect();
    Some((normalized, t))
}

/// Least-squares homography mapping `src` onto `dst` (at least 4 pairs)
pub fn fit_homography(src: &[Point], dst: &[Point]) -> Option<Homography> {
    let n = src.len();
    if n < 4 || dst.len() != n {
        return None;
    }
    let (src_n, t_src) = normalize_points(src)?;
    let (dst_n, t_dst) = normalize_points(dst)?;

    // Pad to at least 9 rows so the SVD exposes the null-space vector
    let rows = (2 * n).max(9);
    let mut a = DMatrix::<f64>::zeros(rows, 9);
    for (i, (s, d)) in src_n.iter().zip(dst_n.iter()).enumerate() {
        let (x, y, u, v) = (s.x, s.y, d.x, d.y);
        let r0 = 2 * i;
        let r1 = r0 + 1;

        a[(r0, 0)] = -x;
        a[(r0, 1)] = -y;
        a[(r0, 2)] = -1.0;
        a[(r0, 6)] = u * x;
        a[(r0, 7)] = u * y;
        a[(r0, 8)] = u;

        a[(r1, 3)] = -x;
        a[(r1, 4)] = -y;
        a[(r1, 5)] = -1.0;
        a[(r1, 6)] = v * x;
        a[(r1, 7)] = v * y;
        a[(r1, 8)] = v;
    }

    let svd = a.svd(false, true);
    let v_t = svd.v_t?;
    let (min_idx, _) = svd
        .singular_values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))?;
    let h = v_t.row(min_idx);

    let mut h_mat = Matrix3::zeros();
    for r in 0..3 {
        for c in 0..3 {
            h_mat[(r, c)] = h[3 * r + c];
        }
    }

    let t_dst_inv = t_dst.try_inverse()?;
    let h_mat = t_dst_inv * h_mat * t_src;
    if h_mat[(2, 2)].abs() <= f64::EPSILON {
        return None;
    }
    Homography::from_matrix(h_mat)
}

/// Euclidean distance between `h(src)` and `dst`; infinite if `src` maps to infinity
pub fn transfer_error(h: &Homography, src: &Point, dst: &Point) -> f64 {
    h.apply(src).map_or(f64::INFINITY, |p| (p - dst).norm())
}
