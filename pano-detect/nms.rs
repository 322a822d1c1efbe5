use pano_core::{PixelCoord, ResponseMap};
use rayon::prelude::*;

use crate::error::{DetectError, DetectResult};

/// Local-maximum selection over a corner response map.
///
/// A pixel survives when it equals the maximum of the `window_size x
/// window_size` neighbourhood centred on it (zero padding outside the map)
/// and its value is strictly above `threshold_rel * max(map)`. Output is in
/// row-major scan order.
pub fn select_local_maxima(
    map: &ResponseMap,
    window_size: usize,
    threshold_rel: f32,
) -> DetectResult<Vec<PixelCoord>> {
    if window_size == 0 || window_size % 2 == 0 {
        return Err(DetectError::InvalidWindowSize(window_size));
    }
    if !threshold_rel.is_finite() || threshold_rel < 0.0 {
        return Err(DetectError::InvalidThreshold(threshold_rel));
    }

    let max = match map.max() {
        Some(m) if m > 0.0 => m,
        _ => return Ok(Vec::new()),
    };
    let thresh = threshold_rel * max;
    let local_max = maximum_filter(map, window_size / 2);
    let width = map.width();

    let coords = (0..map.height())
        .into_par_iter()
        .flat_map_iter(|row| {
            let local_max = &local_max;
            (0..width).filter_map(move |col| {
                let v = map.get(row, col);
                (v == local_max[row * width + col] && v > thresh)
                    .then(|| PixelCoord::new(row, col))
            })
        })
        .collect();

    Ok(coords)
}

/// Remove coordinates within `edge` pixels of any border.
///
/// Keeps `edge < row < height - edge` and `edge < col < width - edge`.
/// Works on any coordinate set, not only the output of
/// [`select_local_maxima`].
pub fn discard_edges(
    coords: &[PixelCoord],
    height: usize,
    width: usize,
    edge: usize,
) -> Vec<PixelCoord> {
    let inside = |v: usize, len: usize| v > edge && v + edge < len;
    coords
        .iter()
        .copied()
        .filter(|c| inside(c.row, height) && inside(c.col, width))
        .collect()
}

/// Separable `(2r+1)^2` maximum filter with zero padding
fn maximum_filter(map: &ResponseMap, radius: usize) -> Vec<f32> {
    let (w, h) = (map.width(), map.height());
    let data = map.data();
    if radius == 0 {
        return data.to_vec();
    }

    let mut horizontal = vec![0.0f32; data.len()];
    horizontal
        .par_chunks_mut(w)
        .enumerate()
        .for_each(|(y, out_row)| {
            let row = &data[y * w..(y + 1) * w];
            for (x, out) in out_row.iter_mut().enumerate() {
                let lo = x.saturating_sub(radius);
                let hi = (x + radius).min(w - 1);
                let mut m = row[lo..=hi].iter().copied().fold(f32::NEG_INFINITY, f32::max);
                if x < radius || x + radius >= w {
                    m = m.max(0.0);
                }
                *out = m;
            }
        });

    let mut out = vec![0.0f32; data.len()];
    out.par_chunks_mut(w).enumerate().for_each(|(y, out_row)| {
        let lo = y.saturating_sub(radius);
        let hi = (y + radius).min(h - 1);
        let padded = y < radius || y + radius >= h;
        for (x, out) in out_row.iter_mut().enumerate() {
            let mut m = (lo..=hi)
                .map(|yy| horizontal[yy * w + x])
                .fold(f32::NEG_INFINITY, f32::max);
            if padded {
                m = m.max(0.0);
            }
            *out = m;
        }
    });
    out
}
