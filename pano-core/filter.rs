use rayon::prelude::*;

/// How samples outside a plane are synthesised during filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Border {
    /// Outside samples are zero
    Zero,
    /// Reflect about the edge pixel without repeating it (`d c b | a b c d | c b a`)
    Mirror,
    /// Repeat the edge pixel
    Nearest,
}

/// Normalised 1-D Gaussian taps, truncated at four standard deviations
pub fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (4.0 * sigma + 0.5) as usize;
    let denom = 2.0 * sigma * sigma;
    let mut taps: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let d = i as f32 - radius as f32;
            (-d * d / denom).exp()
        })
        .collect();
    let sum: f32 = taps.iter().sum();
    taps.iter_mut().for_each(|t| *t /= sum);
    taps
}

#[inline]
fn resolve(i: isize, len: usize, border: Border) -> Option<usize> {
    let n = len as isize;
    if (0..n).contains(&i) {
        return Some(i as usize);
    }
    match border {
        Border::Zero => None,
        Border::Nearest => Some(i.clamp(0, n - 1) as usize),
        Border::Mirror => {
            if n == 1 {
                return Some(0);
            }
            let period = 2 * (n - 1);
            let mut m = i.rem_euclid(period);
            if m >= n {
                m = period - m;
            }
            Some(m as usize)
        }
    }
}

/// Separable Gaussian blur of a row-major plane. `sigma <= 0` returns a copy.
pub fn gaussian_blur_plane(
    data: &[f32],
    width: usize,
    height: usize,
    sigma: f32,
    border: Border,
) -> Vec<f32> {
    debug_assert_eq!(data.len(), width * height);
    if sigma <= 0.0 || data.is_empty() {
        return data.to_vec();
    }
    let taps = gaussian_kernel(sigma);
    let radius = (taps.len() / 2) as isize;

    let mut horizontal = vec![0.0f32; data.len()];
    horizontal
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, out_row)| {
            let row = &data[y * width..(y + 1) * width];
            for (x, out) in out_row.iter_mut().enumerate() {
                let mut acc = 0.0f32;
                for (k, &t) in taps.iter().enumerate() {
                    let xi = x as isize + k as isize - radius;
                    if let Some(xx) = resolve(xi, width, border) {
                        acc += t * row[xx];
                    }
                }
                *out = acc;
            }
        });

    let mut out = vec![0.0f32; data.len()];
    out.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, out_row)| {
            for (x, out) in out_row.iter_mut().enumerate() {
                let mut acc = 0.0f32;
                for (k, &t) in taps.iter().enumerate() {
                    let yi = y as isize + k as isize - radius;
                    if let Some(yy) = resolve(yi, height, border) {
                        acc += t * horizontal[yy * width + x];
                    }
                }
                *out = acc;
            }
        });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_is_normalised_and_symmetric() {
        let k = gaussian_kernel(2.0);
        assert_eq!(k.len(), 17);
        assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        for i in 0..k.len() / 2 {
            assert!((k[i] - k[k.len() - 1 - i]).abs() < 1e-7);
        }
    }

    #[test]
    fn test_constant_plane_preserved_with_mirror() {
        let data = vec![3.5f32; 9 * 7];
        let out = gaussian_blur_plane(&data, 9, 7, 1.5, Border::Mirror);
        assert!(out.iter().all(|v| (v - 3.5).abs() < 1e-4));
    }

    #[test]
    fn test_zero_border_darkens_edges() {
        let data = vec![1.0f32; 10 * 10];
        let out = gaussian_blur_plane(&data, 10, 10, 1.0, Border::Zero);
        assert!(out[0] < 0.6);
        assert!((out[5 * 10 + 5] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_values_outside_unit_range_survive() {
        let data = vec![-4.0f32; 5 * 5];
        let out = gaussian_blur_plane(&data, 5, 5, 1.0, Border::Nearest);
        assert!(out.iter().all(|v| (v + 4.0).abs() < 1e-4));
    }

    #[test]
    fn test_mirror_index() {
        assert_eq!(resolve(-1, 4, Border::Mirror), Some(1));
        assert_eq!(resolve(4, 4, Border::Mirror), Some(2));
        assert_eq!(resolve(-1, 4, Border::Zero), None);
        assert_eq!(resolve(7, 4, Border::Nearest), Some(3));
    }
}
