pub mod filter;

use nalgebra::{Matrix3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Float RGB image, values assumed non-negative
pub type RgbImage = image::Rgb32FImage;

/// Geometric point in `(x, y)` convention
pub type Point = nalgebra::Point2<f64>;

/// Integer pixel position in `(row, col)` storage convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PixelCoord {
    pub row: usize,
    pub col: usize,
}

impl PixelCoord {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Swap to geometric `(x, y)` = `(col, row)`
    pub fn to_point(self) -> Point {
        Point::new(self.col as f64, self.row as f64)
    }
}

/// Candidate match: `first` indexes image 1 keypoints, `second` image 2 keypoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Correspondence {
    pub first: usize,
    pub second: usize,
}

impl Correspondence {
    pub fn new(first: usize, second: usize) -> Self {
        Self { first, second }
    }
}

/// Below this the homogeneous scale is treated as a point at infinity.
const W_EPSILON: f64 = 1e-12;

/// 3x3 projective transform acting on homogeneous `(x, y, 1)` points.
///
/// The matrix is kept normalised so that `h[2,2] == 1` whenever that
/// element is not (numerically) zero.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Homography {
    matrix: Matrix3<f64>,
}

impl Homography {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// Wrap a matrix, normalising its scale. Returns `None` for non-finite input.
    pub fn from_matrix(matrix: Matrix3<f64>) -> Option<Self> {
        if matrix.iter().any(|v| !v.is_finite()) {
            return None;
        }
        let scale = matrix[(2, 2)];
        let matrix = if scale.abs() > f64::EPSILON {
            matrix / scale
        } else {
            matrix
        };
        Some(Self { matrix })
    }

    /// Pure translation by `(tx, ty)`
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            matrix: Matrix3::new(1.0, 0.0, tx, 0.0, 1.0, ty, 0.0, 0.0, 1.0),
        }
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Map a point; `None` when it lands at infinity
    pub fn apply(&self, p: &Point) -> Option<Point> {
        let v = self.matrix * Vector3::new(p.x, p.y, 1.0);
        if v.z.abs() < W_EPSILON || !v.z.is_finite() {
            return None;
        }
        Some(Point::new(v.x / v.z, v.y / v.z))
    }

    /// `T(tx, ty) · self`: apply this transform, then shift the result
    pub fn pre_translate(&self, tx: f64, ty: f64) -> Self {
        Self {
            matrix: Homography::translation(tx, ty).matrix * self.matrix,
        }
    }

    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().and_then(Self::from_matrix)
    }
}

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}

/// Row-major scalar grid, one value per source pixel
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMap {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl ResponseMap {
    /// Returns `None` if `data.len() != width * height`
    pub fn from_raw(width: usize, height: usize, data: Vec<f32>) -> Option<Self> {
        if data.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    /// Largest value, `None` for an empty map
    pub fn max(&self) -> Option<f32> {
        self.data.iter().copied().reduce(f32::max)
    }
}

/// Number of worker threads to use when none is configured
pub fn default_threads() -> usize {
    num_cpus::get().max(1)
}

/// Build a Rayon thread pool with the specified number of threads
pub fn build_thread_pool(n_threads: usize) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .thread_name(|i| format!("pano-worker-{}", i))
        .build()
}
