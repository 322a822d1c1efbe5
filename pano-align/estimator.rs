use log::debug;
use pano_core::{Homography, Point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::RansacConfig;
use crate::dlt::{fit_homography, transfer_error};
use crate::error::{AlignError, AlignResult};
use crate::geometry::PointPairs;
use crate::ransac::{ransac, RansacModel, RansacParams};

/// Three points closer to a line than this (triangle area, px^2) are degenerate
const COLLINEAR_AREA: f64 = 1e-6;

impl RansacModel for Homography {
    /// `(src, dst)`
    type Datum = (Point, Point);

    fn fit(data: &[Self::Datum], indices: &[usize]) -> Option<Self> {
        let (src, dst): (Vec<Point>, Vec<Point>) = indices.iter().map(|&i| data[i]).unzip();
        fit_homography(&src, &dst)
    }

    fn residual(&self, (src, dst): &Self::Datum) -> f64 {
        transfer_error(self, src, dst)
    }

    fn is_degenerate(data: &[Self::Datum], indices: &[usize]) -> bool {
        let src: Vec<Point> = indices.iter().map(|&i| data[i].0).collect();
        let dst: Vec<Point> = indices.iter().map(|&i| data[i].1).collect();
        has_collinear_triple(&src) || has_collinear_triple(&dst)
    }
}

fn has_collinear_triple(points: &[Point]) -> bool {
    let n = points.len();
    for i in 0..n {
        for j in i + 1..n {
            for k in j + 1..n {
                let (a, b, c) = (points[i], points[j], points[k]);
                let area = (b - a).perp(&(c - a));
                if area.abs() < COLLINEAR_AREA {
                    return true;
                }
            }
        }
    }
    false
}

/// Robustly fitted homography mapping image 2 onto image 1
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    pub homography: Homography,
    /// One flag per point pair
    pub inliers: Vec<bool>,
}

impl Estimate {
    pub fn inlier_count(&self) -> usize {
        self.inliers.iter().filter(|&&f| f).count()
    }
}

/// RANSAC homography estimator, `src` (image 2) onto `dst` (image 1)
#[derive(Debug, Clone)]
pub struct HomographyEstimator {
    cfg: RansacConfig,
}

impl HomographyEstimator {
    pub fn new(cfg: RansacConfig) -> AlignResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &RansacConfig {
        &self.cfg
    }

    /// Random source from the configured seed, or OS entropy without one
    pub fn make_rng(&self) -> StdRng {
        match self.cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Estimate with the configured random source
    pub fn estimate(&self, pairs: &PointPairs) -> AlignResult<Estimate> {
        let mut rng = self.make_rng();
        self.estimate_with_rng(pairs, &mut rng)
    }

    /// Estimate drawing samples from `rng`
    pub fn estimate_with_rng<R: Rng + ?Sized>(
        &self,
        pairs: &PointPairs,
        rng: &mut R,
    ) -> AlignResult<Estimate> {
        if pairs.len() < self.cfg.min_samples {
            return Err(AlignError::InsufficientCorrespondences {
                needed: self.cfg.min_samples,
                got: pairs.len(),
            });
        }

        let data: Vec<(Point, Point)> = pairs.iter().map(|(s, d)| (*s, *d)).collect();
        let params = RansacParams {
            min_samples: self.cfg.min_samples,
            residual_threshold: self.cfg.residual_threshold,
            max_trials: self.cfg.max_trials,
        };

        let outcome = ransac::<Homography, R>(&data, &params, rng).ok_or(AlignError::NoConsensus {
            trials: self.cfg.max_trials,
            best_inliers: 0,
        })?;

        let needed = self.cfg.min_inliers.max(self.cfg.min_samples);
        if outcome.inlier_count < needed {
            return Err(AlignError::NoConsensus {
                trials: self.cfg.max_trials,
                best_inliers: outcome.inlier_count,
            });
        }

        debug!(
            "homography: {}/{} inliers, {} of {} trials usable",
            outcome.inlier_count,
            pairs.len(),
            outcome.valid_trials,
            self.cfg.max_trials
        );
        Ok(Estimate {
            homography: outcome.model,
            inliers: outcome.inliers,
        })
    }
}
