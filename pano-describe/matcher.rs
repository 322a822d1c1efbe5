use log::debug;
use pano_core::Correspondence;
use rayon::prelude::*;

use crate::config::MatcherConfig;
use crate::descriptor::DescriptorSet;
use crate::error::{DescribeError, DescribeResult};

/// Candidate correspondence search between two descriptor sets.
///
/// `Correspondence::first` indexes rows of `first`, `second` rows of `second`.
pub trait DescriptorMatcher: Send + Sync {
    fn match_descriptors(
        &self,
        first: &DescriptorSet,
        second: &DescriptorSet,
    ) -> DescribeResult<Vec<Correspondence>>;
}

/// Brute-force nearest neighbour with Lowe's ratio test
#[derive(Debug, Clone)]
pub struct RatioMatcher {
    cfg: MatcherConfig,
}

impl Default for RatioMatcher {
    fn default() -> Self {
        Self {
            cfg: MatcherConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Nearest {
    index: usize,
    best: f32,
    second: f32,
}

impl RatioMatcher {
    pub fn new(cfg: MatcherConfig) -> DescribeResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.cfg
    }

    /// Best and second-best squared distance from `query` into `set`
    fn nearest(query: &[f32], set: &DescriptorSet) -> Option<Nearest> {
        let mut found: Option<Nearest> = None;
        for (j, row) in set.rows().enumerate() {
            let d = squared_distance(query, row);
            found = Some(match found {
                None => Nearest { index: j, best: d, second: f32::INFINITY },
                Some(n) if d < n.best => Nearest { index: j, best: d, second: n.best },
                Some(n) if d < n.second => Nearest { second: d, ..n },
                Some(n) => n,
            });
        }
        found
    }

    fn passes_ratio(&self, n: &Nearest) -> bool {
        n.second.is_finite() && n.best < self.cfg.ratio * self.cfg.ratio * n.second
    }
}

impl DescriptorMatcher for RatioMatcher {
    fn match_descriptors(
        &self,
        first: &DescriptorSet,
        second: &DescriptorSet,
    ) -> DescribeResult<Vec<Correspondence>> {
        if first.dim() != second.dim() {
            return Err(DescribeError::DimensionMismatch {
                first: first.dim(),
                second: second.dim(),
            });
        }
        if first.is_empty() || second.is_empty() {
            return Ok(Vec::new());
        }

        let forward: Vec<Option<Nearest>> = (0..first.len())
            .into_par_iter()
            .map(|i| Self::nearest(first.row(i), second).filter(|n| self.passes_ratio(n)))
            .collect();

        let backward: Option<Vec<Option<usize>>> = self.cfg.cross_check.then(|| {
            (0..second.len())
                .into_par_iter()
                .map(|j| Self::nearest(second.row(j), first).map(|n| n.index))
                .collect()
        });

        let matches: Vec<Correspondence> = forward
            .iter()
            .enumerate()
            .filter_map(|(i, n)| {
                let n = (*n)?;
                let mutual = backward
                    .as_ref()
                    .map_or(true, |back| back[n.index] == Some(i));
                mutual.then(|| Correspondence::new(i, n.index))
            })
            .collect();

        debug!(
            "matched {} of {} x {} descriptors",
            matches.len(),
            first.len(),
            second.len()
        );
        Ok(matches)
    }
}

#[inline]
fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pano_core::PixelCoord;

    fn set(rows: &[[f32; 3]]) -> DescriptorSet {
        let data = rows.iter().flat_map(|r| r.iter().copied()).collect();
        let kps = (0..rows.len()).map(|i| PixelCoord::new(i, i)).collect();
        DescriptorSet::from_parts(3, data, kps).unwrap()
    }

    #[test]
    fn test_invalid_ratio() {
        let cfg = MatcherConfig { ratio: 1.5, cross_check: false };
        assert_eq!(RatioMatcher::new(cfg).unwrap_err(), DescribeError::InvalidRatio(1.5));
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = set(&[[0.0, 0.0, 1.0]]);
        let b = DescriptorSet::empty(4);
        assert!(matches!(
            RatioMatcher::default().match_descriptors(&a, &b),
            Err(DescribeError::DimensionMismatch { first: 3, second: 4 })
        ));
    }

    #[test]
    fn test_empty_sets_give_no_matches() {
        let a = DescriptorSet::empty(3);
        let b = set(&[[1.0, 0.0, 0.0]]);
        assert!(RatioMatcher::default().match_descriptors(&a, &b).unwrap().is_empty());
        assert!(RatioMatcher::default().match_descriptors(&b, &a).unwrap().is_empty());
    }

    #[test]
    fn test_distinct_descriptors_match_by_index() {
        let a = set(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        let b = set(&[[0.0, 0.0, 0.9], [1.0, 0.1, 0.0], [0.0, 1.0, 0.1]]);
        let matches = RatioMatcher::default().match_descriptors(&a, &b).unwrap();
        assert_eq!(
            matches,
            vec![
                Correspondence::new(0, 1),
                Correspondence::new(1, 2),
                Correspondence::new(2, 0),
            ]
        );
    }

    #[test]
    fn test_ambiguous_match_rejected() {
        let a = set(&[[1.0, 0.0, 0.0]]);
        let b = set(&[[0.9, 0.1, 0.0], [0.9, 0.0, 0.1]]);
        assert!(RatioMatcher::default().match_descriptors(&a, &b).unwrap().is_empty());
    }

    #[test]
    fn test_single_candidate_has_no_second_best() {
        let a = set(&[[1.0, 0.0, 0.0]]);
        let b = set(&[[1.0, 0.0, 0.0]]);
        assert!(RatioMatcher::default().match_descriptors(&a, &b).unwrap().is_empty());
    }

    #[test]
    fn test_cross_check_removes_one_sided_matches() {
        // Both rows of `a` prefer b[0]; b[0] prefers a[0]
        let a = set(&[[1.0, 0.0, 0.0], [0.8, 0.0, 0.0]]);
        let b = set(&[[1.0, 0.0, 0.0], [-5.0, 0.0, 0.0]]);

        let strict = RatioMatcher::new(MatcherConfig { ratio: 0.9, cross_check: true }).unwrap();
        assert_eq!(
            strict.match_descriptors(&a, &b).unwrap(),
            vec![Correspondence::new(0, 0)]
        );

        let loose = RatioMatcher::new(MatcherConfig { ratio: 0.9, cross_check: false }).unwrap();
        assert_eq!(
            loose.match_descriptors(&a, &b).unwrap(),
            vec![Correspondence::new(0, 0), Correspondence::new(1, 0)]
        );
    }
}
