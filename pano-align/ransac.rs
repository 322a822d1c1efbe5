//! Random sample consensus over an arbitrary model family.
//!
//! Each trial draws `min_samples` distinct data indices, fits a candidate,
//! and counts the data whose residual is strictly below the threshold. The
//! candidate with the most inliers wins, ties going to the lower residual
//! sum. The winner is then re-fitted on all of its inliers.

use rand::Rng;

/// A model that RANSAC can fit from index samples
pub trait RansacModel: Sized {
    type Datum;

    /// Fit from the data at `indices`; `None` for a degenerate fit
    fn fit(data: &[Self::Datum], indices: &[usize]) -> Option<Self>;

    fn residual(&self, datum: &Self::Datum) -> f64;

    /// Cheap rejection of samples that cannot give a meaningful model
    fn is_degenerate(_data: &[Self::Datum], _indices: &[usize]) -> bool {
        false
    }
}

/// Sampling parameters for one RANSAC run
#[derive(Debug, Clone, Copy)]
pub struct RansacParams {
    pub min_samples: usize,
    pub residual_threshold: f64,
    pub max_trials: usize,
}

#[derive(Debug, Clone)]
pub struct RansacOutcome<M> {
    pub model: M,
    /// One flag per datum
    pub inliers: Vec<bool>,
    pub inlier_count: usize,
    /// Trials that produced a usable candidate
    pub valid_trials: usize,
}

struct Candidate<M> {
    model: M,
    inliers: Vec<bool>,
    count: usize,
    residual_sum: f64,
}

fn score<M: RansacModel>(model: M, data: &[M::Datum], threshold: f64) -> Candidate<M> {
    let mut inliers = vec![false; data.len()];
    let mut count = 0;
    let mut residual_sum = 0.0;
    for (flag, datum) in inliers.iter_mut().zip(data) {
        let r = model.residual(datum);
        if r < threshold {
            *flag = true;
            count += 1;
            residual_sum += r;
        }
    }
    Candidate {
        model,
        inliers,
        count,
        residual_sum,
    }
}

/// Run RANSAC. `None` when there are fewer data than `min_samples` or no
/// trial produced a usable model.
pub fn ransac<M, R>(data: &[M::Datum], params: &RansacParams, rng: &mut R) -> Option<RansacOutcome<M>>
where
    M: RansacModel,
    R: Rng + ?Sized,
{
    let n = data.len();
    if params.min_samples == 0 || n < params.min_samples {
        return None;
    }

    let mut best: Option<Candidate<M>> = None;
    let mut valid_trials = 0;

    for _ in 0..params.max_trials {
        let sample = rand::seq::index::sample(rng, n, params.min_samples).into_vec();
        if M::is_degenerate(data, &sample) {
            continue;
        }
        let Some(model) = M::fit(data, &sample) else {
            continue;
        };
        valid_trials += 1;

        let candidate = score(model, data, params.residual_threshold);
        let better = match &best {
            None => true,
            Some(b) => {
                candidate.count > b.count
                    || (candidate.count == b.count && candidate.residual_sum < b.residual_sum)
            }
        };
        if better {
            best = Some(candidate);
        }
    }

    let best = best?;
    let inlier_indices: Vec<usize> = best
        .inliers
        .iter()
        .enumerate()
        .filter_map(|(i, &f)| f.then_some(i))
        .collect();
    let model = if inlier_indices.len() >= params.min_samples {
        M::fit(data, &inlier_indices).unwrap_or(best.model)
    } else {
        best.model
    };

    Some(RansacOutcome {
        model,
        inliers: best.inliers,
        inlier_count: best.count,
        valid_trials,
    })
}
