use log::trace;
use rand::{seq::index, Rng};
use reftrack_core::sample_consensus::{Consensus, Estimator, Model};

/// Classic batch RANSAC with an adaptive trial count.
///
/// Repeatedly fits models to random minimal samples and scores each by the
/// number of data points whose residual falls below `inlier_threshold`. The
/// trial budget shrinks as better models appear, stopping once a sample as
/// good as the current best would have been drawn with probability
/// `confidence`. The winning model is refit on its full inlier set.
///
/// The random source is supplied by the caller so runs can be reproduced by
/// seeding.
#[derive(Clone)]
pub struct Ransac<R> {
    max_iterations: usize,
    confidence: f64,
    inlier_threshold: f64,
    rng: R,
}

impl<R> Ransac<R> {
    /// `inlier_threshold` is the residual below which a datum counts as an
    /// inlier, in the units of the model's residual (pixels of reprojection
    /// error for homographies).
    pub fn new(inlier_threshold: f64, rng: R) -> Self {
        Self {
            max_iterations: 2000,
            confidence: 0.99,
            inlier_threshold,
            rng,
        }
    }

    /// Hard cap on sampling trials. Default is `2000`.
    pub fn max_iterations(self, max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }

    /// Probability that an all-inlier minimal sample has been drawn by the
    /// time the search stops early. Default is `0.99`.
    pub fn confidence(self, confidence: f64) -> Self {
        Self { confidence, ..self }
    }

    fn inliers<M: Model<Data>, Data>(&self, model: &M, data: &[Data]) -> Vec<usize> {
        data.iter()
            .enumerate()
            .filter(|(_, datum)| model.residual(datum) < self.inlier_threshold)
            .map(|(ix, _)| ix)
            .collect()
    }

    /// Trials after which a minimal sample of all inliers appears with
    /// probability `confidence`, given the observed inlier ratio.
    fn required_trials(&self, inlier_ratio: f64, min_samples: usize) -> usize {
        if inlier_ratio <= 0.0 {
            return self.max_iterations;
        }
        let sample_success = inlier_ratio.powi(min_samples as i32);
        if sample_success >= 1.0 {
            return 1;
        }
        let trials = ((1.0 - self.confidence).ln() / (1.0 - sample_success).ln()).ceil();
        (trials as usize).clamp(1, self.max_iterations)
    }
}

impl<E, R, Data> Consensus<E, Data> for Ransac<R>
where
    E: Estimator<Data>,
    R: Rng,
    Data: Clone,
{
    type Inliers = Vec<usize>;

    fn model<I>(&mut self, estimator: &E, data: I) -> Option<E::Model>
    where
        I: Iterator<Item = Data> + Clone,
    {
        self.model_inliers(estimator, data).map(|(model, _)| model)
    }

    fn model_inliers<I>(&mut self, estimator: &E, data: I) -> Option<(E::Model, Self::Inliers)>
    where
        I: Iterator<Item = Data> + Clone,
    {
        let data = data.collect::<Vec<_>>();
        if data.len() < E::MIN_SAMPLES {
            return None;
        }
        let mut best: Option<(E::Model, Vec<usize>)> = None;
        let mut required = self.max_iterations;
        let mut trial = 0;
        while trial < required {
            let sample = index::sample(&mut self.rng, data.len(), E::MIN_SAMPLES).into_vec();
            for model in estimator.estimate(sample.iter().map(|&ix| data[ix].clone())) {
                let inliers = self.inliers(&model, &data);
                let improved = best
                    .as_ref()
                    .map_or(true, |(_, best_inliers)| inliers.len() > best_inliers.len());
                if improved {
                    required = required.min(self.required_trials(
                        inliers.len() as f64 / data.len() as f64,
                        E::MIN_SAMPLES,
                    ));
                    trace!(
                        "trial {} raised support to {} of {} and lowered the trial budget to {}",
                        trial,
                        inliers.len(),
                        data.len(),
                        required
                    );
                    best = Some((model, inliers));
                }
            }
            trial += 1;
        }
        let (model, inliers) = best?;
        // A minimal sample always explains itself, so demand support beyond it.
        if inliers.len() <= E::MIN_SAMPLES {
            return None;
        }
        // Refit on the full inlier set for precision. The original model
        // stays if the refit loses support.
        let refit = estimator
            .estimate(inliers.iter().map(|&ix| data[ix].clone()))
            .into_iter()
            .map(|model| {
                let inliers = self.inliers(&model, &data);
                (model, inliers)
            })
            .max_by_key(|(_, inliers)| inliers.len());
        match refit {
            Some((refit_model, refit_inliers)) if refit_inliers.len() >= inliers.len() => {
                Some((refit_model, refit_inliers))
            }
            _ => Some((model, inliers)),
        }
    }
}
