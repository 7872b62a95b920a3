use four_point::FourPoint;
use log::debug;
use reftrack_core::{sample_consensus::Consensus, Homography, PlanarMatch};

/// A homography accepted by consensus, with its supporting evidence.
#[derive(Debug, Clone)]
pub struct Fit {
    /// The reference-to-frame transform.
    pub homography: Homography,
    /// Inlier mask parallel to the input matches.
    pub inliers: Vec<bool>,
    /// Number of `true` entries in `inliers`.
    pub inlier_count: usize,
}

/// Robustly fits a reference-to-frame homography from point matches.
#[derive(Copy, Clone, Debug)]
pub struct PlanarFit {
    pub estimator: FourPoint,
    /// Fewer matches than this are not worth fitting, and a winning fit
    /// supported by fewer inliers is discarded.
    pub min_matches: usize,
}

impl PlanarFit {
    pub fn new(min_matches: usize) -> Self {
        Self {
            estimator: FourPoint::new(),
            min_matches,
        }
    }

    /// Runs `consensus` over `matches` and gates the result on `min_matches`.
    ///
    /// Returns `None` when the object cannot be considered found this frame:
    /// too few matches to attempt a fit, no model reached consensus, or the
    /// winner had too little inlier support.
    pub fn estimate<C>(&self, consensus: &mut C, matches: &[PlanarMatch]) -> Option<Fit>
    where
        C: Consensus<FourPoint, PlanarMatch>,
    {
        if matches.len() < self.min_matches {
            debug!(
                "{} matches is below the minimum of {} so no fit was attempted",
                matches.len(),
                self.min_matches
            );
            return None;
        }
        let (homography, inlier_indices) =
            consensus.model_inliers(&self.estimator, matches.iter().copied())?;
        let mut inliers = vec![false; matches.len()];
        for ix in inlier_indices {
            inliers[ix] = true;
        }
        let inlier_count = inliers.iter().filter(|&&inlier| inlier).count();
        if inlier_count < self.min_matches {
            debug!(
                "the winning fit had {} inliers which is below the minimum of {}",
                inlier_count, self.min_matches
            );
            return None;
        }
        debug!(
            "fit accepted with {} of {} matches as inliers",
            inlier_count,
            matches.len()
        );
        Some(Fit {
            homography,
            inliers,
            inlier_count,
        })
    }
}

impl Default for PlanarFit {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Ransac;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;
    use reftrack_core::nalgebra::{Matrix3, Point2};

    /// Fails the test if the gate ever lets a call through to consensus.
    struct PanicConsensus;

    impl Consensus<FourPoint, PlanarMatch> for PanicConsensus {
        type Inliers = Vec<usize>;

        fn model<I>(&mut self, _: &FourPoint, _: I) -> Option<Homography>
        where
            I: Iterator<Item = PlanarMatch> + Clone,
        {
            unreachable!("the match count gate was bypassed")
        }

        fn model_inliers<I>(&mut self, _: &FourPoint, _: I) -> Option<(Homography, Vec<usize>)>
        where
            I: Iterator<Item = PlanarMatch> + Clone,
        {
            unreachable!("the match count gate was bypassed")
        }
    }

    fn truth() -> Homography {
        Homography(Matrix3::new(
            0.9, 0.1, 25.0, -0.1, 0.9, 40.0, 2e-4, -1e-4, 1.0,
        ))
    }

    fn exact_matches(truth: &Homography, count: usize) -> Vec<PlanarMatch> {
        (0..count)
            .map(|ix| {
                let reference = Point2::new((ix % 5) as f64 * 30.0, (ix / 5) as f64 * 30.0);
                PlanarMatch(reference, truth.transform(reference).unwrap())
            })
            .collect()
    }

    fn far_outliers(truth: &Homography, count: usize) -> Vec<PlanarMatch> {
        (0..count)
            .map(|ix| {
                let reference = Point2::new(10.0 + 13.0 * ix as f64, 140.0 - 9.0 * ix as f64);
                let projected = truth.transform(reference).unwrap();
                PlanarMatch(
                    reference,
                    Point2::new(projected.x - 90.0, projected.y + 70.0 + 11.0 * ix as f64),
                )
            })
            .collect()
    }

    #[test]
    fn below_minimum_never_invokes_consensus() {
        let fit = PlanarFit::new(10);
        let matches = exact_matches(&truth(), 9);
        assert!(fit.estimate(&mut PanicConsensus, &matches).is_none());
    }

    #[test]
    fn mask_marks_exactly_the_inliers() {
        let truth = truth();
        let mut matches = exact_matches(&truth, 12);
        matches.extend(far_outliers(&truth, 3));

        let fit = PlanarFit::new(10);
        let mut consensus = Ransac::new(5.0, Xoshiro256PlusPlus::seed_from_u64(0));
        let fit = fit
            .estimate(&mut consensus, &matches)
            .expect("fit failed on mostly inlier matches");

        assert_eq!(fit.inliers.len(), matches.len());
        assert_eq!(fit.inlier_count, 12);
        assert!(fit.inliers[..12].iter().all(|&inlier| inlier));
        assert!(fit.inliers[12..].iter().all(|&inlier| !inlier));
    }

    #[test]
    fn all_noise_returns_none() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let matches = (0..20)
            .map(|_| {
                PlanarMatch(
                    Point2::new(rng.gen_range(0.0..200.0), rng.gen_range(0.0..200.0)),
                    Point2::new(rng.gen_range(0.0..800.0), rng.gen_range(0.0..800.0)),
                )
            })
            .collect::<Vec<_>>();

        let fit = PlanarFit::new(10);
        let mut consensus = Ransac::new(5.0, Xoshiro256PlusPlus::seed_from_u64(0));
        assert!(fit.estimate(&mut consensus, &matches).is_none());
    }

    #[test]
    fn too_few_inliers_are_rejected() {
        let truth = truth();
        let mut matches = exact_matches(&truth, 8);
        matches.extend(far_outliers(&truth, 7));

        let fit = PlanarFit::new(10);
        let mut consensus = Ransac::new(5.0, Xoshiro256PlusPlus::seed_from_u64(0));
        assert!(fit.estimate(&mut consensus, &matches).is_none());
    }
}
