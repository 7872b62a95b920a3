use crate::FeatureSet;
use bitarray::Hamming;
use hgg::HggLite;
use reftrack_core::Correspondence;
use space::{Knn, KnnInsert, LinearKnn, Neighbor};

/// Finds descriptor correspondences between two feature sets.
pub trait DescriptorMatcher {
    /// For each reference descriptor, finds its `k` nearest query descriptors
    /// in ascending distance order.
    ///
    /// Returns an empty mapping when either feature set is too small to
    /// produce `k` candidates per descriptor. The ratio test needs `k = 2`.
    fn matches(
        &self,
        reference: &FeatureSet,
        query: &FeatureSet,
        k: usize,
    ) -> Vec<Vec<Neighbor<u32>>>;
}

/// Exhaustive matching over every descriptor pair.
///
/// Exact but quadratic in the feature counts. Fine for modest feature sets
/// and the correctness baseline the approximate matcher is judged against.
#[derive(Debug, Copy, Clone, Default)]
pub struct LinearMatcher;

impl DescriptorMatcher for LinearMatcher {
    fn matches(
        &self,
        reference: &FeatureSet,
        query: &FeatureSet,
        k: usize,
    ) -> Vec<Vec<Neighbor<u32>>> {
        if reference.is_empty() || query.len() < k {
            return vec![];
        }
        let knn = LinearKnn {
            metric: Hamming,
            iter: query.descriptors().iter(),
        };
        reference
            .descriptors()
            .iter()
            .map(|descriptor| knn.knn(descriptor, k))
            .collect()
    }
}

/// Approximate matching through a hierarchical greedy graph.
///
/// Builds an [`hgg`] index over the query descriptors and searches it once
/// per reference descriptor, trading a small amount of recall for speed on
/// dense feature sets.
#[derive(Debug, Copy, Clone)]
pub struct HggMatcher {
    /// Number of nearest neighbors a descriptor is linked to on insertion.
    /// Higher improves recall at the cost of indexing time.
    pub insert_knn: usize,
}

impl Default for HggMatcher {
    fn default() -> Self {
        Self { insert_knn: 32 }
    }
}

impl DescriptorMatcher for HggMatcher {
    fn matches(
        &self,
        reference: &FeatureSet,
        query: &FeatureSet,
        k: usize,
    ) -> Vec<Vec<Neighbor<u32>>> {
        if reference.is_empty() || query.len() < k {
            return vec![];
        }
        let mut index = HggLite::new(Hamming).insert_knn(self.insert_knn);
        for descriptor in query.descriptors() {
            index.insert(*descriptor, ());
        }
        reference
            .descriptors()
            .iter()
            .map(|descriptor| index.knn(descriptor, k))
            .collect()
    }
}

/// Retains only unambiguous candidates using Lowe's ratio test.
///
/// A candidate list survives iff its best distance is strictly below
/// `lowes_ratio` times its second best distance. Entries with fewer than two
/// candidates are dropped outright since their ambiguity cannot be assessed.
/// Output order follows reference index order.
pub fn ratio_filter(candidates: &[Vec<Neighbor<u32>>], lowes_ratio: f32) -> Vec<Correspondence> {
    candidates
        .iter()
        .enumerate()
        .filter_map(|(reference, neighbors)| match neighbors[..] {
            [best, second, ..] => ((best.distance as f32) < second.distance as f32 * lowes_ratio)
                .then(|| Correspondence {
                    reference,
                    query: best.index,
                    distance: best.distance,
                }),
            _ => None,
        })
        .collect()
}
