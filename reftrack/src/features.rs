use bitarray::BitArray;
use reftrack_core::{nalgebra::Point2, ImagePoint, Keypoint};

/// The keypoints and binary descriptors extracted from one image.
///
/// The arrays are parallel: `descriptors()[ix]` describes the neighborhood of
/// `keypoints()[ix]`. Enumeration order carries no meaning and nothing
/// downstream may rely on it. An image with no detectable structure is
/// represented by an empty set, not an error.
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    keypoints: Vec<Keypoint>,
    descriptors: Vec<BitArray<64>>,
}

impl FeatureSet {
    /// Bundles parallel keypoint and descriptor arrays.
    ///
    /// Panics if the arrays disagree in length, since a descriptor without
    /// its keypoint (or the reverse) cannot mean anything.
    pub fn new(keypoints: Vec<Keypoint>, descriptors: Vec<BitArray<64>>) -> Self {
        assert_eq!(
            keypoints.len(),
            descriptors.len(),
            "keypoints and descriptors must pair up one to one"
        );
        Self {
            keypoints,
            descriptors,
        }
    }

    /// A set with no features, what extraction of a structureless image yields.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn descriptors(&self) -> &[BitArray<64>] {
        &self.descriptors
    }

    /// Pixel-space location of the feature at `ix`.
    pub fn point(&self, ix: usize) -> Point2<f64> {
        self.keypoints[ix].image_point()
    }
}
