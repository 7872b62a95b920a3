use nalgebra::Point2;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A matched descriptor pair that survived filtering. The indices refer into
/// the feature sets the match was produced from: `reference` into the
/// reference image's features and `query` into the current frame's features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Correspondence {
    /// Index into the reference feature set
    pub reference: usize,
    /// Index into the query feature set
    pub query: usize,
    /// Hamming distance between the two descriptors
    pub distance: u32,
}

/// Pixel-space point match, reference image point first, frame point second
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct PlanarMatch(pub Point2<f64>, pub Point2<f64>);
