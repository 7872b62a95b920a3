use crate::PlanarMatch;
use derive_more::{AsMut, AsRef, Deref, DerefMut, From, Into};
use nalgebra::{Matrix3, Point2, Vector3};
use num_traits::Float;
use sample_consensus::Model;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Below this homogeneous scale a projected point is considered to lie on the
/// plane at infinity.
const HOMOGENEOUS_EPSILON: f64 = 1e-9;

/// This stores a homography, a planar projective transform satisfying:
///
/// `w * [x', y', 1] = H * [x, y, 1]`
///
/// Where `[x, y]` is a reference-image pixel coordinate and `[x', y']` is the
/// corresponding frame pixel coordinate. The matrix is defined up to scale;
/// estimators normalize it so the bottom-right entry is `1` whenever that
/// entry is well-conditioned.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, AsMut, AsRef, Deref, DerefMut, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Homography(pub Matrix3<f64>);

impl Homography {
    /// The identity transform, which maps every point to itself.
    pub fn identity() -> Self {
        Self(Matrix3::identity())
    }

    /// Maps a reference-image point into frame coordinates.
    ///
    /// Returns `None` when the homogeneous scale of the projected point
    /// vanishes, which sends the point to infinity.
    pub fn transform(&self, point: Point2<f64>) -> Option<Point2<f64>> {
        let projected = self.0 * Vector3::new(point.x, point.y, 1.0);
        if Float::abs(projected.z) < HOMOGENEOUS_EPSILON {
            return None;
        }
        Some(Point2::new(
            projected.x / projected.z,
            projected.y / projected.z,
        ))
    }
}

impl Model<PlanarMatch> for Homography {
    fn residual(&self, data: &PlanarMatch) -> f64 {
        let &PlanarMatch(reference, frame) = data;
        match self.transform(reference) {
            Some(projected) => nalgebra::distance(&projected, &frame),
            None => f64::INFINITY,
        }
    }
}
