use nalgebra::Point2;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Allows the retrieval of the point on the image the feature came from.
pub trait ImagePoint {
    /// Retrieves the point on the image
    fn image_point(&self) -> Point2<f64>;
}

/// A feature location on an image frame. The coordinates are in pixel space,
/// neither undistorted nor normalized. The scale and orientation describe the
/// local neighborhood the detector found the feature at, which is what makes
/// matching stable under moderate zoom and in-plane rotation.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Keypoint {
    /// Horizontal pixel coordinate
    pub x: f32,
    /// Vertical pixel coordinate
    pub y: f32,
    /// Diameter of the neighborhood the feature was detected at
    pub size: f32,
    /// Orientation of the feature in radians
    pub angle: f32,
    /// Detector response strength
    pub response: f32,
}

impl ImagePoint for Keypoint {
    fn image_point(&self) -> Point2<f64> {
        Point2::new(self.x as f64, self.y as f64)
    }
}
