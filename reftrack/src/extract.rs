use crate::FeatureSet;
use akaze::Akaze;
use image::DynamicImage;
use log::debug;
use reftrack_core::Keypoint;

/// Converts a raster image into a [`FeatureSet`].
///
/// Implementations must be deterministic for fixed pixel data and fixed
/// configuration, up to enumeration order, and must hold up under moderate
/// scale and in-plane rotation changes of the imaged object, which is the
/// whole reason an invariant detector is used instead of raw pixel
/// correlation. Color input is reduced to luminance internally.
pub trait FeatureExtractor {
    fn extract(&self, image: &DynamicImage) -> FeatureSet;
}

/// Feature extraction backed by [`akaze`].
///
/// AKAZE detects extrema in a nonlinear scale space and describes them with
/// oriented binary M-LDB descriptors, giving the scale and rotation
/// robustness the matcher depends on.
pub struct AkazeExtractor {
    akaze: Akaze,
}

impl AkazeExtractor {
    /// Creates an extractor with the given detector threshold.
    ///
    /// 0.01 will be very sparse and 0.0001 will be very dense.
    pub fn new(threshold: f64) -> Self {
        Self {
            akaze: Akaze::new(threshold),
        }
    }

    /// Sparsely detecting preset.
    pub fn sparse() -> Self {
        Self {
            akaze: Akaze::sparse(),
        }
    }

    /// Densely detecting preset.
    pub fn dense() -> Self {
        Self {
            akaze: Akaze::dense(),
        }
    }
}

impl Default for AkazeExtractor {
    fn default() -> Self {
        Self {
            akaze: Akaze::default(),
        }
    }
}

fn convert_keypoint(keypoint: akaze::KeyPoint) -> Keypoint {
    let akaze::KeyPoint {
        point: (x, y),
        size,
        angle,
        response,
        ..
    } = keypoint;
    Keypoint {
        x,
        y,
        size,
        angle,
        response,
    }
}

impl FeatureExtractor for AkazeExtractor {
    fn extract(&self, image: &DynamicImage) -> FeatureSet {
        let (keypoints, descriptors) = self.akaze.extract(image);
        debug!("akaze extracted {} features", descriptors.len());
        FeatureSet::new(
            keypoints.into_iter().map(convert_keypoint).collect(),
            descriptors,
        )
    }
}
