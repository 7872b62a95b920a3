#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The settings for the tracking pipeline.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone)]
pub struct TrackerSettings {
    /// The threshold used for akaze feature extraction
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_akaze_threshold")
    )]
    pub akaze_threshold: f64,
    /// The fraction of the second-best descriptor distance the best distance must stay
    /// strictly below for a match to survive the ratio test
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_lowes_ratio"))]
    pub lowes_ratio: f32,
    /// The minimum number of filtered matches needed to attempt a fit, and the
    /// minimum number of inliers a winning fit must keep to count as a detection
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_min_matches"))]
    pub min_matches: usize,
    /// The maximum reprojection error in pixels for a match to count as an inlier
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_inlier_threshold")
    )]
    pub inlier_threshold: f64,
    /// The cap on the number of RANSAC trials
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_ransac_iterations")
    )]
    pub ransac_iterations: usize,
    /// The probability that an all-inlier sample has been drawn once RANSAC exits early
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_ransac_confidence")
    )]
    pub ransac_confidence: f64,
    /// The width in pixels the reference image is downscaled to when wider
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_reference_max_width")
    )]
    pub reference_max_width: u32,
    /// The width in pixels each incoming frame is downscaled to when wider
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_frame_max_width")
    )]
    pub frame_max_width: u32,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            akaze_threshold: default_akaze_threshold(),
            lowes_ratio: default_lowes_ratio(),
            min_matches: default_min_matches(),
            inlier_threshold: default_inlier_threshold(),
            ransac_iterations: default_ransac_iterations(),
            ransac_confidence: default_ransac_confidence(),
            reference_max_width: default_reference_max_width(),
            frame_max_width: default_frame_max_width(),
        }
    }
}

fn default_akaze_threshold() -> f64 {
    0.001
}

fn default_lowes_ratio() -> f32 {
    0.75
}

fn default_min_matches() -> usize {
    10
}

fn default_inlier_threshold() -> f64 {
    5.0
}

fn default_ransac_iterations() -> usize {
    2000
}

fn default_ransac_confidence() -> f64 {
    0.99
}

fn default_reference_max_width() -> u32 {
    640
}

fn default_frame_max_width() -> u32 {
    800
}
