//! Tracks a planar reference object through a stream of frames.
//!
//! One reference image is loaded up front. Every incoming frame is then
//! handled from scratch: AKAZE features are extracted and matched against
//! the reference's, Lowe's ratio test discards ambiguous matches, and a
//! reference-to-frame homography is fit by random sample consensus over a
//! four point direct linear solver. A frame either produces a [`Detection`]
//! with the reference outline projected into frame space or reports that
//! the object was not found, and either way the stream keeps going.
//!
//! [`Tracker`] owns the session state machine and the per-frame pass, and
//! [`FrameSource`] abstracts where frames come from.

mod error;
mod extract;
mod features;
mod fit;
mod matching;
mod pipeline;
mod ransac;
mod settings;
mod source;

pub use error::*;
pub use extract::*;
pub use features::*;
pub use fit::*;
pub use matching::*;
pub use pipeline::*;
pub use ransac::*;
pub use settings::*;
pub use source::*;

pub use four_point::FourPoint;
pub use reftrack_core::{
    nalgebra, sample_consensus, Correspondence, Homography, ImagePoint, Keypoint, PlanarMatch,
};
