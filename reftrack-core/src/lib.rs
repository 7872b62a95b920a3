//! # reftrack-core
//!
//! This library provides the common types shared by the planar reference-object
//! tracking crates: pixel-space keypoints, descriptor correspondences, point
//! matches, and the homography model those matches are fit against. The crate
//! is deliberately small so that estimators and pipelines can interoperate by
//! depending on it without pulling in image decoding or matching machinery.
//!
//! The crate works with `#![no_std]` and performs no allocation. Anything that
//! needs collections or I/O belongs in the pipeline crate instead.

#![no_std]

mod homography;
mod keypoint;
mod matches;

pub use homography::*;
pub use keypoint::*;
pub use matches::*;
pub use nalgebra;
pub use sample_consensus;
