use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced to the caller of the tracking pipeline.
///
/// Per-frame conditions that only mean "no detection this frame" (an empty
/// feature set, too few matches, a degenerate fit) are deliberately not in
/// this taxonomy. They leave the stream running and show up as a
/// [`TrackingResult`](crate::TrackingResult) without a detection.
#[derive(Debug, Error)]
pub enum Error {
    /// An operation that needs a reference object ran before one was loaded.
    #[error("no reference object loaded")]
    NoReferenceLoaded,
    /// The frame source failed to open. The tracker state is unchanged.
    #[error("frame source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),
    /// The operation cannot run while a stream is active. Stop it first.
    #[error("a stream is active")]
    StreamActive,
    /// The operation needs an active stream and none is running.
    #[error("no stream is active")]
    StreamInactive,
}

/// Failures of a frame source. Opening and reading fail separately so a
/// caller can tell a source that never existed from one that died mid-stream.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame failed to decode: {0}")]
    Decode(#[from] image::ImageError),
    #[error("frame file does not exist: {}", .0.display())]
    MissingPath(PathBuf),
}
