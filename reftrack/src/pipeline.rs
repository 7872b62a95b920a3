use crate::{
    ratio_filter, DescriptorMatcher, Error, FeatureExtractor, FeatureSet, FrameSource, PlanarFit,
    SourceError, TrackerSettings,
};
use four_point::FourPoint;
use image::{imageops::FilterType, DynamicImage, GenericImageView};
use itertools::Itertools;
use log::{debug, info, warn};
use reftrack_core::{
    nalgebra::Point2, sample_consensus::Consensus, Correspondence, Homography, PlanarMatch,
};

/// The loaded reference image with everything derived from it.
pub struct ReferenceObject {
    image: DynamicImage,
    features: FeatureSet,
    corners: [Point2<f64>; 4],
}

impl ReferenceObject {
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// Corner quad in reference pixel space, in top-left, bottom-left,
    /// bottom-right, top-right order.
    pub fn corners(&self) -> &[Point2<f64>; 4] {
        &self.corners
    }
}

/// A successful localization of the reference object in one frame.
#[derive(Clone, Debug)]
pub struct Detection {
    /// Reference-to-frame transform.
    pub homography: Homography,
    /// The reference corner quad projected into frame space, in the same
    /// order as [`ReferenceObject::corners`].
    pub corners: [Point2<f64>; 4],
    /// Inlier mask parallel to the result's correspondences.
    pub inliers: Vec<bool>,
    /// Number of `true` entries in `inliers`.
    pub inlier_count: usize,
}

/// Everything produced by one pass over one frame.
#[derive(Clone)]
pub struct TrackingResult {
    /// Index of the frame within this tracker's lifetime, starting at zero.
    pub frame: usize,
    /// The frame the pass ran on, after any downscale. All reported
    /// coordinates are in this image's pixel space.
    pub image: DynamicImage,
    pub features: FeatureSet,
    pub correspondences: Vec<Correspondence>,
    /// `None` when the object was not found this frame.
    pub detection: Option<Detection>,
}

/// Lifecycle of a tracking session.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TrackerState {
    /// No reference object loaded.
    Idle,
    /// Reference loaded, no stream attached.
    Ready,
    /// A frame source is attached and frames can be advanced.
    Streaming,
}

/// What one [`Tracker::advance`] call produced.
#[derive(Clone)]
pub enum StreamEvent {
    /// One frame was pulled and fully processed.
    Tracked(TrackingResult),
    /// The source is exhausted or failed; the tracker is Ready again.
    Ended,
}

/// Per-frame planar tracking of one reference object.
///
/// Generic over the feature extractor, the descriptor matcher, and the
/// consensus algorithm so tools and tests can swap implementations. Each
/// frame is tracked from scratch with no temporal prediction, so a lost
/// object is reacquired the moment it is visible again.
///
/// A session moves between three states: Idle until a reference is loaded,
/// Ready once one is, and Streaming while a [`FrameSource`] is attached.
/// Frame passes are serialized by `&mut self`, so results always reach the
/// caller in acquisition order.
pub struct Tracker<X, M, C> {
    extractor: X,
    matcher: M,
    consensus: C,
    fit: PlanarFit,
    settings: TrackerSettings,
    reference: Option<ReferenceObject>,
    source: Option<Box<dyn FrameSource>>,
    frames_processed: usize,
}

impl<X, M, C> Tracker<X, M, C>
where
    X: FeatureExtractor,
    M: DescriptorMatcher,
    C: Consensus<FourPoint, PlanarMatch>,
{
    pub fn new(extractor: X, matcher: M, consensus: C, settings: TrackerSettings) -> Self {
        Self {
            extractor,
            matcher,
            consensus,
            fit: PlanarFit::new(settings.min_matches),
            settings,
            reference: None,
            source: None,
            frames_processed: 0,
        }
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    /// Where the session currently is in its lifecycle.
    pub fn state(&self) -> TrackerState {
        if self.source.is_some() {
            TrackerState::Streaming
        } else if self.reference.is_some() {
            TrackerState::Ready
        } else {
            TrackerState::Idle
        }
    }

    pub fn reference(&self) -> Option<&ReferenceObject> {
        self.reference.as_ref()
    }

    /// Loads and prepares a reference image, replacing any previous one.
    ///
    /// The image is downscaled to the configured maximum width before
    /// extraction to bound the descriptor count. Rejected with
    /// [`Error::StreamActive`] while a stream is running; stop first.
    pub fn load_reference(&mut self, image: DynamicImage) -> Result<(), Error> {
        if self.source.is_some() {
            return Err(Error::StreamActive);
        }
        let image = downscale(image, self.settings.reference_max_width);
        let features = self.extractor.extract(&image);
        let (width, height) = image.dimensions();
        info!(
            "loaded {}x{} reference with {} features",
            width,
            height,
            features.len()
        );
        self.reference = Some(ReferenceObject {
            corners: corner_quad(width, height),
            features,
            image,
        });
        Ok(())
    }

    /// Attaches a frame source, entering Streaming.
    ///
    /// `open` runs only after the state checks pass, so a rejected start
    /// never touches the source. An open failure surfaces as
    /// [`Error::SourceUnavailable`] and the tracker stays Ready.
    pub fn start_stream<S, F>(&mut self, open: F) -> Result<(), Error>
    where
        S: FrameSource + 'static,
        F: FnOnce() -> Result<S, SourceError>,
    {
        if self.reference.is_none() {
            return Err(Error::NoReferenceLoaded);
        }
        if self.source.is_some() {
            return Err(Error::StreamActive);
        }
        let source = open()?;
        self.source = Some(Box::new(source));
        info!("stream started");
        Ok(())
    }

    /// Pulls and processes the next frame of the active stream.
    ///
    /// End of stream and read failures both release the source and yield
    /// [`StreamEvent::Ended`], returning the tracker to Ready. A read
    /// failure is logged rather than surfaced since it terminates only the
    /// stream, never the session.
    pub fn advance(&mut self) -> Result<StreamEvent, Error> {
        let source = self.source.as_mut().ok_or(Error::StreamInactive)?;
        match source.read_next() {
            Ok(Some(frame)) => Ok(StreamEvent::Tracked(self.process_frame(frame)?)),
            Ok(None) => {
                self.source = None;
                info!("stream ended");
                Ok(StreamEvent::Ended)
            }
            Err(error) => {
                self.source = None;
                warn!("stream ended by a read failure: {}", error);
                Ok(StreamEvent::Ended)
            }
        }
    }

    /// Drives the active stream to completion, handing each processed
    /// frame's result to `sink` in acquisition order.
    pub fn run_stream<F>(&mut self, mut sink: F) -> Result<(), Error>
    where
        F: FnMut(TrackingResult),
    {
        loop {
            match self.advance()? {
                StreamEvent::Tracked(result) => sink(result),
                StreamEvent::Ended => return Ok(()),
            }
        }
    }

    /// Detaches and releases the active frame source, returning to Ready.
    /// Calling with no active stream does nothing.
    pub fn stop(&mut self) {
        if self.source.take().is_some() {
            info!("stream stopped");
        }
    }

    /// Runs one full pass over a single frame.
    ///
    /// This is the stream-free entry point; it only needs a loaded
    /// reference. The frame is downscaled to the configured maximum width,
    /// features are extracted and matched against the reference, matches
    /// are filtered by the ratio test, and a homography is fit by
    /// consensus. Every per-frame "object not found" outcome yields a
    /// result with `detection: None` rather than an error.
    pub fn process_frame(&mut self, frame: DynamicImage) -> Result<TrackingResult, Error> {
        let reference = self.reference.as_ref().ok_or(Error::NoReferenceLoaded)?;
        let image = downscale(frame, self.settings.frame_max_width);
        let features = self.extractor.extract(&image);
        let candidates = self.matcher.matches(reference.features(), &features, 2);
        let correspondences = ratio_filter(&candidates, self.settings.lowes_ratio);
        let matches = correspondences
            .iter()
            .map(|correspondence| {
                PlanarMatch(
                    reference.features().point(correspondence.reference),
                    features.point(correspondence.query),
                )
            })
            .collect_vec();
        let detection = self
            .fit
            .estimate(&mut self.consensus, &matches)
            .and_then(|fit| {
                let corners = project_quad(&fit.homography, reference.corners())?;
                Some(Detection {
                    homography: fit.homography,
                    corners,
                    inliers: fit.inliers,
                    inlier_count: fit.inlier_count,
                })
            });
        let frame = self.frames_processed;
        self.frames_processed += 1;
        debug!(
            "frame {} had {} features and {} filtered matches and detection {}",
            frame,
            features.len(),
            correspondences.len(),
            detection.is_some(),
        );
        Ok(TrackingResult {
            frame,
            image,
            features,
            correspondences,
            detection,
        })
    }
}

/// The corner quad of a `width` by `height` image in top-left, bottom-left,
/// bottom-right, top-right order.
pub fn corner_quad(width: u32, height: u32) -> [Point2<f64>; 4] {
    let right = width.saturating_sub(1) as f64;
    let bottom = height.saturating_sub(1) as f64;
    [
        Point2::new(0.0, 0.0),
        Point2::new(0.0, bottom),
        Point2::new(right, bottom),
        Point2::new(right, 0.0),
    ]
}

/// Projects a reference corner quad into frame space, or `None` if any
/// corner is sent to infinity, which no credible fit does.
pub fn project_quad(
    homography: &Homography,
    corners: &[Point2<f64>; 4],
) -> Option<[Point2<f64>; 4]> {
    let mut projected = [Point2::origin(); 4];
    for (out, corner) in projected.iter_mut().zip(corners) {
        *out = homography.transform(*corner)?;
    }
    Some(projected)
}

/// Downscales to at most `max_width` wide, preserving aspect ratio. Images
/// already within the cap pass through unchanged.
pub fn downscale(image: DynamicImage, max_width: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width <= max_width {
        return image;
    }
    let scaled_height = ((height as f64 * max_width as f64 / width as f64).round() as u32).max(1);
    image.resize_exact(max_width, scaled_height, FilterType::Triangle)
}
