use log::info;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use reftrack::{
    AkazeExtractor, DescriptorMatcher, HggMatcher, ImageSequenceSource, LinearMatcher, Ransac,
    StreamEvent, Tracker, TrackerSettings,
};
use reftrack_sandbox::render_result;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "reftrack-sandbox",
    about = "A tool for tracking a planar reference object through image sequences"
)]
struct Opt {
    /// The file where settings are specified.
    ///
    /// This is in the format of `reftrack::TrackerSettings`.
    #[structopt(short, long, default_value = "reftrack-settings.json")]
    settings: PathBuf,
    /// The reference image of the object to track.
    #[structopt(short, long, parse(from_os_str))]
    reference: PathBuf,
    /// The directory annotated frames are written to as PNG files.
    #[structopt(short, long, default_value = "track-output")]
    output: PathBuf,
    /// Match exhaustively instead of through the approximate hgg index.
    #[structopt(long)]
    exhaustive: bool,
    /// Only draw match lines the fit accepted as inliers.
    #[structopt(long)]
    inliers_only: bool,
    /// The frame image files, in playback order.
    #[structopt(parse(from_os_str))]
    frames: Vec<PathBuf>,
}

fn main() {
    pretty_env_logger::init_timed();
    let opt = Opt::from_args();

    let settings = std::fs::File::open(&opt.settings)
        .ok()
        .and_then(|file| serde_json::from_reader(file).ok());
    if settings.is_some() {
        info!("loaded existing settings");
    } else {
        info!("used default settings");
    }
    let settings: TrackerSettings = settings.unwrap_or_default();

    if opt.exhaustive {
        run(opt, settings, LinearMatcher);
    } else {
        run(opt, settings, HggMatcher::default());
    }
}

fn run<M: DescriptorMatcher>(opt: Opt, settings: TrackerSettings, matcher: M) {
    let reference = image::open(&opt.reference).expect("failed to open the reference image");
    let consensus = Ransac::new(
        settings.inlier_threshold,
        Xoshiro256PlusPlus::seed_from_u64(0),
    )
    .max_iterations(settings.ransac_iterations)
    .confidence(settings.ransac_confidence);
    let mut tracker = Tracker::new(
        AkazeExtractor::new(settings.akaze_threshold),
        matcher,
        consensus,
        settings,
    );
    tracker
        .load_reference(reference)
        .expect("failed to load the reference");

    std::fs::create_dir_all(&opt.output).expect("failed to create the output directory");
    let frames = opt.frames;
    tracker
        .start_stream(move || ImageSequenceSource::open(frames))
        .expect("failed to open the frame sequence");

    loop {
        match tracker.advance().expect("the stream failed to advance") {
            StreamEvent::Tracked(result) => {
                if let Some(detection) = &result.detection {
                    info!(
                        "frame {} found the object with {} of {} matches as inliers",
                        result.frame,
                        detection.inlier_count,
                        result.correspondences.len()
                    );
                } else {
                    info!("frame {} did not find the object", result.frame);
                }
                let reference = tracker.reference().expect("a reference is loaded");
                let rendered = render_result(reference, &result, opt.inliers_only);
                let path = opt.output.join(format!("{:06}.png", result.frame));
                rendered.save(path).expect("failed to write annotated frame");
            }
            StreamEvent::Ended => break,
        }
    }
}
