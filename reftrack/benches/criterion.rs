use criterion::{criterion_group, criterion_main, Criterion};
use image::{DynamicImage, GrayImage, Luma};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use reftrack::{
    nalgebra::{Matrix3, Point2},
    AkazeExtractor, DescriptorMatcher, FeatureExtractor, HggMatcher, Homography, LinearMatcher,
    Ransac, Tracker, TrackerSettings,
};

fn board() -> DynamicImage {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
    let mut cells = [[0u8; 8]; 8];
    for (cy, row) in cells.iter_mut().enumerate() {
        for (cx, cell) in row.iter_mut().enumerate() {
            *cell = if (cx + cy) % 2 == 0 {
                rng.gen_range(160..=255)
            } else {
                rng.gen_range(0..=95)
            };
        }
    }
    DynamicImage::ImageLuma8(GrayImage::from_fn(200, 200, |x, y| {
        Luma([cells[(y / 25) as usize][(x / 25) as usize]])
    }))
}

fn warped(reference: &DynamicImage) -> DynamicImage {
    let truth = Homography(Matrix3::new(
        1.449, -0.388, 100.0, 0.388, 1.449, 50.0, 0.0, 0.0, 1.0,
    ));
    let reference = reference.to_luma8();
    let inverse = Homography(truth.0.try_inverse().unwrap());
    let mut canvas = GrayImage::from_pixel(512, 512, Luma([255u8]));
    for y in 0..512 {
        for x in 0..512 {
            let back = match inverse.transform(Point2::new(x as f64, y as f64)) {
                Some(point) => point,
                None => continue,
            };
            let rx = back.x.round();
            let ry = back.y.round();
            if rx >= 0.0
                && ry >= 0.0
                && (rx as u32) < reference.width()
                && (ry as u32) < reference.height()
            {
                canvas.put_pixel(x, y, *reference.get_pixel(rx as u32, ry as u32));
            }
        }
    }
    DynamicImage::ImageLuma8(canvas)
}

fn extract(c: &mut Criterion) {
    let frame = warped(&board());
    let extractor = AkazeExtractor::default();
    c.bench_function("extract", |b| b.iter(|| extractor.extract(&frame)));
}

fn matching(c: &mut Criterion) {
    let reference = board();
    let frame = warped(&reference);
    let extractor = AkazeExtractor::default();
    let reference = extractor.extract(&reference);
    let query = extractor.extract(&frame);
    c.bench_function("match_linear", |b| {
        b.iter(|| LinearMatcher.matches(&reference, &query, 2))
    });
    c.bench_function("match_hgg", |b| {
        b.iter(|| HggMatcher::default().matches(&reference, &query, 2))
    });
}

fn process_frame(c: &mut Criterion) {
    let reference = board();
    let frame = warped(&reference);
    let settings = TrackerSettings::default();
    let mut tracker = Tracker::new(
        AkazeExtractor::new(settings.akaze_threshold),
        LinearMatcher,
        Ransac::new(
            settings.inlier_threshold,
            Xoshiro256PlusPlus::seed_from_u64(0),
        ),
        settings,
    );
    tracker.load_reference(reference).unwrap();
    c.bench_function("process_frame", |b| {
        b.iter(|| tracker.process_frame(frame.clone()).unwrap())
    });
}

criterion_group!(
    name = tracking;
    config = Criterion::default().sample_size(10);
    targets = extract, matching, process_frame
);
criterion_main!(tracking);
