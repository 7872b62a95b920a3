use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::{drawing, pixelops};
use itertools::Itertools;
use palette::{FromColor, Hsv, RgbHue, Srgb};
use reftrack::{nalgebra::Point2, ReferenceObject, TrackingResult};

/// Renders the reference and a processed frame side by side.
///
/// Each surviving correspondence becomes a color rotated translucent line
/// from its reference keypoint to its frame keypoint; with `inliers_only`
/// the matches the fit rejected are skipped. When the frame carries a
/// detection, the projected reference outline is drawn on the frame side in
/// green.
pub fn render_result(
    reference: &ReferenceObject,
    result: &TrackingResult,
    inliers_only: bool,
) -> DynamicImage {
    let reference_image = reference.image().to_rgba8();
    let frame_image = result.image.to_rgba8();
    let offset = reference_image.dimensions().0;
    let canvas_width = offset + frame_image.dimensions().0;
    let canvas_height = std::cmp::max(reference_image.dimensions().1, frame_image.dimensions().1);
    let mut canvas = RgbaImage::from_pixel(canvas_width, canvas_height, Rgba([0, 0, 0, 255]));

    // Render an image at an x offset in the canvas.
    let mut blit = |image: &RgbaImage, x_offset: u32| {
        let (width, height) = image.dimensions();
        for (x, y) in (0..width).cartesian_product(0..height) {
            canvas.put_pixel(x + x_offset, y, *image.get_pixel(x, y));
        }
    };
    blit(&reference_image, 0);
    blit(&frame_image, offset);

    for (ix, correspondence) in result.correspondences.iter().enumerate() {
        if inliers_only {
            let inlier = result
                .detection
                .as_ref()
                .map_or(false, |detection| detection.inliers[ix]);
            if !inlier {
                continue;
            }
        }
        // Rotate through a color wheel on only the most saturated colors.
        let hsv = Hsv::new(RgbHue::from_radians(ix as f64 * 0.1), 1.0, 1.0);
        let rgb = Srgb::from_color(hsv);
        let color = Rgba([
            (rgb.red * 255.0) as u8,
            (rgb.green * 255.0) as u8,
            (rgb.blue * 255.0) as u8,
            128,
        ]);
        let from = reference.features().point(correspondence.reference);
        let to = result.features.point(correspondence.query);
        drawing::draw_antialiased_line_segment_mut(
            &mut canvas,
            (from.x as i32, from.y as i32),
            (to.x as i32 + offset as i32, to.y as i32),
            color,
            pixelops::interpolate,
        );
    }

    if let Some(detection) = &result.detection {
        draw_quad(&mut canvas, &detection.corners, offset);
    }

    DynamicImage::ImageRgba8(canvas)
}

fn draw_quad(canvas: &mut RgbaImage, corners: &[Point2<f64>; 4], x_offset: u32) {
    let green = Rgba([0, 255, 0, 255]);
    for ix in 0..4 {
        let from = corners[ix];
        let to = corners[(ix + 1) % 4];
        drawing::draw_antialiased_line_segment_mut(
            canvas,
            (from.x as i32 + x_offset as i32, from.y as i32),
            (to.x as i32 + x_offset as i32, to.y as i32),
            green,
            pixelops::interpolate,
        );
    }
}
