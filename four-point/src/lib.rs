#![no_std]

use float_ord::FloatOrd;
use num_traits::Float;
use reftrack_core::{
    nalgebra::{self, Matrix3, OMatrix, OVector, Point2, Vector2, U9},
    sample_consensus::Estimator,
    Homography, PlanarMatch,
};

type Matrix9 = OMatrix<f64, U9, U9>;
type Vector9 = OVector<f64, U9>;

/// Hartley conditioning of a point set: the centroid is translated to the
/// origin and the points are scaled so their mean distance from it is √2.
/// Without this the direct linear system mixes constraint magnitudes of
/// wildly different scales and the eigen solve becomes unreliable.
#[derive(Copy, Clone, Debug)]
struct Normalization {
    centroid: Vector2<f64>,
    scale: f64,
}

impl Normalization {
    /// Computes the conditioning for a point set.
    ///
    /// Returns `None` for an empty set or one whose points all coincide,
    /// since no homography is determined by such a sample.
    fn from_points<I>(points: I, epsilon: f64) -> Option<Self>
    where
        I: Iterator<Item = Point2<f64>> + Clone,
    {
        let mut count = 0usize;
        let mut sum = Vector2::zeros();
        for point in points.clone() {
            sum += point.coords;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let centroid = sum / count as f64;
        let mean_distance =
            points.map(|point| (point.coords - centroid).norm()).sum::<f64>() / count as f64;
        if mean_distance < epsilon {
            return None;
        }
        Some(Self {
            centroid,
            scale: core::f64::consts::SQRT_2 / mean_distance,
        })
    }

    fn transform(&self, point: Point2<f64>) -> Point2<f64> {
        Point2::from((point.coords - self.centroid) * self.scale)
    }

    /// The matrix `T` such that `T * [x, y, 1]` conditions the point.
    fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.scale,
            0.0,
            -self.scale * self.centroid.x,
            0.0,
            self.scale,
            -self.scale * self.centroid.y,
            0.0,
            0.0,
            1.0,
        )
    }

    /// The inverse of [`Normalization::matrix`], used to undo the
    /// conditioning on the solved homography.
    fn inverse_matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            1.0 / self.scale,
            0.0,
            self.centroid.x,
            0.0,
            1.0 / self.scale,
            self.centroid.y,
            0.0,
            0.0,
            1.0,
        )
    }
}

/// Each match contributes two linear constraints on the row-major
/// homography vector `h`:
///
/// ```text
/// [-x, -y, -1,  0,  0,  0, x·x', y·x', x'] · h = 0
/// [ 0,  0,  0, -x, -y, -1, x·y', y·y', y'] · h = 0
/// ```
///
/// The rows are accumulated directly into `AᵀA` so that any number of
/// matches fits in a fixed 9×9 matrix, which keeps the crate free of
/// allocation and lets a consensus refit on an arbitrarily large inlier set.
fn accumulate_constraints(matches: impl Iterator<Item = PlanarMatch>) -> (Matrix9, usize) {
    let mut ata: Matrix9 = nalgebra::zero();
    let mut count = 0;
    for PlanarMatch(a, b) in matches {
        let (x, y) = (a.x, a.y);
        let (xp, yp) = (b.x, b.y);
        let rows = [
            Vector9::from_column_slice(&[-x, -y, -1.0, 0.0, 0.0, 0.0, x * xp, y * xp, xp]),
            Vector9::from_column_slice(&[0.0, 0.0, 0.0, -x, -y, -1.0, x * yp, y * yp, yp]),
        ];
        for row in &rows {
            ata += row * row.transpose();
        }
        count += 1;
    }
    (ata, count)
}

/// Performs the four-point
/// [direct linear transformation](https://en.wikipedia.org/wiki/Direct_linear_transformation)
/// to estimate the planar homography relating two pixel-space point sets.
///
/// Both point sets are Hartley-normalized before solving and the result is
/// rescaled so the bottom-right entry is `1` whenever that entry is
/// well-conditioned. Four matches determine the homography exactly; more
/// than four produce the least-squares solution, which is what a consensus
/// process uses to refit on its inlier set.
#[derive(Copy, Clone, Debug)]
pub struct FourPoint {
    pub epsilon: f64,
    pub iterations: usize,
}

impl FourPoint {
    pub fn new() -> Self {
        Default::default()
    }

    /// Estimates the homography mapping the first point of each match onto
    /// the second.
    ///
    /// Returns `None` when fewer than four matches are provided, when either
    /// point set is degenerate (coincident points), when the eigen solver
    /// fails to converge, or when the solution is singular.
    pub fn from_matches<I>(&self, data: I) -> Option<Homography>
    where
        I: Iterator<Item = PlanarMatch> + Clone,
    {
        let norm_a = Normalization::from_points(data.clone().map(|PlanarMatch(a, _)| a), self.epsilon)?;
        let norm_b = Normalization::from_points(data.clone().map(|PlanarMatch(_, b)| b), self.epsilon)?;
        let conditioned = data.map(|PlanarMatch(a, b)| {
            PlanarMatch(norm_a.transform(a), norm_b.transform(b))
        });
        let (ata, count) = accumulate_constraints(conditioned);
        if count < Self::MIN_SAMPLES {
            return None;
        }
        let eigens = ata.try_symmetric_eigen(self.epsilon, self.iterations)?;
        let h = eigens
            .eigenvalues
            .iter()
            .enumerate()
            .min_by_key(|&(_, &eigenvalue)| FloatOrd(eigenvalue))
            .map(|(ix, _)| eigens.eigenvectors.column(ix).into_owned())?;
        let conditioned_homography = Matrix3::new(
            h[0], h[1], h[2], //
            h[3], h[4], h[5], //
            h[6], h[7], h[8],
        );
        let mut mat = norm_b.inverse_matrix() * conditioned_homography * norm_a.matrix();
        let corner = mat[(2, 2)];
        if Float::abs(corner) > self.epsilon {
            mat /= corner;
        }
        if Float::abs(mat.determinant()) < self.epsilon {
            return None;
        }
        Some(Homography(mat))
    }
}

impl Default for FourPoint {
    fn default() -> Self {
        Self {
            epsilon: 1e-12,
            iterations: 1000,
        }
    }
}

impl Estimator<PlanarMatch> for FourPoint {
    type Model = Homography;
    type ModelIter = Option<Homography>;
    const MIN_SAMPLES: usize = 4;

    fn estimate<I>(&self, data: I) -> Self::ModelIter
    where
        I: Iterator<Item = PlanarMatch> + Clone,
    {
        self.from_matches(data)
    }
}
