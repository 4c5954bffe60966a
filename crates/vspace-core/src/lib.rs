#![deny(missing_docs)]
#![doc = "Core error taxonomy, RNG handle and vector helpers shared by the version-space sampling crates."]

use nalgebra::DVector;

pub mod errors;
pub mod rng;

pub use errors::{ensure_dim, ensure_positive, ErrorInfo, VsError};
pub use rng::{derive_substream_seed, RngHandle};

/// A point (or direction) in parameter space.
pub type Point = DVector<f64>;

/// Returns a copy of `point` zero-padded or truncated to `dim` coordinates.
pub fn resize(point: &Point, dim: usize) -> Point {
    Point::from_fn(dim, |i, _| if i < point.len() { point[i] } else { 0.0 })
}

/// Returns `point` rescaled to the requested Euclidean norm.
pub fn with_norm(point: &Point, norm: f64) -> Result<Point, VsError> {
    let current = point.norm();
    if current == 0.0 || !current.is_finite() {
        return Err(VsError::DegenerateGeometry(
            ErrorInfo::new("zero-norm", "cannot rescale a zero or non-finite vector")
                .with_context("norm", current),
        ));
    }
    Ok(point * (norm / current))
}
