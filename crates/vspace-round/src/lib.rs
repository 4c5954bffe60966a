#![deny(missing_docs)]
#![doc = "Löwner-John ellipsoid rounding and the direction samplers it feeds into Hit-and-Run."]

/// Direction samplers and the algorithms that fit them.
pub mod direction;
/// Ellipsoids in `LDL^T` form and their cut update.
pub mod ellipsoid;
/// Weak Löwner-John rounding.
pub mod rounding;

pub use direction::{DirectionAlgorithm, DirectionSampler};
pub use ellipsoid::Ellipsoid;
pub use rounding::{
    attempt_to_reduce, containing_ellipsoid, probe_points, RoundingAlgorithm, RoundingOutcome,
    DEFAULT_MAX_ITERATIONS,
};
