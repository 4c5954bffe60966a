use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use vspace_core::{ErrorInfo, Point, RngHandle, VsError};
use vspace_geom::{ConvexBody, Manifold};

use crate::ellipsoid::Ellipsoid;
use crate::rounding::RoundingAlgorithm;

/// Draws Hit-and-Run directions at a point.
#[derive(Debug, Clone)]
pub enum DirectionSampler {
    /// Isotropic Gaussian direction, projected onto the tangent space.
    Random {
        /// Manifold the directions live on.
        manifold: Manifold,
    },
    /// Gaussian direction shaped by a rounding ellipsoid.
    Ellipsoid {
        /// Manifold the directions live on.
        manifold: Manifold,
        /// Ellipsoid the directions are shaped by.
        ellipsoid: Ellipsoid,
        /// `L diag(sqrt(D))` of `ellipsoid`.
        factor: DMatrix<f64>,
    },
}

impl DirectionSampler {
    /// Wraps a fitted ellipsoid.
    pub fn from_ellipsoid(manifold: Manifold, ellipsoid: Ellipsoid) -> Self {
        let factor = ellipsoid.cholesky_factor();
        Self::Ellipsoid {
            manifold,
            ellipsoid,
            factor,
        }
    }

    /// Samples a direction at `point`.
    pub fn sample_direction(&self, point: &Point, rng: &mut RngHandle) -> Point {
        match self {
            Self::Random { manifold } => manifold.sample_velocity(point, rng),
            Self::Ellipsoid {
                manifold, factor, ..
            } => {
                let z = Point::from_fn(factor.ncols(), |_, _| rng.gaussian());
                manifold.project_to_tangent(point, factor * z)
            }
        }
    }

    /// Fitted ellipsoid, when rounding was used.
    pub fn ellipsoid(&self) -> Option<&Ellipsoid> {
        match self {
            Self::Random { .. } => None,
            Self::Ellipsoid { ellipsoid, .. } => Some(ellipsoid),
        }
    }
}

/// How direction samplers are fit to a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DirectionAlgorithm {
    /// No fitting; isotropic directions.
    #[default]
    Random,
    /// Weak Löwner-John rounding; Euclidean bodies only.
    Rounding(RoundingAlgorithm),
}

impl DirectionAlgorithm {
    /// Fits a sampler for `body`, optionally warm-started from a previous
    /// ellipsoid.
    ///
    /// A warm start that turns out not to contain the body is discarded in
    /// favour of a cold fit.
    pub fn fit(
        &self,
        body: &dyn ConvexBody,
        warm_start: Option<Ellipsoid>,
    ) -> Result<DirectionSampler, VsError> {
        let algorithm = match self {
            Self::Random => {
                return Ok(DirectionSampler::Random {
                    manifold: body.manifold(),
                })
            }
            Self::Rounding(algorithm) => algorithm,
        };

        let Some(euclidean) = body.as_euclidean() else {
            return Err(VsError::Configuration(
                ErrorInfo::new("rounding-unsupported", "rounding requires a Euclidean body")
                    .with_context("manifold", format!("{:?}", body.manifold())),
            ));
        };

        let outcome = match warm_start {
            Some(start) => match algorithm.fit_weak_lowner_john_ellipsoid(euclidean, Some(start)) {
                Err(VsError::InvalidCut(info)) => {
                    warn!(code = %info.code, "warm-start ellipsoid rejected, refitting from ball");
                    algorithm.fit(euclidean)?
                }
                other => other?,
            },
            None => algorithm.fit(euclidean)?,
        };
        debug!(
            iterations = outcome.iterations,
            converged = outcome.converged,
            "direction sampler fitted"
        );
        Ok(DirectionSampler::from_ellipsoid(
            euclidean.manifold(),
            outcome.ellipsoid,
        ))
    }
}
