use tracing::trace;
use vspace_core::{ensure_positive, ErrorInfo, Point, RngHandle, VsError};
use vspace_geom::ConvexBody;
use vspace_round::DirectionSampler;

use crate::cache::PreparedBody;
use crate::determinism::chain_seed;

/// A Markov chain over the points of a body.
///
/// Selectors only talk to chains through this trait, which keeps them
/// testable against scripted chains.
pub trait Chain: Send {
    /// Current state.
    fn current(&self) -> &Point;

    /// Performs one transition.
    fn advance(&mut self) -> Result<(), VsError>;

    /// Performs `steps >= 1` transitions in sequence.
    fn advance_by(&mut self, steps: usize) -> Result<(), VsError> {
        ensure_positive("steps", steps)?;
        for _ in 0..steps {
            self.advance()?;
        }
        Ok(())
    }

    /// Fresh chain starting from the current state with its own random
    /// stream, identified by `index`.
    fn fork(&self, index: usize) -> Self
    where
        Self: Sized;
}

/// Hit-and-Run walk: each step moves to a uniform point of the chord through
/// the current point along a random geodesic.
#[derive(Clone)]
pub struct HitAndRun<'a> {
    body: &'a dyn ConvexBody,
    sampler: &'a DirectionSampler,
    current: Point,
    seed: u64,
    rng: RngHandle,
}

impl<'a> HitAndRun<'a> {
    /// Starts a chain at `start`, which must lie inside `body`.
    pub fn new(
        body: &'a dyn ConvexBody,
        sampler: &'a DirectionSampler,
        start: Point,
        seed: u64,
    ) -> Result<Self, VsError> {
        if !body.is_inside(&start) {
            return Err(VsError::Configuration(
                ErrorInfo::new("exterior-start", "chain must start inside the body")
                    .with_context("dim", body.dim())
                    .with_context("start_dim", start.len()),
            ));
        }
        Ok(Self {
            body,
            sampler,
            current: start,
            seed,
            rng: RngHandle::from_seed(seed),
        })
    }

    /// Starts a chain at the interior point of a prepared body, computing one
    /// when no cached point is attached.
    pub fn from_prepared(
        prepared: &PreparedBody<'a>,
        sampler: &'a DirectionSampler,
        seed: u64,
    ) -> Result<Self, VsError> {
        let start = prepared.interior_point()?;
        Self::new(prepared.body(), sampler, start, seed)
    }

    /// Body being walked.
    pub fn body(&self) -> &dyn ConvexBody {
        self.body
    }
}

impl Chain for HitAndRun<'_> {
    fn current(&self) -> &Point {
        &self.current
    }

    fn advance(&mut self) -> Result<(), VsError> {
        let direction = self.sampler.sample_direction(&self.current, &mut self.rng);
        let geodesic = self.body.manifold().geodesic(self.current.clone(), direction)?;
        let segment = self.body.compute_intersection(&geodesic)?;
        self.current = segment.point(self.rng.uniform())?;
        Ok(())
    }

    fn advance_by(&mut self, steps: usize) -> Result<(), VsError> {
        ensure_positive("steps", steps)?;
        for _ in 0..steps {
            self.advance()?;
        }
        trace!(steps, "chain advanced");
        Ok(())
    }

    fn fork(&self, index: usize) -> Self {
        let seed = chain_seed(self.seed, index);
        Self {
            body: self.body,
            sampler: self.sampler,
            current: self.current.clone(),
            seed,
            rng: RngHandle::from_seed(seed),
        }
    }
}
