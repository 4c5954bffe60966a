use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;
use vspace_core::{ensure_positive, ErrorInfo, Point, VsError};
use vspace_geom::ConvexBody;
use vspace_round::{DirectionAlgorithm, RoundingAlgorithm};

use crate::cache::SamplingSession;
use crate::chain::HitAndRun;
use crate::config::SamplerConfig;
use crate::determinism::call_seed;
use crate::selector::SampleSelector;

/// Draws batches of (approximately) uniform samples from convex bodies.
pub struct HitAndRunSampler {
    selector: SampleSelector,
    direction: DirectionAlgorithm,
    master_seed: u64,
    pool: Option<ThreadPool>,
}

impl std::fmt::Debug for HitAndRunSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitAndRunSampler")
            .field("selector", &self.selector)
            .field("direction", &self.direction)
            .field("master_seed", &self.master_seed)
            .field("threads", &self.pool.as_ref().map(ThreadPool::current_num_threads))
            .finish()
    }
}

impl HitAndRunSampler {
    /// Starts a builder around `selector`.
    pub fn builder(selector: SampleSelector) -> HitAndRunSamplerBuilder {
        HitAndRunSamplerBuilder {
            selector,
            rounding: None,
            threads: 1,
            master_seed: crate::config::SeedPolicy::default().master_seed,
        }
    }

    /// Builds a sampler from a validated configuration.
    pub fn from_config(config: &SamplerConfig) -> Result<Self, VsError> {
        config.validate()?;
        let mut builder = Self::builder(config.selector)
            .with_threads(config.parallelism.threads)
            .with_seed(config.seed_policy.master_seed);
        if config.rounding.enabled {
            builder = builder.with_rounding(config.rounding.max_iterations);
        }
        builder.build()
    }

    /// Selector in use.
    pub fn selector(&self) -> SampleSelector {
        self.selector
    }

    /// Direction fitting algorithm in use.
    pub fn direction_algorithm(&self) -> DirectionAlgorithm {
        self.direction
    }

    /// Draws `num_samples` points from `body`.
    ///
    /// Reuses and then refreshes whatever caches `session` holds. Every
    /// returned point lies inside `body`.
    pub fn sample(
        &self,
        body: &dyn ConvexBody,
        num_samples: usize,
        session: &mut SamplingSession,
    ) -> Result<Vec<Point>, VsError> {
        ensure_positive("num_samples", num_samples)?;

        let mut prepared = session.prepare(body);
        let warm_start = session.warm_start(body.dim());
        let sampler = self.direction.fit(body, warm_start)?;

        if let Some(ellipsoid) = sampler.ellipsoid() {
            if body.is_inside(ellipsoid.center()) {
                session.offer_interior_point(&mut prepared, ellipsoid.center());
            }
        }

        let seed = call_seed(self.master_seed, session.calls());
        let chain = HitAndRun::from_prepared(&prepared, &sampler, seed)?;
        let samples = self.selector.select(chain, num_samples, self.pool.as_ref())?;

        session.record(&samples, sampler.ellipsoid());
        debug!(
            dim = body.dim(),
            num_samples,
            call = session.calls(),
            rounded = sampler.ellipsoid().is_some(),
            "sampled version space"
        );
        Ok(samples)
    }
}

/// Builder for [`HitAndRunSampler`].
#[derive(Debug, Clone)]
pub struct HitAndRunSamplerBuilder {
    selector: SampleSelector,
    rounding: Option<usize>,
    threads: usize,
    master_seed: u64,
}

impl HitAndRunSamplerBuilder {
    /// Fits a rounding ellipsoid with at most `max_iterations` cuts before
    /// every call.
    pub fn with_rounding(mut self, max_iterations: usize) -> Self {
        self.rounding = Some(max_iterations);
        self
    }

    /// Runs independent chains on `threads` workers.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Master seed.
    pub fn with_seed(mut self, master_seed: u64) -> Self {
        self.master_seed = master_seed;
        self
    }

    /// Validates the settings and builds the sampler.
    pub fn build(self) -> Result<HitAndRunSampler, VsError> {
        self.selector.validate()?;
        ensure_positive("threads", self.threads)?;

        let direction = match self.rounding {
            Some(max_iterations) => DirectionAlgorithm::Rounding(RoundingAlgorithm::new(max_iterations)?),
            None => DirectionAlgorithm::Random,
        };

        let pool = if self.threads > 1 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(self.threads)
                .build()
                .map_err(|err| {
                    VsError::Configuration(
                        ErrorInfo::new("thread-pool", err.to_string())
                            .with_context("threads", self.threads),
                    )
                })?;
            Some(pool)
        } else {
            None
        };

        Ok(HitAndRunSampler {
            selector: self.selector,
            direction,
            master_seed: self.master_seed,
            pool,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_bad_settings() {
        let selector = SampleSelector::IndependentChains { chain_length: 5 };
        assert!(HitAndRunSampler::builder(selector).with_threads(0).build().is_err());
        assert!(HitAndRunSampler::builder(selector).with_rounding(0).build().is_err());
        let bad = SampleSelector::WarmUpAndThin { warmup: 0, thin: 1 };
        assert!(HitAndRunSampler::builder(bad).build().is_err());
    }

    #[test]
    fn config_enables_rounding() {
        let mut config = SamplerConfig::default();
        config.rounding.enabled = true;
        config.rounding.max_iterations = 50;
        let sampler = HitAndRunSampler::from_config(&config).unwrap();
        assert_eq!(
            sampler.direction_algorithm(),
            DirectionAlgorithm::Rounding(RoundingAlgorithm::new(50).unwrap())
        );
    }
}
