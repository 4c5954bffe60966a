use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use vspace_core::{ensure_positive, Point, VsError};

use crate::chain::Chain;

/// Strategy turning one chain into a batch of samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SampleSelector {
    /// One chain: burn in for `warmup` steps, then keep every `thin`-th state.
    WarmUpAndThin {
        /// Burn-in steps before the first sample.
        warmup: usize,
        /// Steps between consecutive samples.
        thin: usize,
    },
    /// One fresh chain per sample, each run for `chain_length` steps from the
    /// shared starting point.
    IndependentChains {
        /// Steps per chain.
        chain_length: usize,
    },
}

impl Default for SampleSelector {
    fn default() -> Self {
        SampleSelector::WarmUpAndThin {
            warmup: 100,
            thin: 10,
        }
    }
}

impl SampleSelector {
    /// Validated [`SampleSelector::WarmUpAndThin`].
    pub fn warm_up_and_thin(warmup: usize, thin: usize) -> Result<Self, VsError> {
        let selector = SampleSelector::WarmUpAndThin { warmup, thin };
        selector.validate()?;
        Ok(selector)
    }

    /// Validated [`SampleSelector::IndependentChains`].
    pub fn independent_chains(chain_length: usize) -> Result<Self, VsError> {
        let selector = SampleSelector::IndependentChains { chain_length };
        selector.validate()?;
        Ok(selector)
    }

    /// Rejects zero step counts.
    pub fn validate(&self) -> Result<(), VsError> {
        match *self {
            SampleSelector::WarmUpAndThin { warmup, thin } => {
                ensure_positive("warmup", warmup)?;
                ensure_positive("thin", thin)
            }
            SampleSelector::IndependentChains { chain_length } => {
                ensure_positive("chain_length", chain_length)
            }
        }
    }

    /// Draws `num_samples` points from `chain`.
    ///
    /// Independent chains run on `pool` when one is given; results keep chain
    /// order either way.
    pub fn select<C>(
        &self,
        mut chain: C,
        num_samples: usize,
        pool: Option<&ThreadPool>,
    ) -> Result<Vec<Point>, VsError>
    where
        C: Chain + Sync,
    {
        self.validate()?;
        ensure_positive("num_samples", num_samples)?;

        match *self {
            SampleSelector::WarmUpAndThin { warmup, thin } => {
                let mut samples = Vec::with_capacity(num_samples);
                chain.advance_by(warmup)?;
                samples.push(chain.current().clone());
                for _ in 1..num_samples {
                    chain.advance_by(thin)?;
                    samples.push(chain.current().clone());
                }
                Ok(samples)
            }
            SampleSelector::IndependentChains { chain_length } => {
                let run = |index: usize| -> Result<Point, VsError> {
                    let mut fork = chain.fork(index);
                    fork.advance_by(chain_length)?;
                    Ok(fork.current().clone())
                };
                match pool {
                    Some(pool) => pool.install(|| (0..num_samples).into_par_iter().map(run).collect()),
                    None => (0..num_samples).map(run).collect(),
                }
            }
        }
    }
}
