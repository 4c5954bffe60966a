#![deny(missing_docs)]

//! Hit-and-Run sampling of version spaces.
//!
//! A [`HitAndRunSampler`] turns a convex body into a batch of approximately
//! uniform samples: it looks up a starting point in the caller's
//! [`SamplingSession`], optionally rounds the body with a Löwner-John
//! ellipsoid, runs one or more chains and hands the batch back to the session
//! for the next call.

/// Cross-call caches and the prepared-body wrapper.
pub mod cache;
/// Chain trait and the Hit-and-Run walk.
pub mod chain;
/// YAML configuration schema and defaults.
pub mod config;
/// Deterministic seed derivation helpers.
pub mod determinism;
/// Sampler orchestrator and builder.
pub mod sampler;
/// Sample selection strategies.
pub mod selector;

pub use cache::{EllipsoidCache, PreparedBody, SampleCache, SamplingSession};
pub use chain::{Chain, HitAndRun};
pub use config::{CacheConfig, ParallelismConfig, RoundingConfig, SamplerConfig, SeedPolicy};
pub use sampler::{HitAndRunSampler, HitAndRunSamplerBuilder};
pub use selector::SampleSelector;
