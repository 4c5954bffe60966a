use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use vspace_core::{ensure_positive, ErrorInfo, VsError};
use vspace_round::DEFAULT_MAX_ITERATIONS;

use crate::selector::SampleSelector;

fn config_error(code: &str, err: impl ToString) -> VsError {
    VsError::Configuration(ErrorInfo::new(code, err.to_string()))
}

/// YAML-configurable parameters of a [`crate::HitAndRunSampler`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// How samples are drawn from the chain.
    #[serde(default)]
    pub selector: SampleSelector,
    /// Ellipsoid rounding of the direction sampler.
    #[serde(default)]
    pub rounding: RoundingConfig,
    /// Cross-call caching behaviour.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Worker pool used by independent chains.
    #[serde(default)]
    pub parallelism: ParallelismConfig,
    /// Master seed.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            selector: SampleSelector::default(),
            rounding: RoundingConfig::default(),
            cache: CacheConfig::default(),
            parallelism: ParallelismConfig::default(),
            seed_policy: SeedPolicy::default(),
        }
    }
}

impl SamplerConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, VsError> {
        let config: SamplerConfig =
            serde_yaml::from_str(yaml).map_err(|err| config_error("config-parse", err))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a YAML file.
    pub fn load(path: &Path) -> Result<Self, VsError> {
        let text = fs::read_to_string(path).map_err(|err| {
            VsError::Configuration(
                ErrorInfo::new("config-io", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        Self::from_yaml_str(&text)
    }

    /// Serializes the configuration back to YAML.
    pub fn to_yaml_string(&self) -> Result<String, VsError> {
        serde_yaml::to_string(self).map_err(|err| config_error("config-serialize", err))
    }

    /// Rejects zero-valued counts.
    pub fn validate(&self) -> Result<(), VsError> {
        self.selector.validate()?;
        ensure_positive("rounding.max_iterations", self.rounding.max_iterations)?;
        ensure_positive("parallelism.threads", self.parallelism.threads)?;
        Ok(())
    }
}

/// Rounding settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundingConfig {
    /// Fit a Löwner-John ellipsoid before sampling.
    #[serde(default)]
    pub enabled: bool,
    /// Cut budget per fit.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

impl Default for RoundingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_iterations: default_max_iterations(),
        }
    }
}

/// Which caches a session keeps between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Reuse previous samples as the starting interior point.
    #[serde(default = "default_true")]
    pub sample_cache: bool,
    /// Reuse the previous rounding ellipsoid as a warm start.
    #[serde(default)]
    pub ellipsoid_cache: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sample_cache: true,
            ellipsoid_cache: false,
        }
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelismConfig {
    /// Threads used by independent chains; 1 runs sequentially.
    #[serde(default = "default_threads")]
    pub threads: usize,
}

fn default_threads() -> usize {
    1
}

impl Default for ParallelismConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
        }
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed every chain seed is derived from.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
}

fn default_master_seed() -> u64 {
    0x5EED_5A4B_1E00_0001_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
        }
    }
}
