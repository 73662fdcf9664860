//! Configuration for miniplan
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `MINIPLAN_*` environment variables (`__` separates nested keys, e.g.
//! `MINIPLAN_SUGGESTER__PRIMARY_USAGE_COST=12`).

use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const ENV_PREFIX: &str = "MINIPLAN";

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging level (overridden by RUST_LOG)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Suggester tuning
    #[serde(default)]
    pub suggester: SuggesterConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Suggester configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggesterConfig {
    /// Usage charged to a server each time it is made primary for a shard
    #[serde(default = "default_primary_usage_cost")]
    pub primary_usage_cost: u64,

    /// Usage charged to a server each time it is made secondary for a shard
    #[serde(default = "default_secondary_usage_cost")]
    pub secondary_usage_cost: u64,

    /// Rank candidates by accumulated usage before backfill cost
    #[serde(default)]
    pub prioritize_distribution: bool,
}

fn default_primary_usage_cost() -> u64 {
    10
}
fn default_secondary_usage_cost() -> u64 {
    8
}

impl Default for SuggesterConfig {
    fn default() -> Self {
        Self {
            primary_usage_cost: default_primary_usage_cost(),
            secondary_usage_cost: default_secondary_usage_cost(),
            prioritize_distribution: false,
        }
    }
}

impl SuggesterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.primary_usage_cost <= self.secondary_usage_cost {
            return Err(Error::InvalidConfig(format!(
                "primary_usage_cost ({}) must be greater than secondary_usage_cost ({})",
                self.primary_usage_cost, self.secondary_usage_cost
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            suggester: SuggesterConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.suggester.validate()
    }
}
