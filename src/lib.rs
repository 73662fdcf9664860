//! # miniplan
//!
//! Replica placement for sharded tables. Given:
//! - the shard boundaries of a table (non-overlapping regions covering the keyspace)
//! - how many replicas each datacenter should hold, and where the primary lives
//! - operator pins for primaries and secondaries
//! - what every server is currently doing for the table
//!
//! it suggests a blueprint: for every shard, one primary, the requested
//! secondaries, and `nothing` for every other server.
//!
//! ## Architecture

#![allow(clippy::result_large_err)]
//!
//! ```text
//! table suggester ──► shard suggester (per shard) ──► priority ranking
//!        │                     │                          │
//!        │                     └─ usage tally ◄───────────┤
//!        ▼                                                ▼
//!    blueprint                                   backfill cost estimator
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Suggest blueprints for every table in a cluster-state document
//! miniplan suggest --input ./cluster.json --pretty
//!
//! # One table, balancing load before minimizing data movement
//! miniplan suggest --input ./cluster.json --table <uuid> --prioritize-distribution
//!
//! # Validate shard boundaries and pins
//! miniplan check --input ./cluster.json
//! ```

pub mod cluster;
pub mod common;
pub mod region;
pub mod suggester;

// Re-export commonly used types
pub use cluster::{Activity, BusinessCard, ClusterState, TableConfig};
pub use common::{Config, Error, Result};
pub use region::{KeyRange, NonoverlappingRegions, Region, RegionMap};
pub use suggester::{suggest_blueprint, suggest_blueprints, Blueprint, Role, UsageTally};

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build info
pub const BUILD_INFO: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CARGO_PKG_NAME"), ")");
