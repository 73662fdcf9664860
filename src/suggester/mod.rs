//! Replica placement suggester
//!
//! Given a table's shards, datacenter affinities and pins, plus what every
//! server is currently doing, decides which server is primary, secondary or
//! unused for each shard:
//! - Candidates are ranked by pins, then backfill cost and accumulated usage
//! - Concrete datacenter goals are filled before unconstrained ones
//! - A goal that cannot be met fails the whole table

pub mod blueprint;
pub mod cost;
pub mod priority;
pub mod shard;
pub mod table;
pub mod usage;

pub use blueprint::{Blueprint, Role, ShardPlacement};
pub use cost::{estimate_backfill_cost, server_backfill_cost, WORST_BACKFILL_COST};
pub use priority::{CandidateQueue, Priority, RankingContext};
pub use shard::{suggest_for_shard, PlacementInputs, ShardPins};
pub use table::{pins_for_shard, suggest_blueprint, suggest_blueprints, suggest_table_blueprint};
pub use usage::UsageTally;
