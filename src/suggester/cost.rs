//! Backfill cost estimation
//!
//! Estimates how much data a server must copy before it is up to date for a
//! shard, from the activities it publishes in its business card.

use crate::cluster::{BusinessCard, LivenessSnapshot};
use crate::common::ServerId;
use crate::region::{Region, RegionMap};

/// Cost of a server that does not hold the shard at all
pub const WORST_BACKFILL_COST: u32 = 3;

/// Average cost over the pieces of `shard` the card describes.
///
/// Pieces the card says nothing about cost [`WORST_BACKFILL_COST`]. Every
/// piece weighs the same regardless of how much of the keyspace it covers.
pub fn estimate_backfill_cost<R: Region>(card: &BusinessCard<R>, shard: &R) -> f64 {
    let mut costs = RegionMap::from_region(shard.clone(), WORST_BACKFILL_COST);
    for (region, activity) in card.activities.iter() {
        let overlap = region.intersection(shard);
        if !overlap.is_empty() {
            costs.set(overlap, activity.base_cost());
        }
    }

    let total: u32 = costs.values().sum();
    f64::from(total) / costs.len() as f64
}

/// Backfill cost for `server`, worst case if it is absent from the snapshot
pub fn server_backfill_cost<R: Region>(
    snapshot: &LivenessSnapshot<R>,
    server: &ServerId,
    shard: &R,
) -> f64 {
    match snapshot.get(server) {
        Some(card) => estimate_backfill_cost(card, shard),
        None => f64::from(WORST_BACKFILL_COST),
    }
}
