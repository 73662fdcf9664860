//! Blueprint suggestion for whole tables

use crate::cluster::ClusterState;
use crate::common::{Result, ServerId, SuggesterConfig, TableId};
use crate::region::{NonoverlappingRegions, Region, RegionMap};
use crate::suggester::blueprint::Blueprint;
use crate::suggester::shard::{suggest_for_shard, PlacementInputs, ShardPins};
use crate::suggester::usage::UsageTally;
use std::collections::{BTreeMap, BTreeSet};

/// Pins that apply anywhere inside `shard`.
///
/// A pin map may split a shard between several pinned servers; all of them
/// count as pinned for the whole shard.
pub fn pins_for_shard<R: Region>(
    primary_pinnings: &RegionMap<R, ServerId>,
    secondary_pinnings: &RegionMap<R, BTreeSet<ServerId>>,
    shard: &R,
) -> ShardPins {
    ShardPins {
        primary: primary_pinnings
            .mask(shard)
            .values()
            .copied()
            .filter(|server| !server.is_nil())
            .collect(),
        secondary: secondary_pinnings
            .mask(shard)
            .values()
            .flatten()
            .copied()
            .collect(),
    }
}

/// Suggest a blueprint covering every shard of a table.
///
/// `usage` is charged for every role handed out and carries over to later
/// calls. Any shard that cannot be placed fails the whole table.
pub fn suggest_blueprint<R: Region>(
    inputs: &PlacementInputs<'_, R>,
    shards: &NonoverlappingRegions<R>,
    primary_pinnings: &RegionMap<R, ServerId>,
    secondary_pinnings: &RegionMap<R, BTreeSet<ServerId>>,
    usage: &mut UsageTally,
) -> Result<Blueprint<R>> {
    let mut blueprint = Blueprint::new();
    for shard in shards {
        let pins = pins_for_shard(primary_pinnings, secondary_pinnings, shard);
        let roles = suggest_for_shard(inputs, shard, &pins, usage)?;
        blueprint.merge_shard(shard, roles);
    }

    debug_assert!(
        blueprint.validate(shards, inputs.servers.keys()).is_ok(),
        "suggested blueprint is inconsistent"
    );
    Ok(blueprint)
}

/// Suggest a blueprint for one table of `state`
pub fn suggest_table_blueprint<R: Region>(
    state: &ClusterState<R>,
    table_id: &TableId,
    config: &SuggesterConfig,
    usage: &mut UsageTally,
) -> Result<Blueprint<R>> {
    let table = state.table(table_id)?;
    let shards = table.shard_set()?;
    let snapshot = state.liveness_snapshot(table_id)?;
    let servers = state.server_assignments();

    let unknown = table.unknown_pins(&state.servers);
    if !unknown.is_empty() {
        tracing::warn!(
            "Table {}: pinned servers {:?} are not in the cluster, ignoring their pins",
            table_id,
            unknown
        );
    }

    let inputs = PlacementInputs {
        snapshot: &snapshot,
        servers: &servers,
        primary_datacenter: table.primary_datacenter,
        replica_affinities: &table.replica_affinities,
        config,
    };
    let blueprint = suggest_blueprint(
        &inputs,
        &shards,
        &table.primary_pinnings,
        &table.secondary_pinnings,
        usage,
    )?;

    tracing::info!(
        "Table {} ({}): placed {} shards on {} servers",
        table_id,
        table.name,
        shards.len(),
        servers.len()
    );
    Ok(blueprint)
}

/// Suggest blueprints for every table of `state`, balancing load across them.
///
/// Tables are placed in id order against one shared tally. A table that
/// fails leaves the tally as it was before that table.
pub fn suggest_blueprints<R: Region>(
    state: &ClusterState<R>,
    config: &SuggesterConfig,
    usage: &mut UsageTally,
) -> BTreeMap<TableId, Result<Blueprint<R>>> {
    let mut results = BTreeMap::new();
    for table_id in state.tables.keys() {
        let checkpoint = usage.clone();
        let result = suggest_table_blueprint(state, table_id, config, usage);
        if let Err(e) = &result {
            tracing::warn!("Table {}: no blueprint: {}", table_id, e);
            *usage = checkpoint;
        }
        results.insert(*table_id, result);
    }
    results
}
