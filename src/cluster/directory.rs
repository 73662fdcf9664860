//! Cluster state consumed by the suggester
//!
//! Stores:
//! - Server metadata (server id → name, datacenter, deleted flag)
//! - Directory (server id → table id → published business card)
//! - Table configuration (affinities, shard boundaries, pins)

use crate::cluster::activity::BusinessCard;
use crate::common::{DatacenterId, Error, Result, ServerId, TableId, UNCONSTRAINED};
use crate::region::{NonoverlappingRegions, Region, RegionMap};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Server → business card for one table, as currently observed
pub type LivenessSnapshot<R> = BTreeMap<ServerId, BusinessCard<R>>;

/// Server → datacenter it belongs to
pub type ServerAssignments = BTreeMap<ServerId, DatacenterId>;

/// Server metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    #[serde(default)]
    pub name: String,
    /// `UNCONSTRAINED` if the server belongs to no datacenter
    #[serde(default = "unassigned")]
    pub datacenter: DatacenterId,
    #[serde(default)]
    pub deleted: bool,
}

fn unassigned() -> DatacenterId {
    UNCONSTRAINED
}

impl ServerRecord {
    pub fn new(name: impl Into<String>, datacenter: DatacenterId) -> Self {
        Self {
            name: name.into(),
            datacenter,
            deleted: false,
        }
    }
}

/// Placement goals and constraints for one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "R: Deserialize<'de>"))]
pub struct TableConfig<R> {
    #[serde(default)]
    pub name: String,

    /// Where the primary must live; `UNCONSTRAINED` lets any server take it
    #[serde(default = "unassigned")]
    pub primary_datacenter: DatacenterId,

    /// Datacenter → total replicas it hosts per shard (the primary included)
    #[serde(default)]
    pub replica_affinities: BTreeMap<DatacenterId, usize>,

    /// Shard boundaries; must cover the keyspace without overlaps
    pub shards: Vec<R>,

    #[serde(default)]
    pub primary_pinnings: RegionMap<R, ServerId>,

    #[serde(default)]
    pub secondary_pinnings: RegionMap<R, BTreeSet<ServerId>>,
}

impl<R: Region> TableConfig<R> {
    pub fn new(
        primary_datacenter: DatacenterId,
        replica_affinities: BTreeMap<DatacenterId, usize>,
        shards: Vec<R>,
    ) -> Self {
        Self {
            name: String::new(),
            primary_datacenter,
            replica_affinities,
            shards,
            primary_pinnings: RegionMap::new(),
            secondary_pinnings: RegionMap::new(),
        }
    }

    /// Validated shard set for this table
    pub fn shard_set(&self) -> Result<NonoverlappingRegions<R>> {
        NonoverlappingRegions::for_sharding(self.shards.clone())
    }

    /// Pinned servers that are not known to (or deleted from) the cluster
    pub fn unknown_pins(&self, servers: &BTreeMap<ServerId, ServerRecord>) -> Vec<ServerId> {
        let pinned: BTreeSet<ServerId> = self
            .primary_pinnings
            .values()
            .copied()
            .chain(self.secondary_pinnings.values().flatten().copied())
            .collect();
        pinned
            .into_iter()
            .filter(|id| servers.get(id).map_or(true, |s| s.deleted))
            .collect()
    }

    /// Validated shard set, failing also when a pin names an unavailable server
    pub fn check(
        &self,
        servers: &BTreeMap<ServerId, ServerRecord>,
    ) -> Result<NonoverlappingRegions<R>> {
        let shards = self.shard_set()?;
        let unknown = self.unknown_pins(servers);
        if !unknown.is_empty() {
            return Err(Error::UnavailablePins(unknown));
        }
        Ok(shards)
    }
}

/// Everything the suggester needs to know about a cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "R: Deserialize<'de>"))]
pub struct ClusterState<R> {
    #[serde(default)]
    pub servers: BTreeMap<ServerId, ServerRecord>,

    #[serde(default)]
    pub directory: BTreeMap<ServerId, BTreeMap<TableId, BusinessCard<R>>>,

    #[serde(default)]
    pub tables: BTreeMap<TableId, TableConfig<R>>,
}

impl<R> Default for ClusterState<R> {
    fn default() -> Self {
        Self {
            servers: BTreeMap::new(),
            directory: BTreeMap::new(),
            tables: BTreeMap::new(),
        }
    }
}

impl<R: Region> ClusterState<R> {
    /// Datacenter membership of every live (non-deleted) server
    pub fn server_assignments(&self) -> ServerAssignments {
        self.servers
            .iter()
            .filter(|(_, record)| !record.deleted)
            .map(|(id, record)| (*id, record.datacenter))
            .collect()
    }

    pub fn table(&self, table_id: &TableId) -> Result<&TableConfig<R>> {
        self.tables
            .get(table_id)
            .ok_or(Error::UnknownTable(*table_id))
    }

    /// Business cards published for `table_id`.
    ///
    /// Servers that publish nothing for the table are simply absent. Cards from
    /// deleted servers are skipped; a card from a server with no record at all
    /// is an error.
    pub fn liveness_snapshot(&self, table_id: &TableId) -> Result<LivenessSnapshot<R>> {
        let mut snapshot = LivenessSnapshot::new();
        for (server_id, cards) in &self.directory {
            let Some(card) = cards.get(table_id) else {
                continue;
            };
            match self.servers.get(server_id) {
                Some(record) if record.deleted => continue,
                Some(_) => {
                    snapshot.insert(*server_id, card.clone());
                }
                None => return Err(Error::MissingServer(*server_id)),
            }
        }
        Ok(snapshot)
    }
}
