//! Role assignment for a single shard
//!
//! Greedy passes, in order:
//! 1. primary from the primary datacenter (if one is set)
//! 2. secondaries for every concrete datacenter affinity
//! 3. primary from any datacenter (if none was set)
//! 4. secondaries for the unconstrained affinity
//! 5. everyone left over gets `Nothing`
//!
//! Concrete datacenters go first so the unconstrained affinity only takes
//! what they leave behind.

use crate::cluster::{LivenessSnapshot, ServerAssignments};
use crate::common::{
    describe_datacenter, is_unconstrained, DatacenterId, Error, Result, ServerId,
    SuggesterConfig, UNCONSTRAINED,
};
use crate::region::Region;
use crate::suggester::blueprint::Role;
use crate::suggester::priority::{CandidateQueue, RankingContext};
use crate::suggester::usage::UsageTally;
use std::collections::{BTreeMap, BTreeSet};

/// Inputs that stay the same for every shard of a table
#[derive(Debug)]
pub struct PlacementInputs<'a, R> {
    pub snapshot: &'a LivenessSnapshot<R>,
    pub servers: &'a ServerAssignments,
    pub primary_datacenter: DatacenterId,
    /// Datacenter → total replicas per shard, the primary included
    pub replica_affinities: &'a BTreeMap<DatacenterId, usize>,
    pub config: &'a SuggesterConfig,
}

/// Servers pinned to each role for one shard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardPins {
    pub primary: BTreeSet<ServerId>,
    pub secondary: BTreeSet<ServerId>,
}

impl<R: Region> PlacementInputs<'_, R> {
    /// Secondaries `datacenter` must host once the primary is accounted for
    fn secondaries_needed(&self, datacenter: &DatacenterId, replicas: usize) -> usize {
        if *datacenter == self.primary_datacenter {
            replicas.saturating_sub(1)
        } else {
            replicas
        }
    }
}

/// Compute the role of every known server for `shard`.
///
/// Charges `usage` for each primary and secondary handed out. On error the
/// tally may hold charges for roles assigned before the failure.
pub fn suggest_for_shard<R: Region>(
    inputs: &PlacementInputs<'_, R>,
    shard: &R,
    pins: &ShardPins,
    usage: &mut UsageTally,
) -> Result<BTreeMap<ServerId, Role>> {
    let mut pass = ShardPass {
        inputs,
        shard,
        pins,
        usage,
        unused: inputs.servers.keys().copied().collect(),
        roles: BTreeMap::new(),
    };

    let primary_datacenter = inputs.primary_datacenter;
    if !is_unconstrained(&primary_datacenter) {
        pass.fill(Role::Primary, Some(primary_datacenter), 1)?;
    }

    for (datacenter, replicas) in inputs.replica_affinities {
        if is_unconstrained(datacenter) {
            continue;
        }
        let needed = inputs.secondaries_needed(datacenter, *replicas);
        pass.fill(Role::Secondary, Some(*datacenter), needed)?;
    }

    if is_unconstrained(&primary_datacenter) {
        pass.fill(Role::Primary, None, 1)?;
    }

    if let Some(replicas) = inputs.replica_affinities.get(&UNCONSTRAINED) {
        let needed = inputs.secondaries_needed(&UNCONSTRAINED, *replicas);
        pass.fill(Role::Secondary, None, needed)?;
    }

    Ok(pass.finish())
}

struct ShardPass<'p, 'a, R> {
    inputs: &'p PlacementInputs<'a, R>,
    shard: &'p R,
    pins: &'p ShardPins,
    usage: &'p mut UsageTally,
    unused: BTreeSet<ServerId>,
    roles: BTreeMap<ServerId, Role>,
}

impl<R: Region> ShardPass<'_, '_, R> {
    /// Assign `role` to the `count` best unused servers of `datacenter`
    /// (any datacenter when `None`).
    fn fill(&mut self, role: Role, datacenter: Option<DatacenterId>, count: usize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }

        let (pinned, pinned_elsewhere) = match role {
            Role::Primary => (&self.pins.primary, &self.pins.secondary),
            _ => (&self.pins.secondary, &self.pins.primary),
        };
        let ranking = RankingContext {
            snapshot: self.inputs.snapshot,
            shard: self.shard,
            pinned,
            pinned_elsewhere,
            usage: &*self.usage,
            prioritize_distribution: self.inputs.config.prioritize_distribution,
        };

        let servers = self.inputs.servers;
        let mut queue: CandidateQueue = self
            .unused
            .iter()
            .filter(|server| datacenter.map_or(true, |dc| servers.get(*server) == Some(&dc)))
            .map(|server| ranking.priority(*server))
            .collect();

        if queue.len() < count {
            let datacenter = datacenter.unwrap_or(UNCONSTRAINED);
            tracing::debug!(
                "Shard {:?}: {} {:?} wanted in {}, {} candidates",
                self.shard,
                count,
                role,
                describe_datacenter(&datacenter),
                queue.len()
            );
            return Err(Error::CannotSatisfyGoals {
                datacenter,
                needed: count,
                available: queue.len(),
            });
        }

        let cost = match role {
            Role::Primary => self.inputs.config.primary_usage_cost,
            _ => self.inputs.config.secondary_usage_cost,
        };
        for _ in 0..count {
            let Some(best) = queue.pop() else {
                break;
            };
            tracing::debug!(
                "Shard {:?}: {} -> {:?} (pinned: {}, usage: {}, backfill: {:.2})",
                self.shard,
                best.server,
                role,
                best.pinned,
                best.usage,
                best.backfill_cost
            );
            self.unused.remove(&best.server);
            self.roles.insert(best.server, role);
            self.usage.charge(best.server, cost);
        }
        Ok(())
    }

    fn finish(mut self) -> BTreeMap<ServerId, Role> {
        for server in std::mem::take(&mut self.unused) {
            self.roles.insert(server, Role::Nothing);
        }

        for server in &self.pins.primary {
            if self.roles.get(server) != Some(&Role::Primary) {
                tracing::debug!("Shard {:?}: pinned primary {} not used", self.shard, server);
            }
        }
        self.roles
    }
}
