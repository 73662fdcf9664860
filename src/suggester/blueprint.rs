//! Blueprints: the target role of every server for every shard

use crate::common::{Error, Result, ServerId};
use crate::region::{NonoverlappingRegions, Region};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Primary,
    Secondary,
    Nothing,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Primary => write!(f, "primary"),
            Role::Secondary => write!(f, "secondary"),
            Role::Nothing => write!(f, "nothing"),
        }
    }
}

/// Server → shard → role.
///
/// Servers with no part in a shard are listed with [`Role::Nothing`] so the
/// server can tell it is not needed there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blueprint<R> {
    roles: BTreeMap<ServerId, BTreeMap<R, Role>>,
}

impl<R> Default for Blueprint<R> {
    fn default() -> Self {
        Self {
            roles: BTreeMap::new(),
        }
    }
}

/// One shard of a blueprint, as reported to operators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardPlacement<R> {
    pub region: R,
    pub primary: Option<ServerId>,
    pub secondaries: Vec<ServerId>,
    pub unused: Vec<ServerId>,
}

impl<R: Region> Blueprint<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the roles computed for one shard
    pub fn merge_shard(&mut self, shard: &R, roles: BTreeMap<ServerId, Role>) {
        for (server, role) in roles {
            self.roles
                .entry(server)
                .or_default()
                .insert(shard.clone(), role);
        }
    }

    pub fn role(&self, server: &ServerId, shard: &R) -> Option<Role> {
        self.roles.get(server).and_then(|shards| shards.get(shard)).copied()
    }

    pub fn servers(&self) -> impl Iterator<Item = &ServerId> {
        self.roles.keys()
    }

    /// Roles of one server, by shard
    pub fn roles_of(&self, server: &ServerId) -> Option<&BTreeMap<R, Role>> {
        self.roles.get(server)
    }

    pub fn primary_of(&self, shard: &R) -> Option<ServerId> {
        self.servers_with(shard, Role::Primary).into_iter().next()
    }

    /// Servers holding `role` for `shard`, in id order
    pub fn servers_with(&self, shard: &R, role: Role) -> Vec<ServerId> {
        self.roles
            .iter()
            .filter(|(_, shards)| shards.get(shard) == Some(&role))
            .map(|(server, _)| *server)
            .collect()
    }

    /// Check the blueprint against the table's shards and the known servers.
    pub fn validate<'a>(
        &self,
        shards: &NonoverlappingRegions<R>,
        servers: impl IntoIterator<Item = &'a ServerId>,
    ) -> Result<()> {
        for server in servers {
            let Some(roles) = self.roles.get(server) else {
                return Err(Error::InvalidBlueprint(format!(
                    "server {} has no roles",
                    server
                )));
            };
            if let Some(shard) = shards.iter().find(|shard| !roles.contains_key(*shard)) {
                return Err(Error::InvalidBlueprint(format!(
                    "server {} has no role for {:?}",
                    server, shard
                )));
            }
        }

        for (server, roles) in &self.roles {
            if let Some(region) = roles.keys().find(|region| !shards.contains(*region)) {
                return Err(Error::InvalidBlueprint(format!(
                    "server {} has a role for {:?}, which is not a shard",
                    server, region
                )));
            }
        }

        for shard in shards {
            let primaries = self.servers_with(shard, Role::Primary).len();
            if primaries != 1 {
                return Err(Error::InvalidBlueprint(format!(
                    "{:?} has {} primaries",
                    shard, primaries
                )));
            }
        }
        Ok(())
    }

    /// Per-shard view of the blueprint, in shard order
    pub fn shard_placements(&self) -> Vec<ShardPlacement<R>> {
        let mut placements: BTreeMap<&R, ShardPlacement<R>> = BTreeMap::new();
        for (server, shards) in &self.roles {
            for (shard, role) in shards {
                let placement = placements.entry(shard).or_insert_with(|| ShardPlacement {
                    region: shard.clone(),
                    primary: None,
                    secondaries: Vec::new(),
                    unused: Vec::new(),
                });
                match role {
                    Role::Primary => placement.primary = Some(*server),
                    Role::Secondary => placement.secondaries.push(*server),
                    Role::Nothing => placement.unused.push(*server),
                }
            }
        }
        placements.into_values().collect()
    }
}

impl<R: Region + Serialize> Blueprint<R> {
    /// BLAKE3 digest of the per-shard view; equal blueprints share a fingerprint.
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(&self.shard_placements())?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::KeyRange;
    use uuid::Uuid;

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn two_shard_blueprint() -> (Blueprint<KeyRange>, NonoverlappingRegions<KeyRange>) {
        let shards = NonoverlappingRegions::for_sharding(KeyRange::split_universe(&["m"])).unwrap();
        let mut blueprint = Blueprint::new();
        blueprint.merge_shard(
            &KeyRange::bounded("", "m"),
            BTreeMap::from([(id(1), Role::Primary), (id(2), Role::Secondary)]),
        );
        blueprint.merge_shard(
            &KeyRange::from_key("m"),
            BTreeMap::from([(id(1), Role::Nothing), (id(2), Role::Primary)]),
        );
        (blueprint, shards)
    }

    #[test]
    fn test_merge_and_lookup() {
        let (blueprint, _) = two_shard_blueprint();
        let low = KeyRange::bounded("", "m");
        assert_eq!(blueprint.role(&id(1), &low), Some(Role::Primary));
        assert_eq!(blueprint.primary_of(&KeyRange::from_key("m")), Some(id(2)));
        assert_eq!(blueprint.roles_of(&id(2)).unwrap().len(), 2);
        assert_eq!(blueprint.role(&id(3), &low), None);
    }

    #[test]
    fn test_validate() {
        let (blueprint, shards) = two_shard_blueprint();
        assert!(blueprint.validate(&shards, &[id(1), id(2)]).is_ok());

        let err = blueprint.validate(&shards, &[id(1), id(3)]).unwrap_err();
        assert!(matches!(err, Error::InvalidBlueprint(_)));
    }

    #[test]
    fn test_validate_rejects_two_primaries() {
        let (mut blueprint, shards) = two_shard_blueprint();
        blueprint.merge_shard(
            &KeyRange::from_key("m"),
            BTreeMap::from([(id(1), Role::Primary)]),
        );
        assert!(blueprint.validate(&shards, &[id(1), id(2)]).is_err());
    }

    #[test]
    fn test_shard_placements_and_fingerprint() {
        let (blueprint, _) = two_shard_blueprint();
        let placements = blueprint.shard_placements();
        assert_eq!(placements.len(), 2);
        assert_eq!(placements[0].primary, Some(id(1)));
        assert_eq!(placements[0].secondaries, vec![id(2)]);
        assert_eq!(placements[1].unused, vec![id(1)]);

        let (again, _) = two_shard_blueprint();
        assert_eq!(blueprint.fingerprint().unwrap(), again.fingerprint().unwrap());
        assert_eq!(blueprint.fingerprint().unwrap().len(), 64);
    }
}
