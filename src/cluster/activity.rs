//! What each server is currently doing for a table's shards

use crate::region::{Region, RegionMap};
use serde::{Deserialize, Serialize};

/// Replication activity a server reports for one sub-region of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Primary,
    /// Primary, waiting for enough secondaries to be safe
    PrimaryWhenSafe,
    SecondaryUpToDate,
    SecondaryBackfilling,
    SecondaryWithoutPrimary,
    Nothing,
    /// Handing the region off; drops its copy once that is safe
    NothingWhenSafe,
    NothingWhenDoneErasing,
}

impl Activity {
    /// Cost of bringing a server in this state up to date
    pub fn base_cost(self) -> u32 {
        match self {
            Activity::Primary | Activity::PrimaryWhenSafe => 0,
            Activity::SecondaryUpToDate => 1,
            Activity::SecondaryBackfilling | Activity::SecondaryWithoutPrimary => 2,
            Activity::Nothing | Activity::NothingWhenSafe | Activity::NothingWhenDoneErasing => 3,
        }
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Activity::Primary => "primary",
            Activity::PrimaryWhenSafe => "primary (when safe)",
            Activity::SecondaryUpToDate => "secondary (up to date)",
            Activity::SecondaryBackfilling => "secondary (backfilling)",
            Activity::SecondaryWithoutPrimary => "secondary (without primary)",
            Activity::Nothing => "nothing",
            Activity::NothingWhenSafe => "nothing (when safe)",
            Activity::NothingWhenDoneErasing => "nothing (erasing)",
        };
        write!(f, "{}", name)
    }
}

/// A server's published activities for one table, keyed by sub-region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "R: Deserialize<'de>"))]
pub struct BusinessCard<R> {
    #[serde(default)]
    pub activities: RegionMap<R, Activity>,
}

impl<R> Default for BusinessCard<R> {
    fn default() -> Self {
        Self {
            activities: RegionMap::default(),
        }
    }
}

impl<R: Region> BusinessCard<R> {
    pub fn new(activities: impl IntoIterator<Item = (R, Activity)>) -> Self {
        Self {
            activities: RegionMap::from_entries(activities),
        }
    }

    /// A card reporting one activity over the whole keyspace
    pub fn uniform(activity: Activity) -> Self {
        Self {
            activities: RegionMap::from_region(R::universe(), activity),
        }
    }
}
