//! Sets of pairwise-disjoint regions (a table's shard boundaries)

use crate::common::{Error, Result};
use crate::region::Region;
use std::collections::BTreeSet;

/// Set of regions in which no two members intersect.
///
/// A set is usable as a table's sharding once its members also cover the
/// whole keyspace, see [`NonoverlappingRegions::valid_for_sharding`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonoverlappingRegions<R: Region> {
    regions: BTreeSet<R>,
}

impl<R: Region> Default for NonoverlappingRegions<R> {
    fn default() -> Self {
        Self {
            regions: BTreeSet::new(),
        }
    }
}

impl<R: Region> NonoverlappingRegions<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set that is immediately valid for sharding
    pub fn for_sharding(regions: Vec<R>) -> Result<Self> {
        let mut set = Self::new();
        set.set_regions(regions)?;
        if !set.valid_for_sharding() {
            return Err(Error::InvalidRegionSet(
                "regions do not cover the whole keyspace".into(),
            ));
        }
        Ok(set)
    }

    /// Replace the whole set. On failure the set is left unchanged.
    pub fn set_regions(&mut self, regions: Vec<R>) -> Result<()> {
        let mut candidate = Self::new();
        for region in regions {
            candidate.add_region(region)?;
        }
        *self = candidate;
        Ok(())
    }

    /// Add one region, rejecting it if it is empty or overlaps a member.
    pub fn add_region(&mut self, region: R) -> Result<()> {
        if region.is_empty() {
            return Err(Error::EmptyRegion(format!("{:?}", region)));
        }
        if let Some(existing) = self.regions.iter().find(|r| r.overlaps(&region)) {
            return Err(Error::OverlappingRegion(format!(
                "{:?} overlaps {:?}",
                region, existing
            )));
        }
        self.regions.insert(region);
        Ok(())
    }

    /// Members are disjoint by construction; this checks they join into the universe.
    pub fn valid_for_sharding(&self) -> bool {
        let parts: Vec<R> = self.regions.iter().cloned().collect();
        matches!(R::join(&parts), Ok(joined) if joined == R::universe())
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.regions.iter()
    }

    pub fn contains(&self, region: &R) -> bool {
        self.regions.contains(region)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl<'a, R: Region> IntoIterator for &'a NonoverlappingRegions<R> {
    type Item = &'a R;
    type IntoIter = std::collections::btree_set::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}
