//! Region → value maps
//!
//! Entries are pairwise disjoint but need not cover the keyspace: pin maps
//! only list the ranges an operator pinned.

use crate::region::Region;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionMap<R, V> {
    entries: Vec<(R, V)>,
}

impl<R, V> Default for RegionMap<R, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<R: Region, V: Clone> RegionMap<R, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map covering `region` with a single value
    pub fn from_region(region: R, value: V) -> Self {
        Self {
            entries: vec![(region, value)],
        }
    }

    /// Build from entries; later entries overwrite earlier ones where they overlap.
    pub fn from_entries(entries: impl IntoIterator<Item = (R, V)>) -> Self {
        let mut map = Self::new();
        for (region, value) in entries {
            map.set(region, value);
        }
        map
    }

    /// Assign `value` to `region`, splitting any entries it partially covers.
    pub fn set(&mut self, region: R, value: V) {
        if region.is_empty() {
            return;
        }
        let mut entries = Vec::with_capacity(self.entries.len() + 2);
        for (existing, old) in self.entries.drain(..) {
            if existing.overlaps(&region) {
                for piece in existing.difference(&region) {
                    entries.push((piece, old.clone()));
                }
            } else {
                entries.push((existing, old));
            }
        }
        entries.push((region, value));
        self.entries = entries;
    }

    /// Restrict the map to `region`, clipping entries to it.
    pub fn mask(&self, region: &R) -> Self {
        let entries = self
            .entries
            .iter()
            .filter_map(|(r, v)| {
                let clipped = r.intersection(region);
                (!clipped.is_empty()).then(|| (clipped, v.clone()))
            })
            .collect();
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&R, &V)> {
        self.entries.iter().map(|(r, v)| (r, v))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
