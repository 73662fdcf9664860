//! Regions of the keyspace
//!
//! The suggester is generic over anything implementing [`Region`]: it only
//! needs intersection, emptiness, the universal region, and enough algebra
//! (difference, join) to split and validate shard sets.

pub mod key_range;
pub mod nonoverlapping;
pub mod region_map;

pub use key_range::KeyRange;
pub use nonoverlapping::NonoverlappingRegions;
pub use region_map::RegionMap;

use crate::common::Result;
use std::fmt;

/// Capability required of a keyspace region.
pub trait Region: Clone + Ord + fmt::Debug {
    /// The region covering the whole keyspace
    fn universe() -> Self;

    /// The (possibly empty) region covered by both `self` and `other`
    fn intersection(&self, other: &Self) -> Self;

    fn is_empty(&self) -> bool;

    /// The non-empty pieces of `self` not covered by `other`
    fn difference(&self, other: &Self) -> Vec<Self>;

    /// Union of pairwise-disjoint regions that together form a single region.
    ///
    /// Fails with [`crate::Error::BadJoin`] on overlaps or gaps.
    fn join(parts: &[Self]) -> Result<Self>;

    fn overlaps(&self, other: &Self) -> bool {
        !self.intersection(other).is_empty()
    }
}
