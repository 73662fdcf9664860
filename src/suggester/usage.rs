//! Per-server usage accumulated while suggesting blueprints

use crate::common::ServerId;
use std::collections::BTreeMap;

/// Running usage tally.
///
/// Lives as long as the caller wants load balanced: one table, or every
/// table of a cluster when threaded through several suggestions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageTally {
    usage: BTreeMap<ServerId, u64>,
}

impl UsageTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, server: &ServerId) -> u64 {
        self.usage.get(server).copied().unwrap_or(0)
    }

    pub fn charge(&mut self, server: ServerId, cost: u64) {
        *self.usage.entry(server).or_insert(0) += cost;
    }

    pub fn reset(&mut self) {
        self.usage.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ServerId, &u64)> {
        self.usage.iter()
    }

    pub fn total(&self) -> u64 {
        self.usage.values().sum()
    }
}
