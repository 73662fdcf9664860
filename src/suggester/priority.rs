//! Candidate ranking
//!
//! Candidates for a role are compared on, in order:
//! 1. pinned to this role (pinned wins)
//! 2. pinned to the other role (robbing it loses)
//! 3. and 4. usage, then backfill cost, or the reverse unless
//!    `prioritize_distribution` is set
//!
//! Lower usage and lower backfill cost rank higher.

use crate::cluster::LivenessSnapshot;
use crate::common::ServerId;
use crate::region::Region;
use crate::suggester::cost::server_backfill_cost;
use crate::suggester::usage::UsageTally;
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeSet, BinaryHeap};

/// Priority of one candidate for one role; greater is better.
#[derive(Debug, Clone, Copy)]
pub struct Priority {
    pub server: ServerId,
    pub pinned: bool,
    pub would_rob: bool,
    pub usage: u64,
    pub backfill_cost: f64,
    pub prioritize_distribution: bool,
}

/// Inputs shared by every candidate ranked for one role on one shard
pub struct RankingContext<'a, R> {
    pub snapshot: &'a LivenessSnapshot<R>,
    pub shard: &'a R,
    /// Servers pinned to the role being filled
    pub pinned: &'a BTreeSet<ServerId>,
    /// Servers pinned to the other role
    pub pinned_elsewhere: &'a BTreeSet<ServerId>,
    pub usage: &'a UsageTally,
    pub prioritize_distribution: bool,
}

impl<R: Region> RankingContext<'_, R> {
    pub fn priority(&self, server: ServerId) -> Priority {
        Priority {
            server,
            pinned: self.pinned.contains(&server),
            would_rob: self.pinned_elsewhere.contains(&server),
            usage: self.usage.get(&server),
            backfill_cost: server_backfill_cost(self.snapshot, &server, self.shard),
            prioritize_distribution: self.prioritize_distribution,
        }
    }
}

impl Priority {
    fn cmp_usage(&self, other: &Self) -> Ordering {
        other.usage.cmp(&self.usage)
    }

    fn cmp_backfill(&self, other: &Self) -> Ordering {
        other.backfill_cost.total_cmp(&self.backfill_cost)
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        debug_assert_eq!(self.prioritize_distribution, other.prioritize_distribution);

        let pins = self
            .pinned
            .cmp(&other.pinned)
            .then_with(|| other.would_rob.cmp(&self.would_rob));

        if self.prioritize_distribution {
            pins.then_with(|| self.cmp_usage(other))
                .then_with(|| self.cmp_backfill(other))
        } else {
            pins.then_with(|| self.cmp_backfill(other))
                .then_with(|| self.cmp_usage(other))
        }
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Priority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Priority {}

/// Max-priority queue that pops equal priorities in insertion order.
#[derive(Debug, Default)]
pub struct CandidateQueue {
    heap: BinaryHeap<(Priority, Reverse<usize>)>,
    pushed: usize,
}

impl CandidateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, priority: Priority) {
        self.heap.push((priority, Reverse(self.pushed)));
        self.pushed += 1;
    }

    pub fn pop(&mut self) -> Option<Priority> {
        self.heap.pop().map(|(priority, _)| priority)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl FromIterator<Priority> for CandidateQueue {
    fn from_iter<I: IntoIterator<Item = Priority>>(iter: I) -> Self {
        let mut queue = Self::new();
        for priority in iter {
            queue.push(priority);
        }
        queue
    }
}
