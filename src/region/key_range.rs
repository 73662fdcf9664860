//! Half-open key ranges over string keys

use crate::common::{Error, Result};
use crate::region::Region;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// `[left, right)`; `right == None` extends to the end of the keyspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyRange {
    #[serde(default)]
    pub left: String,
    #[serde(default)]
    pub right: Option<String>,
}

impl KeyRange {
    pub fn new(left: impl Into<String>, right: Option<String>) -> Self {
        Self {
            left: left.into(),
            right,
        }
    }

    /// `[left, right)` with a bounded right end
    pub fn bounded(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::new(left, Some(right.into()))
    }

    /// `[left, +inf)`
    pub fn from_key(left: impl Into<String>) -> Self {
        Self::new(left, None)
    }

    /// Split the universe at the given keys (which must be sorted and distinct)
    pub fn split_universe(split_points: &[&str]) -> Vec<Self> {
        let mut ranges = Vec::with_capacity(split_points.len() + 1);
        let mut left = String::new();
        for point in split_points {
            ranges.push(Self::bounded(left, *point));
            left = point.to_string();
        }
        ranges.push(Self::from_key(left));
        ranges
    }

    pub fn contains_key(&self, key: &str) -> bool {
        key >= self.left.as_str() && self.right.as_deref().map_or(true, |right| key < right)
    }
}

/// Compare right bounds, treating `None` as +inf
fn cmp_right(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp(b),
    }
}

impl Ord for KeyRange {
    fn cmp(&self, other: &Self) -> Ordering {
        self.left
            .cmp(&other.left)
            .then_with(|| cmp_right(&self.right, &other.right))
    }
}

impl PartialOrd for KeyRange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for KeyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.right {
            Some(right) => write!(f, "[{:?}, {:?})", self.left, right),
            None => write!(f, "[{:?}, +inf)", self.left),
        }
    }
}

impl Region for KeyRange {
    fn universe() -> Self {
        Self::from_key("")
    }

    fn intersection(&self, other: &Self) -> Self {
        let left = std::cmp::max(&self.left, &other.left).clone();
        let right = match cmp_right(&self.right, &other.right) {
            Ordering::Greater => other.right.clone(),
            _ => self.right.clone(),
        };
        Self { left, right }
    }

    fn is_empty(&self) -> bool {
        self.right
            .as_deref()
            .is_some_and(|right| right <= self.left.as_str())
    }

    fn difference(&self, other: &Self) -> Vec<Self> {
        let overlap = self.intersection(other);
        if overlap.is_empty() {
            return if self.is_empty() { vec![] } else { vec![self.clone()] };
        }

        let mut pieces = Vec::new();
        let below = Self::bounded(self.left.clone(), overlap.left.clone());
        if !below.is_empty() {
            pieces.push(below);
        }
        if let Some(split) = overlap.right {
            let above = Self::new(split, self.right.clone());
            if !above.is_empty() {
                pieces.push(above);
            }
        }
        pieces
    }

    fn join(parts: &[Self]) -> Result<Self> {
        let mut sorted: Vec<&Self> = parts.iter().filter(|r| !r.is_empty()).collect();
        sorted.sort();

        let Some(first) = sorted.first() else {
            return Err(Error::BadJoin("no non-empty regions to join".into()));
        };

        let mut joined = (*first).clone();
        for next in &sorted[1..] {
            match &joined.right {
                Some(right) if *right == next.left => joined.right = next.right.clone(),
                Some(right) if *right < next.left => {
                    return Err(Error::BadJoin(format!("gap before {}", next)));
                }
                _ => return Err(Error::BadJoin(format!("{} overlaps {}", joined, next))),
            }
        }
        Ok(joined)
    }
}
