//! Cluster inputs: activities, business cards and the cluster-state document

pub mod activity;
pub mod directory;

pub use activity::{Activity, BusinessCard};
pub use directory::{ClusterState, LivenessSnapshot, ServerAssignments, ServerRecord, TableConfig};
