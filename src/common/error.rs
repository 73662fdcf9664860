//! Error types for miniplan

use crate::common::ids::{describe_datacenter, DatacenterId, ServerId, TableId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Placement Errors ===
    #[error(
        "Cannot satisfy goals in {}: need {needed} servers, have {available} (short by {})",
        describe_datacenter(.datacenter),
        short_by(.needed, .available)
    )]
    CannotSatisfyGoals {
        datacenter: DatacenterId,
        needed: usize,
        available: usize,
    },

    #[error("Server {0} is in the directory but not in the cluster metadata")]
    MissingServer(ServerId),

    #[error("Pins name unknown or deleted servers: {0:?}")]
    UnavailablePins(Vec<ServerId>),

    #[error("Unknown table: {0}")]
    UnknownTable(TableId),

    #[error("Invalid blueprint: {0}")]
    InvalidBlueprint(String),

    // === Region Errors ===
    #[error("Region overlaps an existing region: {0}")]
    OverlappingRegion(String),

    #[error("Region is empty: {0}")]
    EmptyRegion(String),

    #[error("Regions cannot be joined: {0}")]
    BadJoin(String),

    #[error("Invalid region set: {0}")]
    InvalidRegionSet(String),

    // === Config Errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // === Generic ===
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Is this a retryable error?
    ///
    /// Nothing inside the suggester retries; this tells the caller whether a fresh
    /// invocation against an updated cluster snapshot could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::CannotSatisfyGoals { .. } | Error::MissingServer(_)
        )
    }

    /// Number of servers missing to meet the goal, if this is a placement failure
    pub fn shortfall(&self) -> Option<usize> {
        match self {
            Error::CannotSatisfyGoals {
                needed, available, ..
            } => Some(short_by(needed, available)),
            _ => None,
        }
    }
}

fn short_by(needed: &usize, available: &usize) -> usize {
    needed.saturating_sub(*available)
}

// Implement From for common error types
impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Other(e.to_string())
    }
}
