//! Common utilities and types shared across miniplan

pub mod config;
pub mod error;
pub mod ids;

pub use config::{Config, SuggesterConfig};
pub use error::{Error, Result};
pub use ids::{describe_datacenter, is_unconstrained, DatacenterId, ServerId, TableId, UNCONSTRAINED};
