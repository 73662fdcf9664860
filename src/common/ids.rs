//! Identities of servers, datacenters and tables

use uuid::Uuid;

pub type ServerId = Uuid;
pub type DatacenterId = Uuid;
pub type TableId = Uuid;

/// Reserved datacenter id: "any datacenter" in affinity maps, "no datacenter" in membership.
pub const UNCONSTRAINED: DatacenterId = Uuid::nil();

pub fn is_unconstrained(datacenter: &DatacenterId) -> bool {
    datacenter.is_nil()
}

/// Human-readable datacenter name for errors and logs
pub fn describe_datacenter(datacenter: &DatacenterId) -> String {
    if is_unconstrained(datacenter) {
        "any datacenter".to_string()
    } else {
        format!("datacenter {}", datacenter)
    }
}
