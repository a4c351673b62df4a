// vim: tw=80
use std::{io, num::ParseIntError};

use thiserror::Error;

use crate::DiskFilter;

/// Everything that can go wrong between the command line and a report.
#[derive(Debug, Error)]
pub enum Error {
    /// A numeric command line argument could not be used.
    #[error("invalid {name} '{value}'")]
    InvalidArgument {
        name: &'static str,
        value: String,
        #[source]
        source: InvalidValue,
    },

    /// No active domain has this name or UUID.
    #[error("{domain}: no such domain")]
    DomainNotFound { domain: String },

    /// The disk filter selected nothing from the domain's inventory.
    #[error("{}", no_match(.filter))]
    NoMatchingDisk { filter: DiskFilter },

    /// The hypervisor could not report counters for a tracked disk.
    #[error("{disk}: cannot fetch block stats")]
    BlockStatsFetchFailed {
        disk: String,
        #[source]
        source: io::Error,
    },

    /// Talking to the hypervisor failed outside of a tick.
    #[error("{operation}")]
    Hypervisor {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// The domain's XML description could not be understood.
    #[error("cannot parse domain XML")]
    Inventory(#[from] quick_xml::DeError),
}

/// Why an argument's value was rejected.
#[derive(Debug, Error)]
pub enum InvalidValue {
    #[error(transparent)]
    NotAnInteger(#[from] ParseIntError),
    #[error("must be greater than zero")]
    NotPositive,
    #[error("must not be negative")]
    Negative,
}

fn no_match(filter: &DiskFilter) -> String {
    match filter {
        DiskFilter::All => "no disks found".to_string(),
        DiskFilter::Disk(s) => format!("{s}: no such disk"),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
