// vim: tw=80
use std::{convert::Infallible, fmt, str::FromStr};

use crate::{DiskDescriptor, Error, Result};

/// Chooses which of a domain's disks to report on.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum DiskFilter {
    /// Every disk in the inventory
    #[default]
    All,
    /// Only the disk with this device name or serial
    Disk(String),
}

impl DiskFilter {
    pub fn is_match(&self, disk: &DiskDescriptor) -> bool {
        match self {
            DiskFilter::All => true,
            DiskFilter::Disk(s) => {
                disk.name == *s || disk.serial.as_deref() == Some(s.as_str())
            }
        }
    }

    /// Select the disks to track from a domain's inventory, preserving their
    /// order.  It is an error to select nothing.
    pub fn select(&self, inventory: &[DiskDescriptor])
        -> Result<Vec<DiskDescriptor>>
    {
        let selected = inventory.iter()
            .filter(|disk| self.is_match(disk))
            .cloned()
            .collect::<Vec<_>>();
        if selected.is_empty() {
            Err(Error::NoMatchingDisk { filter: self.clone() })
        } else {
            Ok(selected)
        }
    }
}

impl From<&str> for DiskFilter {
    fn from(s: &str) -> Self {
        if s == "all" {
            DiskFilter::All
        } else {
            DiskFilter::Disk(s.to_string())
        }
    }
}

impl FromStr for DiskFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(DiskFilter::from(s))
    }
}

impl fmt::Display for DiskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiskFilter::All => f.write_str("all"),
            DiskFilter::Disk(s) => f.write_str(s),
        }
    }
}
