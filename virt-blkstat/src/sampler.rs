// vim: tw=80
use std::io;

use log::trace;

use crate::{CounterSnapshot, DiskDescriptor, Error, IntervalDelta, Result};

/// A source of cumulative block device counters for one domain.
pub trait BlockStats {
    /// Fetch the current counters for the disk with this target name.
    fn block_stats(&self, disk: &str) -> io::Result<CounterSnapshot>;
}

impl<T: BlockStats + ?Sized> BlockStats for &T {
    fn block_stats(&self, disk: &str) -> io::Result<CounterSnapshot> {
        (**self).block_stats(disk)
    }
}

/// One disk being sampled, along with its most recent counters.
#[derive(Clone, Debug)]
pub struct TrackedDisk {
    descriptor: DiskDescriptor,
    previous: Option<CounterSnapshot>,
}

impl TrackedDisk {
    pub fn descriptor(&self) -> &DiskDescriptor {
        &self.descriptor
    }

    /// The counters fetched on the last tick, or `None` before the first.
    pub fn previous(&self) -> Option<&CounterSnapshot> {
        self.previous.as_ref()
    }
}

/// Turns a stream of cumulative snapshots into per-interval deltas.
///
/// Each disk's baseline is stored right after its own fetch succeeds.  If a
/// tick fails partway, disks sampled before the failure keep their new
/// baselines and the rest keep their old ones.
#[derive(Clone, Debug)]
pub struct Sampler {
    disks: Vec<TrackedDisk>,
}

impl Sampler {
    pub fn new(disks: Vec<DiskDescriptor>) -> Self {
        let disks = disks.into_iter()
            .map(|descriptor| TrackedDisk { descriptor, previous: None })
            .collect();
        Sampler { disks }
    }

    pub fn disks(&self) -> &[TrackedDisk] {
        &self.disks
    }

    /// Sample every tracked disk once.
    ///
    /// Returns one delta per disk, in tracking order.  The first tick of a
    /// disk always yields an all-zero delta.
    pub fn tick<S>(&mut self, source: &S)
        -> Result<Vec<(&DiskDescriptor, IntervalDelta)>>
        where S: BlockStats + ?Sized
    {
        let mut deltas = Vec::with_capacity(self.disks.len());
        for disk in self.disks.iter_mut() {
            let name = &disk.descriptor.name;
            let fresh = source.block_stats(name)
                .map_err(|source| Error::BlockStatsFetchFailed {
                    disk: name.clone(),
                    source,
                })?;
            trace!("{name}: {fresh:?}");
            deltas.push(IntervalDelta::between(&fresh, disk.previous.as_ref()));
            disk.previous = Some(fresh);
        }
        Ok(self.disks.iter()
            .map(TrackedDisk::descriptor)
            .zip(deltas)
            .collect())
    }
}
