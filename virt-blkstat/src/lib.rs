// vim: tw=80
//! Per-interval block device statistics for libvirt domains
//!
//! libvirt reports cumulative counters for every disk attached to a domain.
//! This crate samples them periodically and turns each pair of consecutive
//! samples into per-second rates and per-request latencies, like
//! `iostat -x` does for the host's own disks.
//!
//! https://libvirt.org/manpages/virsh.html#domblkstat

use std::num::NonZeroU64;

mod error;
mod filter;
mod inventory;
mod sampler;
pub mod virsh;

pub use error::{Error, InvalidValue, Result};
pub use filter::DiskFilter;
pub use inventory::{parse_domain_xml, DiskDescriptor};
pub use sampler::{BlockStats, Sampler, TrackedDisk};

const NS_PER_MS: f64 = 1_000_000.0;

/// Used by [`IntervalDelta::between`]
macro_rules! delta {
    ($current: ident, $previous: ident, $field: ident) => {
        $current.$field.saturating_sub($previous.$field)
    }
}

macro_rules! per_sec {
    ($delta: ident, $field: ident, $interval: ident) => {
        $delta.$field / $interval.get()
    }
}

/// Average latency of one request type, in milliseconds.
///
/// Guarded on the per-second rate rather than on the raw request count, so
/// an interval with fewer requests than seconds reports no latency at all.
macro_rules! ms_per_req {
    ($rate: expr, $delta: ident, $reqs: ident, $duration: ident) => {
        if $rate != 0 {
            ($delta.$duration / $delta.$reqs) as f64 / NS_PER_MS
        } else {
            0.0
        }
    }
}

/// Cumulative counters for one disk, as reported by the hypervisor.
///
/// Times are in nanoseconds.  Counters the hypervisor does not support read
/// as zero.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CounterSnapshot {
    pub rd_req: u64,
    pub wr_req: u64,
    pub flush_req: u64,
    pub rd_bytes: u64,
    pub wr_bytes: u64,
    pub rd_total_time: u64,
    pub wr_total_time: u64,
    pub flush_total_time: u64,
    pub errs: u64,
}

/// Counters accrued by one disk during one polling interval.
///
/// Byte counts are converted to KiB.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IntervalDelta {
    pub rd_req: u64,
    pub wr_req: u64,
    pub flush_req: u64,
    pub rd_kib: u64,
    pub wr_kib: u64,
    pub rd_time: u64,
    pub wr_time: u64,
    pub flush_time: u64,
    pub errs: u64,
}

impl IntervalDelta {
    /// Compute the delta between two snapshots of the same disk.
    ///
    /// If `previous` is `None` this is the disk's first sample, and the delta
    /// is all zeros rather than the totals since the domain started.
    pub fn between(
        current: &CounterSnapshot,
        previous: Option<&CounterSnapshot>,
    ) -> Self {
        let Some(previous) = previous else {
            return Self::default();
        };
        IntervalDelta {
            rd_req: delta!(current, previous, rd_req),
            wr_req: delta!(current, previous, wr_req),
            flush_req: delta!(current, previous, flush_req),
            rd_kib: delta!(current, previous, rd_bytes) / 1024,
            wr_kib: delta!(current, previous, wr_bytes) / 1024,
            rd_time: delta!(current, previous, rd_total_time),
            wr_time: delta!(current, previous, wr_total_time),
            flush_time: delta!(current, previous, flush_total_time),
            errs: delta!(current, previous, errs),
        }
    }
}

/// Per-second rates and average latencies for one disk over one interval.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RateSample {
    pub r_s: u64,
    pub w_s: u64,
    pub flush_s: u64,
    pub rkb_s: u64,
    pub wkb_s: u64,
    /// Milliseconds per read request
    pub r_await: f64,
    /// Milliseconds per write request
    pub w_await: f64,
    /// Milliseconds per flush request
    pub flush_await: f64,
    pub err_s: u64,
}

impl RateSample {
    /// Normalize an [`IntervalDelta`] by the length of its interval.
    ///
    /// Rates use integer division, so they round down.
    pub fn compute(delta: &IntervalDelta, interval: NonZeroU64) -> Self {
        let r_s = per_sec!(delta, rd_req, interval);
        let w_s = per_sec!(delta, wr_req, interval);
        let flush_s = per_sec!(delta, flush_req, interval);
        RateSample {
            r_s,
            w_s,
            flush_s,
            rkb_s: per_sec!(delta, rd_kib, interval),
            wkb_s: per_sec!(delta, wr_kib, interval),
            r_await: ms_per_req!(r_s, delta, rd_req, rd_time),
            w_await: ms_per_req!(w_s, delta, wr_req, wr_time),
            flush_await: ms_per_req!(flush_s, delta, flush_req, flush_time),
            err_s: per_sec!(delta, errs, interval),
        }
    }
}
