// vim: tw=80
use std::{io, thread};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::info;
use virt_blkstat::{virsh::{self, Connect}, Sampler};

mod config;
mod output;
mod poller;

use config::Config;
use poller::Poller;

/// Report block device statistics for libvirt domains
#[derive(Debug, clap::Parser)]
#[clap(version)]
struct Cli {
    /// uuid or name of the domain
    domain: String,
    /// interval between reports, in seconds [default: 1]
    interval: Option<String>,
    /// print this many reports, 0 for unlimited [default: 999999]
    count: Option<String>,
    /// disk name or serial
    #[clap(short = 'd', long = "disk", default_value = "all")]
    disk: String,
    /// hypervisor connection URI
    #[clap(short = 'c', long = "connect", default_value = virsh::DEFAULT_URI)]
    connect: String,
}

fn main() -> Result<()> {
    let cli: Cli = Cli::parse();

    // Keep stdout for the report.  Diagnostics go to stderr, controlled by
    // RUST_LOG.
    Builder::from_env(Env::default().default_filter_or("warn")).init();

    // Reject bad arguments before touching the hypervisor.
    let config = Config::try_from(cli)?;

    let conn = Connect::open(&config.uri)?;
    let domain = conn.lookup_domain(&config.domain)?;
    let inventory = domain.disks()
        .with_context(|| format!("{}: cannot list disks", domain.name()))?;
    let disks = config.filter.select(&inventory)?;
    info!("monitoring {} disk(s) of {} on {}", disks.len(), domain.name(),
          conn.uri());

    let mut poller = Poller::new(&config, Sampler::new(disks), &domain);
    let stdout = io::stdout();
    let r = poller.run(&mut stdout.lock(), thread::sleep);
    info!("polling loop {:?}", poller.state());
    r
}
