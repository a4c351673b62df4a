// vim: tw=80
//! Access to libvirt through the `virsh` command line client
//!
//! https://libvirt.org/manpages/virsh.html

use std::{
    io::{self, Error as IoError},
    process::Command,
};

use log::debug;

use crate::{
    parse_domain_xml,
    BlockStats,
    CounterSnapshot,
    DiskDescriptor,
    Error,
    Result,
};

/// The connection URI used when none is given
pub const DEFAULT_URI: &str = "qemu:///system";

/// A connection to one hypervisor.
#[derive(Clone, Debug)]
pub struct Connect {
    uri: String,
}

impl Connect {
    /// Connect to the hypervisor at `uri`, verifying that it answers.
    pub fn open(uri: &str) -> Result<Self> {
        let conn = Connect { uri: uri.to_string() };
        conn.virsh(&["uri"])
            .map_err(|source| Error::Hypervisor {
                operation: format!("cannot connect to {uri}"),
                source,
            })?;
        Ok(conn)
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Names of every running domain.
    pub fn active_domains(&self) -> Result<Vec<String>> {
        self.virsh(&["list", "--name"])
            .map(|out| parse_list(&out))
            .map_err(|source| Error::Hypervisor {
                operation: "cannot list domains".to_string(),
                source,
            })
    }

    fn domain_uuid(&self, name: &str) -> Result<String> {
        self.virsh(&["domuuid", name])
            .map(|out| out.trim().to_string())
            .map_err(|source| Error::Hypervisor {
                operation: format!("{name}: cannot get domain UUID"),
                source,
            })
    }

    /// Find a running domain by its name or UUID.
    pub fn lookup_domain(&self, name_or_uuid: &str) -> Result<Domain<'_>> {
        let names = self.active_domains()?;
        let name = resolve(&names, |name| self.domain_uuid(name),
                           name_or_uuid)?;
        debug!("{name_or_uuid} resolved to domain {name}");
        Ok(Domain { conn: self, name })
    }

    fn virsh(&self, args: &[&str]) -> io::Result<String> {
        debug!("virsh -c {} {}", self.uri, args.join(" "));
        let output = Command::new("virsh")
            .arg("-q")
            .arg("-c")
            .arg(&self.uri)
            .args(args)
            .output()?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let msg = stderr.trim().trim_start_matches("error: ");
            let cmd = args.join(" ");
            Err(IoError::other(format!("virsh {cmd}: {msg}")))
        }
    }
}

/// A running domain.
#[derive(Clone, Debug)]
pub struct Domain<'a> {
    conn: &'a Connect,
    name: String,
}

impl Domain<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The domain's disk inventory, from its live XML description.
    pub fn disks(&self) -> Result<Vec<DiskDescriptor>> {
        let xml = self.conn.virsh(&["dumpxml", &self.name])
            .map_err(|source| Error::Hypervisor {
                operation: format!("{}: cannot get domain XML", self.name),
                source,
            })?;
        parse_domain_xml(&xml)
    }
}

impl BlockStats for Domain<'_> {
    fn block_stats(&self, disk: &str) -> io::Result<CounterSnapshot> {
        let out = self.conn.virsh(&["domblkstat", &self.name, disk])?;
        Ok(parse_domblkstat(&out))
    }
}

/// Pick the domain named `wanted`, or else the one whose UUID is `wanted`.
///
/// Each domain is checked by name before its UUID is fetched, so an exact
/// name match never costs a UUID lookup.  UUIDs compare case-insensitively.
fn resolve<F>(names: &[String], mut uuid_of: F, wanted: &str) -> Result<String>
    where F: FnMut(&str) -> Result<String>
{
    for name in names {
        if name == wanted || uuid_of(name)?.eq_ignore_ascii_case(wanted) {
            return Ok(name.clone());
        }
    }
    Err(Error::DomainNotFound { domain: wanted.to_string() })
}

fn parse_list(output: &str) -> Vec<String> {
    output.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse the output of `virsh domblkstat <domain> <disk>`.
///
/// Each line looks like `vda rd_req 1234`.  Fields that the hypervisor
/// doesn't report are absent, and read as zero.
fn parse_domblkstat(output: &str) -> CounterSnapshot {
    let mut snap = CounterSnapshot::default();
    for line in output.lines() {
        let mut words = line.split_whitespace();
        let (Some(_dev), Some(field), Some(value)) =
            (words.next(), words.next(), words.next())
        else {
            continue;
        };
        // libvirt uses -1 for unsupported counters
        let value = value.parse::<i64>()
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(0);
        match field {
            "rd_req" => snap.rd_req = value,
            "rd_bytes" => snap.rd_bytes = value,
            "wr_req" => snap.wr_req = value,
            "wr_bytes" => snap.wr_bytes = value,
            "flush_operations" => snap.flush_req = value,
            "rd_total_times" => snap.rd_total_time = value,
            "wr_total_times" => snap.wr_total_time = value,
            "flush_total_times" => snap.flush_total_time = value,
            "errs" => snap.errs = value,
            _ => (),
        }
    }
    snap
}
