// vim: tw=80
use std::{num::NonZeroU64, time::Duration};

use virt_blkstat::{DiskFilter, Error, InvalidValue, Result};

use crate::Cli;

/// Number of reports printed when no count is given
pub const DEFAULT_COUNT: u64 = 999_999;

/// Everything a run needs to know, validated once at startup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub uri: String,
    pub domain: String,
    pub interval: NonZeroU64,
    pub count: u64,
    pub filter: DiskFilter,
}

impl Config {
    pub fn interval_duration(&self) -> Duration {
        Duration::from_secs(self.interval.get())
    }
}

impl TryFrom<Cli> for Config {
    type Error = Error;

    fn try_from(cli: Cli) -> Result<Self> {
        let interval = parse_interval(cli.interval.as_deref())?;
        let count = parse_count(cli.count.as_deref())?;
        Ok(Config {
            uri: cli.connect,
            domain: cli.domain,
            interval,
            count,
            filter: DiskFilter::from(cli.disk.as_str()),
        })
    }
}

fn parse_int(name: &'static str, value: &str) -> Result<i64> {
    value.parse::<i64>()
        .map_err(|e| invalid(name, value, e.into()))
}

fn invalid(name: &'static str, value: &str, source: InvalidValue) -> Error {
    Error::InvalidArgument { name, value: value.to_string(), source }
}

fn parse_interval(value: Option<&str>) -> Result<NonZeroU64> {
    let Some(value) = value else {
        return Ok(NonZeroU64::MIN);
    };
    let secs = parse_int("interval", value)?;
    u64::try_from(secs)
        .ok()
        .and_then(NonZeroU64::new)
        .ok_or_else(|| invalid("interval", value, InvalidValue::NotPositive))
}

fn parse_count(value: Option<&str>) -> Result<u64> {
    let Some(value) = value else {
        return Ok(DEFAULT_COUNT);
    };
    match parse_int("count", value)? {
        0 => Ok(DEFAULT_COUNT),
        n => u64::try_from(n)
            .map_err(|_| invalid("count", value, InvalidValue::Negative)),
    }
}
