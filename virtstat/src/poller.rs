// vim: tw=80
use std::{io::Write, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use log::debug;
use virt_blkstat::{BlockStats, RateSample, Sampler};

use crate::{config::Config, output};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    Idle,
    Running,
    Completed,
    Aborted,
}

impl State {
    fn advance(&mut self, next: State) {
        debug!("polling loop: {:?} -> {:?}", self, next);
        *self = next;
    }
}

/// Drives the sample, compute, report, sleep cycle.
pub struct Poller<'a, S: ?Sized> {
    config: &'a Config,
    source: &'a S,
    sampler: Sampler,
    state: State,
}

impl<'a, S: BlockStats + ?Sized> Poller<'a, S> {
    pub fn new(config: &'a Config, sampler: Sampler, source: &'a S) -> Self {
        Poller { config, source, sampler, state: State::Idle }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Report `config.count` times, sleeping between reports.
    ///
    /// A failed tick ends the run at once, without printing anything for
    /// that tick.
    pub fn run<W, F>(&mut self, out: &mut W, mut sleep: F) -> Result<()>
        where W: Write,
              F: FnMut(Duration)
    {
        let interval = self.config.interval;
        self.state.advance(State::Running);
        for i in 0..self.config.count {
            let deltas = match self.sampler.tick(self.source) {
                Ok(deltas) => deltas,
                Err(e) => {
                    self.state.advance(State::Aborted);
                    return Err(e.into());
                }
            };
            let rows = deltas.into_iter()
                .map(|(disk, delta)| {
                    (disk.name.as_str(), RateSample::compute(&delta, interval))
                });
            output::write_report(out, &Local::now(), rows)
                .and_then(|_| out.flush())
                .context("cannot write report")?;
            if i + 1 < self.config.count {
                sleep(self.config.interval_duration());
            }
        }
        self.state.advance(State::Completed);
        Ok(())
    }
}
