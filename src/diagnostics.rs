// SPDX-License-Identifier: Apache-2.0

//! Completion reports for probe calls
//!
//! After all probe keys are processed the engine hands a [`ProbeReport`] to
//! its [`ProbeObserver`]. Reports are advisory: they never affect the match
//! output, callers must not branch on them, and their text and timings differ
//! between strategies. Use [`NoopObserver`] to disable them entirely; the
//! engine then skips the clock reads as well.

use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use log::{debug, log_enabled, Level};
use serde::Serialize;

use crate::types::Strategy;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    pub strategy: Strategy,
    pub probe_count: usize,
    pub table_count: usize,
    pub matches: usize,
    /// Wall-clock time of the whole call. Only accelerated strategies report it.
    pub elapsed: Option<Duration>,
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] Probe complete. Total matches: {}",
            self.strategy.label(),
            self.matches
        )?;
        if let Some(elapsed) = self.elapsed {
            write!(f, " in {:.2} ms", elapsed.as_secs_f64() * 1000.0)?;
        }
        Ok(())
    }
}

/// Receives a report after each completed probe call.
pub trait ProbeObserver: Send + Sync {
    fn on_complete(&self, report: &ProbeReport);

    /// Whether reports are wanted at all. When `false` the engine does not
    /// time the call or build a report.
    #[inline]
    fn enabled(&self) -> bool {
        true
    }
}

impl<F> ProbeObserver for F
where
    F: Fn(&ProbeReport) + Send + Sync,
{
    #[inline]
    fn on_complete(&self, report: &ProbeReport) {
        self(report)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProbeObserver for NoopObserver {
    #[inline]
    fn on_complete(&self, _report: &ProbeReport) {}

    #[inline]
    fn enabled(&self) -> bool {
        false
    }
}

/// Emits the report through the `log` facade at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl ProbeObserver for LogObserver {
    fn on_complete(&self, report: &ProbeReport) {
        debug!("{}", report);
    }

    /// Off unless `debug` records would be emitted.
    #[inline]
    fn enabled(&self) -> bool {
        log_enabled!(Level::Debug)
    }
}

/// Prints the report to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutObserver;

impl ProbeObserver for StdoutObserver {
    fn on_complete(&self, report: &ProbeReport) {
        println!("{}", report);
    }
}

/// Keeps every report it receives.
#[derive(Debug, Default)]
pub struct CountingObserver {
    reports: Mutex<Vec<ProbeReport>>,
}

impl CountingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<ProbeReport> {
        match self.reports.lock() {
            Ok(reports) => reports.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn total_matches(&self) -> usize {
        self.reports().iter().map(|r| r.matches).sum()
    }
}

impl ProbeObserver for CountingObserver {
    fn on_complete(&self, report: &ProbeReport) {
        match self.reports.lock() {
            Ok(mut reports) => reports.push(report.clone()),
            Err(poisoned) => poisoned.into_inner().push(report.clone()),
        }
    }
}
