//! Console output of a run.
//!
//! A [`RunFormatter`] receives the final events of a run: the conclusion of a
//! normal run, the notice of a debug run, or the timeout of an aborted run.
//! Per test progress is emitted through `tracing` by the runner itself.
//!
//! Formatter errors never fail a run, the runner logs and ignores them.

use std::{fmt::Display, time::Duration};

use crate::report::ResultAggregator;

pub mod color;

mod plain;
pub use plain::*;

mod no;
pub use no::*;

/// Data of a finished run.
#[derive(Debug, Clone, Copy)]
pub struct FmtConclusion<'r> {
    pub results: &'r ResultAggregator,
    pub duration: Duration,
}

/// Data of a run that exceeded its global timeout.
#[derive(Debug, Clone, Copy)]
pub struct FmtTimeout {
    pub timeout: Duration,
}

pub trait RunFormatter {
    type Error: Display;

    /// Called after a normal run finished.
    fn fmt_conclusion(&mut self, data: FmtConclusion<'_>) -> Result<(), Self::Error>;

    /// Called after a debug run finished instead of [`fmt_conclusion`](RunFormatter::fmt_conclusion).
    fn fmt_debug_mode(&mut self, data: FmtConclusion<'_>) -> Result<(), Self::Error> {
        let _ = data;
        Ok(())
    }

    /// Called when the global timeout aborted the run. No conclusion follows.
    fn fmt_timeout(&mut self, data: FmtTimeout) -> Result<(), Self::Error> {
        let _ = data;
        Ok(())
    }
}
