use std::{
    process::{ExitCode, Termination},
    time::Duration,
};

use crate::outcome::{GroupResults, TestResult};

/// Exit code of a run aborted by the global timeout, regardless of configuration.
pub const TIMEOUT_EXIT_CODE: u8 = 1;

/// Collects the results of every executed group in execution order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResultAggregator {
    groups: Vec<GroupResults>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, results: GroupResults) {
        self.groups.push(results);
    }

    pub fn groups(&self) -> &[GroupResults] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<GroupResults> {
        self.groups
    }

    pub fn results(&self) -> impl Iterator<Item = &TestResult> {
        self.groups.iter().flat_map(|group| group.results.iter())
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.groups.iter().flat_map(|group| group.failures())
    }

    pub fn total_count(&self) -> usize {
        self.groups.iter().map(GroupResults::len).sum()
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    /// `0` if every test passed, `failure_code` otherwise.
    pub fn exit_code(&self, failure_code: u8) -> u8 {
        match self.failed_count() {
            0 => 0,
            _ => failure_code,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Normal,
    /// Only the debug group ran.
    Debug,
    /// The global timeout aborted the run, no results were collected.
    TimedOut,
}

/// The typed result of a run.
///
/// Returning it from `main` exits the process with [`exit_code`](RunReport::exit_code).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct RunReport {
    pub results: ResultAggregator,
    pub duration: Duration,
    pub mode: RunMode,
    pub exit_code: u8,
}

impl RunReport {
    pub fn timed_out(&self) -> bool {
        self.mode == RunMode::TimedOut
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_code)
    }
}

impl Termination for RunReport {
    fn report(self) -> ExitCode {
        self.exit_code()
    }
}
