//! Result reporters.
//!
//! A reporter receives the results of every executed group after a normal run
//! and persists them somewhere. The runner awaits the reporter before it
//! returns, so report files are complete once the process exits.

use std::future::Future;

use crate::{error::ReportError, outcome::GroupResults};

mod tap;
pub use tap::*;

/// Directory for report files when none is configured.
pub const DEFAULT_TEST_RESULTS_DIRECTORY: &str = "test-results";

pub trait TestReporter {
    fn report(&mut self, groups: &[GroupResults]) -> impl Future<Output = Result<(), ReportError>>;
}

/// A reporter that writes nothing.
#[derive(Debug, Default, Clone)]
pub struct NoReporter;

impl TestReporter for NoReporter {
    async fn report(&mut self, _: &[GroupResults]) -> Result<(), ReportError> {
        Ok(())
    }
}
