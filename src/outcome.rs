use std::{borrow::Cow, time::Duration};

use crate::group::GroupName;

/// The assertion register of a single [`TestContext`](crate::context::TestContext).
///
/// Every context starts out as [`Passthrough`](AssertionStatus::Passthrough).
/// Each assertion folds its own result into the register via
/// [`record`](AssertionStatus::record), and [`Failed`](AssertionStatus::Failed)
/// is absorbing: once an assertion failed, later passing assertions keep it failed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AssertionStatus {
    /// No assertion was made yet.
    #[default]
    Passthrough,
    Failed,
    Passed,
}

impl AssertionStatus {
    /// Fold the result of one assertion into the register.
    #[must_use]
    pub fn record(self, passed: bool) -> Self {
        match (self, passed) {
            (AssertionStatus::Failed, _) | (_, false) => AssertionStatus::Failed,
            (AssertionStatus::Passthrough | AssertionStatus::Passed, true) => {
                AssertionStatus::Passed
            }
        }
    }

    /// Whether a context with this status counts as a passing test.
    ///
    /// A context that never asserted anything passes.
    pub fn is_good(&self) -> bool {
        matches!(
            self,
            AssertionStatus::Passthrough | AssertionStatus::Passed
        )
    }

    pub fn is_bad(&self) -> bool {
        matches!(self, AssertionStatus::Failed)
    }
}

/// The final, immutable record of one executed test.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TestResult {
    pub name: Cow<'static, str>,
    pub group: GroupName,
    pub status: bool,
    pub message: Option<String>,
    pub duration: Duration,
}

impl TestResult {
    pub fn passed(&self) -> bool {
        self.status
    }

    pub fn failed(&self) -> bool {
        !self.status
    }
}

/// All results of one group, in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupResults {
    pub group: GroupName,
    pub results: Vec<TestResult>,
}

impl GroupResults {
    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|result| result.failed())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
