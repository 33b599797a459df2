//! Per invocation handles passed into hooks and tests.
//!
//! Every hook and test body receives a fresh context. A test context folds each
//! assertion into its [`AssertionStatus`] and reports the final status when the
//! body calls [`done`](TestContext::done). `done` consumes the context, so a
//! context can never be used after completion was signaled.
//!
//! A context dropped without calling `done` (for example because the body
//! returned early or panicked) closes its completion channel and the runner
//! settles the invocation as failed.

use std::{
    borrow::Cow,
    fmt::{Debug, Display},
    path::Path,
};

use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::{
    group::GroupName,
    outcome::AssertionStatus,
    snapshot::{SnapshotStore, SnapshotVerdict, compare, render_diff},
};

/// What a test context reports on [`done`](TestContext::done).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Completion {
    pub passed: bool,
    pub message: Option<String>,
}

fn log(name: &str, message: impl Display) {
    info!("{name}: {message}");
}

/// Context handed to before and after hooks.
///
/// Hooks are not part of the pass/fail accounting, they only log and signal completion.
#[derive(Debug)]
pub struct HookContext {
    name: Cow<'static, str>,
    resolve: oneshot::Sender<bool>,
}

impl HookContext {
    pub(crate) fn new(name: impl Into<Cow<'static, str>>, resolve: oneshot::Sender<bool>) -> Self {
        Self {
            name: name.into(),
            resolve,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn log(&self, message: impl Display) {
        log(&self.name, message);
    }

    pub fn done(self) {
        // The runner may already have given up on this hook.
        let _ = self.resolve.send(true);
    }
}

/// Context handed to a single test.
#[derive(Debug)]
pub struct TestContext {
    name: Cow<'static, str>,
    group: GroupName,
    status: AssertionStatus,
    message: Option<String>,
    snapshots: SnapshotStore,
    resolve: oneshot::Sender<Completion>,
}

impl TestContext {
    pub(crate) fn new(
        name: impl Into<Cow<'static, str>>,
        group: GroupName,
        snapshots_root: &Path,
        resolve: oneshot::Sender<Completion>,
    ) -> Self {
        let snapshots = SnapshotStore::new(snapshots_root, &group);
        Self {
            name: name.into(),
            group,
            status: AssertionStatus::default(),
            message: None,
            snapshots,
            resolve,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> &GroupName {
        &self.group
    }

    pub fn status(&self) -> AssertionStatus {
        self.status
    }

    /// The first failure message recorded by this context.
    pub fn failure_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn log(&self, message: impl Display) {
        log(&self.name, message);
    }

    /// Deep equality assertion, decided by `==`.
    ///
    /// Collections compare the way their `PartialEq` does: maps regardless of
    /// insertion order, sequences element by element. The failure message shows
    /// both values in their `Debug` form.
    pub fn check<T: PartialEq + Debug>(mut self, expected: T, actual: T) -> Self {
        match expected == actual {
            true => self.pass(),
            false => self.fail(format!("Expected {expected:?} to match {actual:?}")),
        }
        self
    }

    /// Compare `actual` with its stored baseline, or store it as the new baseline if `rebase` is set.
    ///
    /// A rebase always fails the test, so a rebase flag left on by accident cannot pass in CI.
    pub async fn snapshot<T: Serialize>(
        mut self,
        assertion_name: &str,
        actual: T,
        rebase: bool,
    ) -> Self {
        match rebase {
            true => self.rebase(assertion_name, &actual).await,
            false => self.verify(assertion_name, &actual).await,
        }
        self
    }

    async fn rebase<T: Serialize>(&mut self, assertion_name: &str, actual: &T) {
        match self
            .snapshots
            .write_baseline(&self.name, assertion_name, actual)
            .await
        {
            Ok(path) => self.log(format_args!(
                "Wrote snapshot baseline for {assertion_name} to {}",
                path.display()
            )),
            Err(err) => warn!("{}: {err}", self.name),
        }
        self.fail(format!(
            "Rebased snapshot {assertion_name}, failing in case the rebase flag was set by mistake"
        ));
    }

    async fn verify<T: Serialize>(&mut self, assertion_name: &str, actual: &T) {
        let actual = match serde_json::to_value(actual) {
            Ok(actual) => actual,
            Err(err) => return self.fail(format!("Could not serialize snapshot value: {err}")),
        };

        let baseline = match self.snapshots.read_baseline(&self.name, assertion_name).await {
            Ok(baseline) => baseline,
            Err(err) => return self.fail(err.to_string()),
        };

        match compare(&baseline, &actual) {
            SnapshotVerdict::Match => self.pass(),
            SnapshotVerdict::EmptyBaseline => self.fail(format!(
                "Snapshot {assertion_name} has an empty baseline, run it with rebase set to generate one"
            )),
            SnapshotVerdict::Mismatch(segments) => {
                warn!(
                    "{}: snapshot {assertion_name} differs from its baseline\n{}",
                    self.name,
                    render_diff(&segments)
                );
                self.fail(format!("Snapshot {assertion_name} differs from its baseline"));
            }
        }
    }

    fn pass(&mut self) {
        self.status = self.status.record(true);
    }

    fn fail(&mut self, message: String) {
        warn!("{}: {message}", self.name);
        self.status = self.status.record(false);
        self.message.get_or_insert(message);
    }

    /// Finish the test, a test passes unless an assertion failed.
    ///
    /// Dropping the context without calling `done` does not hang the run: the
    /// test settles as failed with "finished without calling done".
    pub fn done(self) {
        let completion = Completion {
            passed: self.status.is_good(),
            message: self.message,
        };
        // The runner may already have given up on this test.
        let _ = self.resolve.send(completion);
    }
}
