//! Scheduling of groups, hooks and tests.
//!
//! The [`Runner`] walks the groups of a [`Registry`] in registration order and
//! skips groups without tests. For every group it:
//!
//! 1. runs the before hook, if any, and waits for it to finish
//! 2. runs the tests, one after another for sync groups, all at once otherwise
//! 3. runs the after hook, if any, no matter how the tests went
//!
//! Everything runs on a single thread inside a [`LocalSet`]. Each hook and test
//! body is spawned as a local task ("dispatch") and the runner then waits for
//! its context to signal completion ("settle"). Concurrent groups dispatch every
//! test before settling the first one, so bodies interleave at their await
//! points while results keep registration order.
//!
//! If the debug group has tests, only that group runs and the run always fails.
//!
//! The whole run is bounded by the configured timeout. When it elapses every
//! body still in flight is dropped, no summary is written, no reporter is called,
//! and the report carries [`TIMEOUT_EXIT_CODE`].

use std::{
    any::Any,
    borrow::Cow,
    io,
    time::Instant,
};

use tokio::{
    sync::oneshot,
    task::{self, JoinHandle, LocalSet},
    time,
};
use tracing::{error, info, warn};

use crate::{
    context::{Completion, HookContext, TestContext},
    formatter::{FmtConclusion, FmtTimeout, PlainFormatter, RunFormatter},
    group::{DEBUG_GROUP, Group, GroupName, Registry},
    options::RunOptions,
    outcome::{GroupResults, TestResult},
    report::{ResultAggregator, RunMode, RunReport, TIMEOUT_EXIT_CODE},
    reporter::{TapReporter, TestReporter},
    test::{HookFnHandle, Test},
};

#[derive(Debug)]
pub struct Runner<Reporter = TapReporter, Formatter = PlainFormatter<io::Stdout>> {
    options: RunOptions,
    reporter: Reporter,
    formatter: Formatter,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(RunOptions::default())
    }
}

impl Runner {
    /// A runner writing its summary to stdout and TAP files to the configured results directory.
    pub fn new(options: RunOptions) -> Self {
        let reporter = TapReporter::new(&options.test_results_directory);
        Self {
            options,
            reporter,
            formatter: PlainFormatter::default(),
        }
    }
}

impl<Reporter, Formatter> Runner<Reporter, Formatter> {
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn with_reporter<WithReporter: TestReporter>(
        self,
        reporter: WithReporter,
    ) -> Runner<WithReporter, Formatter> {
        Runner {
            options: self.options,
            reporter,
            formatter: self.formatter,
        }
    }

    pub fn with_formatter<WithFormatter: RunFormatter>(
        self,
        formatter: WithFormatter,
    ) -> Runner<Reporter, WithFormatter> {
        Runner {
            options: self.options,
            reporter: self.reporter,
            formatter,
        }
    }
}

impl<Reporter: TestReporter, Formatter: RunFormatter> Runner<Reporter, Formatter> {
    pub async fn run(mut self, registry: &Registry) -> RunReport {
        let now = Instant::now();

        let local = LocalSet::new();
        let outcome = time::timeout(
            self.options.timeout,
            local.run_until(run_groups(&self.options, registry)),
        )
        .await;
        // cancels bodies that are still in flight
        drop(local);
        let duration = now.elapsed();

        let Ok((results, selection)) = outcome else {
            let timeout = self.options.timeout;
            error!(
                "global test timeout exceeded {} seconds, aborting run",
                timeout.as_secs_f64()
            );
            if let Err(err) = self.formatter.fmt_timeout(FmtTimeout { timeout }) {
                warn!("failed to format timeout: {err}");
            }
            return RunReport {
                results: ResultAggregator::new(),
                duration,
                mode: RunMode::TimedOut,
                exit_code: TIMEOUT_EXIT_CODE,
            };
        };

        let conclusion = FmtConclusion {
            results: &results,
            duration,
        };
        let (mode, exit_code) = match selection {
            Selection::DebugOnly => {
                if let Err(err) = self.formatter.fmt_debug_mode(conclusion) {
                    warn!("failed to format debug notice: {err}");
                }
                (RunMode::Debug, self.options.return_code_on_failure)
            }
            Selection::All => {
                if let Err(err) = self.formatter.fmt_conclusion(conclusion) {
                    warn!("failed to format conclusion: {err}");
                }
                if self.options.report_test_results
                    && let Err(err) = self.reporter.report(results.groups()).await
                {
                    error!("failed to report test results: {err}");
                }
                (
                    RunMode::Normal,
                    results.exit_code(self.options.return_code_on_failure),
                )
            }
        };

        RunReport {
            results,
            duration,
            mode,
            exit_code,
        }
    }
}

/// Which groups a completed run executed.
enum Selection {
    All,
    DebugOnly,
}

async fn run_groups(options: &RunOptions, registry: &Registry) -> (ResultAggregator, Selection) {
    let mut results = ResultAggregator::new();

    let debug = GroupName::debug();
    if let Some(group) = registry.get(&debug).filter(|group| !group.is_empty()) {
        warn!("running in debug mode, only tests of the {DEBUG_GROUP} group run");
        results.add(run_group(options, &debug, group).await);
        return (results, Selection::DebugOnly);
    }

    for (name, group) in registry.groups() {
        if group.is_empty() {
            continue;
        }
        results.add(run_group(options, name, group).await);
    }
    (results, Selection::All)
}

async fn run_group(options: &RunOptions, name: &GroupName, group: &Group) -> GroupResults {
    let tests = group.tests();
    match group.is_sync() {
        true => info!("Running {} tests from {name} group in synchronous mode", tests.len()),
        false => info!("Running {} tests from {name} group", tests.len()),
    }

    if let Some(before) = group.before() {
        run_hook(before, "Before").await;
    }

    let mut results = Vec::with_capacity(tests.len());
    match group.is_sync() {
        true => {
            for test in tests {
                results.push(dispatch_test(options, test).settle().await);
            }
        }
        false => {
            let pending: Vec<_> = tests
                .iter()
                .map(|test| dispatch_test(options, test))
                .collect();
            for test in pending {
                results.push(test.settle().await);
            }
        }
    }

    if let Some(after) = group.after() {
        run_hook(after, "After").await;
    }

    info!("Finished running {} tests from {name} group", tests.len());
    GroupResults {
        group: name.clone(),
        results,
    }
}

/// A test whose body was spawned but whose completion was not awaited yet.
struct PendingTest {
    name: Cow<'static, str>,
    group: GroupName,
    started: Instant,
    completion: oneshot::Receiver<Completion>,
    task: JoinHandle<()>,
}

fn dispatch_test(options: &RunOptions, test: &Test) -> PendingTest {
    info!("Running: {}", test.name);
    let (tx, rx) = oneshot::channel();
    let ctx = TestContext::new(
        test.name.clone(),
        test.group.clone(),
        &options.snapshots_directory,
        tx,
    );
    let function = test.function().clone();
    let task = task::spawn_local(async move { function.call(ctx).await });

    PendingTest {
        name: test.name.clone(),
        group: test.group.clone(),
        started: Instant::now(),
        completion: rx,
        task,
    }
}

impl PendingTest {
    async fn settle(self) -> TestResult {
        let Completion { passed, message } = match await_completion(self.completion, self.task).await {
            Ok(completion) => completion,
            Err(message) => Completion {
                passed: false,
                message: Some(message),
            },
        };

        let duration = self.started.elapsed();
        info!(
            "Finished: {} [{} in {:.3} seconds]",
            self.name,
            match passed {
                true => "PASSED",
                false => "FAILED",
            },
            duration.as_secs_f64()
        );

        TestResult {
            name: self.name,
            group: self.group,
            status: passed,
            message,
            duration,
        }
    }
}

async fn run_hook(hook: &HookFnHandle, name: &'static str) -> bool {
    info!("Running: {name} hook");
    let started = Instant::now();

    let (tx, rx) = oneshot::channel();
    let function = hook.clone();
    let task = task::spawn_local(async move { function.call(HookContext::new(name, tx)).await });
    let passed = match await_completion(rx, task).await {
        Ok(passed) => passed,
        Err(message) => {
            warn!("{name} hook failed: {message}");
            false
        }
    };

    info!(
        "Finished: {name} hook in {:.3} seconds",
        started.elapsed().as_secs_f64()
    );
    passed
}

/// Wait for a context to signal completion.
///
/// If the context was dropped without signaling, the body either returned
/// early or panicked, the error explains which.
async fn await_completion<T>(
    completion: oneshot::Receiver<T>,
    task: JoinHandle<()>,
) -> Result<T, String> {
    match completion.await {
        Ok(value) => Ok(value),
        Err(_) => match task.await {
            Ok(()) => Err(String::from("finished without calling done")),
            Err(err) if err.is_panic() => Err(payload_as_string(err.into_panic())),
            Err(err) => Err(err.to_string()),
        },
    }
}

/// Convert a panic payload into a string.
///
/// This matches the common payload types produced by `panic!` (`&'static str` and `String`).
fn payload_as_string(err: Box<dyn Any + Send + 'static>) -> String {
    err.downcast::<&'static str>()
        .map(|s| s.to_string())
        .or_else(|err| err.downcast::<String>().map(|s| *s))
        .unwrap_or_else(|_| String::from("Box<dyn Any>"))
}
