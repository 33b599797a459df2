pub mod context;
pub mod formatter;
pub mod group;
pub mod outcome;
pub mod reporter;
pub mod snapshot;

mod error;
pub use error::*;

mod logging;
pub use logging::*;

mod options;
pub use options::*;

mod report;
pub use report::*;

mod runner;
pub use runner::*;

mod watchdog;
pub use watchdog::*;

#[cfg(test)]
mod test_support;

pub use context::{HookContext, TestContext};
pub use group::{DEBUG_GROUP, DEFAULT_GROUP, GroupHandle, GroupName, Registry};

/// Run every registered test to completion on the current thread.
///
/// Installs the default logging subscriber, arms a [`Watchdog`] that terminates
/// the process once `options.timeout` elapses and drives a [`Runner`] writing
/// its summary to stdout and TAP files to the configured results directory.
///
/// ```no_run
/// use goodvibes::{Registry, RunOptions, RunReport};
///
/// fn main() -> Result<RunReport, goodvibes::Error> {
///     let mut registry = Registry::new();
///     registry.test("add", |ctx| async move { ctx.check(4, 2 + 2).done() });
///     goodvibes::run(&registry, RunOptions::default())
/// }
/// ```
pub fn run(registry: &Registry, options: RunOptions) -> Result<RunReport, Error> {
    init_logging();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(Error::Runtime)?;

    let watchdog = Watchdog::terminate_process(options.timeout);
    let report = runtime.block_on(Runner::new(options).run(registry));
    watchdog.disarm();

    Ok(report)
}
