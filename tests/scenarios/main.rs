use std::{cell::RefCell, io, path::Path, rc::Rc, time::Duration};

use goodvibes::{
    Registry, RunOptions, RunReport, Runner,
    formatter::{PlainFormatter, color::SupportsColor},
    reporter::NoReporter,
};

mod runs;
mod snapshots;

#[derive(Debug, Default, Clone)]
struct Buffer(Rc<RefCell<Vec<u8>>>);

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(&mut *self.0.borrow_mut(), buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SupportsColor for Buffer {
    fn supports_color(&self) -> bool {
        false
    }
}

impl Buffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

fn options(root: &Path) -> RunOptions {
    RunOptions::default()
        .with_timeout(Duration::from_secs(10))
        .with_snapshots_directory(root.join("__snapshots__"))
        .with_test_results_directory(root.join("test-results"))
}

/// Run `registry` without reporting, returning the report and the formatted summary.
async fn run(registry: &Registry, options: RunOptions) -> (RunReport, String) {
    let buffer = Buffer::default();
    let report = Runner::new(options)
        .with_reporter(NoReporter)
        .with_formatter(PlainFormatter::default().with_target(buffer.clone()))
        .run(registry)
        .await;
    (report, buffer.contents())
}

fn failure_messages(report: &RunReport) -> Vec<String> {
    report
        .results
        .failures()
        .map(|result| result.message.clone().unwrap_or_default())
        .collect()
}
