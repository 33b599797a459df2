use std::{
    cell::RefCell,
    io,
    path::{Path, PathBuf},
    rc::Rc,
    time::Duration,
};

use tokio::sync::oneshot;

use crate::{
    context::{Completion, TestContext},
    formatter::{PlainFormatter, color::SupportsColor},
    options::RunOptions,
    reporter::NoReporter,
    runner::Runner,
};

pub fn test_context(
    name: &'static str,
    group: &'static str,
    snapshots_root: impl AsRef<Path>,
) -> (TestContext, oneshot::Receiver<Completion>) {
    let (tx, rx) = oneshot::channel();
    let ctx = TestContext::new(name, group.into(), snapshots_root.as_ref(), tx);
    (ctx, rx)
}

/// Shared in-memory output target for formatters.
#[derive(Debug, Default, Clone)]
pub struct Buffer(Rc<RefCell<Vec<u8>>>);

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
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

pub fn options(snapshots: impl Into<PathBuf>) -> RunOptions {
    RunOptions::default()
        .with_timeout(Duration::from_secs(10))
        .with_snapshots_directory(snapshots)
}

pub fn runner(options: RunOptions) -> (Runner<NoReporter, PlainFormatter<Buffer>>, Buffer) {
    let buffer = Buffer::default();
    let runner = Runner::new(options)
        .with_reporter(NoReporter)
        .with_formatter(PlainFormatter::default().with_target(buffer.clone()));
    (runner, buffer)
}
