//! The hard global timeout.
//!
//! The runner already aborts cooperatively when its timeout elapses, but that
//! requires the single runtime thread to make progress. A body that blocks the
//! thread would starve the timer, so [`run`](crate::run) additionally arms a
//! [`Watchdog`] on its own thread that kills the process without any cleanup.

use std::{
    process,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{RecvTimeoutError, Sender};
use tracing::error;

use crate::report::TIMEOUT_EXIT_CODE;

/// A timer running `on_expire` unless it is disarmed or dropped in time.
#[derive(Debug)]
pub struct Watchdog {
    disarm: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Watchdog {
    pub fn arm<F>(timeout: Duration, on_expire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded::<()>(1);
        let thread = thread::spawn(move || match rx.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => on_expire(),
            // disarmed or dropped
            Ok(()) | Err(RecvTimeoutError::Disconnected) => (),
        });

        Self {
            disarm: Some(tx),
            thread: Some(thread),
        }
    }

    /// Arm a watchdog that terminates the process with [`TIMEOUT_EXIT_CODE`].
    pub fn terminate_process(timeout: Duration) -> Self {
        Self::arm(timeout, move || {
            error!(
                "global test timeout exceeded {} seconds, exiting",
                timeout.as_secs_f64()
            );
            process::exit(TIMEOUT_EXIT_CODE.into());
        })
    }

    /// Cancel the watchdog and wait for its thread to finish.
    pub fn disarm(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(tx) = self.disarm.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.stop();
    }
}
