use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors that stop a run before it starts.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to build the async runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("invalid run options: {0}")]
    Options(#[from] serde_json::Error),

    #[error("failed to read run options from {path}: {source}")]
    OptionsFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors of the snapshot store.
///
/// None of these abort a run, they fail the assertion that ran into them.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("could not find snapshot file at path {}", path.display())]
    Missing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("snapshot file at path {} is not valid json: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize snapshot value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("snapshots directory {} is unavailable", path.display())]
    DirectoryUnavailable { path: PathBuf },

    #[error("failed to write snapshot baseline {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors of a [`TestReporter`](crate::reporter::TestReporter).
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("specified path for test results ({}) exists but is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    #[error("failed to create test results directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write test results file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
