use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Deserializer};

use crate::{error::Error, reporter::DEFAULT_TEST_RESULTS_DIRECTORY, snapshot::DEFAULT_SNAPSHOTS_DIRECTORY};

/// Default duration of the global watchdog.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Exit code of a failed run unless configured otherwise.
pub const DEFAULT_RETURN_CODE_ON_FAILURE: u8 = 1;

/// Options of a run.
///
/// Can be built with the `with_*` methods or deserialized from JSON using
/// camelCase keys, the timeout given in milliseconds:
///
/// ```json
/// { "timeout": 1000, "snapshotsDirectory": "snapshots", "returnCodeOnFailure": 2 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct RunOptions {
    #[serde(deserialize_with = "millis")]
    pub timeout: Duration,
    pub snapshots_directory: PathBuf,
    pub return_code_on_failure: u8,
    pub report_test_results: bool,
    pub test_results_directory: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            snapshots_directory: PathBuf::from(DEFAULT_SNAPSHOTS_DIRECTORY),
            return_code_on_failure: DEFAULT_RETURN_CODE_ON_FAILURE,
            report_test_results: false,
            test_results_directory: PathBuf::from(DEFAULT_TEST_RESULTS_DIRECTORY),
        }
    }
}

fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| Error::OptionsFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }

    pub fn with_snapshots_directory(self, snapshots_directory: impl Into<PathBuf>) -> Self {
        Self {
            snapshots_directory: snapshots_directory.into(),
            ..self
        }
    }

    pub fn with_return_code_on_failure(self, return_code_on_failure: u8) -> Self {
        Self {
            return_code_on_failure,
            ..self
        }
    }

    pub fn with_report_test_results(self, report_test_results: bool) -> Self {
        Self {
            report_test_results,
            ..self
        }
    }

    pub fn with_test_results_directory(self, test_results_directory: impl Into<PathBuf>) -> Self {
        Self {
            test_results_directory: test_results_directory.into(),
            ..self
        }
    }
}
