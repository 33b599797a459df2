use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use tokio::fs;
use tracing::{debug, info};

use crate::{
    error::ReportError,
    outcome::{GroupResults, TestResult},
    reporter::{DEFAULT_TEST_RESULTS_DIRECTORY, TestReporter},
};

const TAP_VERSION: &str = "TAP version 13";

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Writes one [TAP](https://testanything.org) file per group.
///
/// Files are named after the group, whitespace replaced by `-` and lower cased,
/// so the group `Tash Sultana` ends up in `tash-sultana.tap`.
#[derive(Debug, Clone)]
pub struct TapReporter {
    directory: PathBuf,
}

impl Default for TapReporter {
    fn default() -> Self {
        Self::new(DEFAULT_TEST_RESULTS_DIRECTORY)
    }
}

impl TapReporter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file_name(group: &str) -> String {
        format!("{}.tap", WHITESPACE.replace_all(group, "-").to_lowercase())
    }

    pub fn render(results: &[TestResult]) -> String {
        let mut output = format!("{TAP_VERSION}\n1..{}", results.len());
        for (idx, result) in results.iter().enumerate() {
            let status = match result.status {
                true => "ok",
                false => "not ok",
            };
            output.push_str(&format!("\n{status} {} {}", idx + 1, result.name));
        }
        output
    }

    async fn ensure_directory(&self) -> Result<(), ReportError> {
        match fs::metadata(&self.directory).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(ReportError::NotADirectory {
                path: self.directory.clone(),
            }),
            Err(_) => {
                fs::create_dir_all(&self.directory)
                    .await
                    .map_err(|source| ReportError::CreateDirectory {
                        path: self.directory.clone(),
                        source,
                    })?;
                info!(directory = %self.directory.display(), "created test results directory");
                Ok(())
            }
        }
    }
}

impl TestReporter for TapReporter {
    async fn report(&mut self, groups: &[GroupResults]) -> Result<(), ReportError> {
        info!("writing test results report");
        self.ensure_directory().await?;

        for group in groups {
            if group.is_empty() {
                debug!(group = %group.group, "no test results, skipping group");
                continue;
            }

            let path = self.directory.join(Self::file_name(group.group.as_str()));
            fs::write(&path, Self::render(&group.results))
                .await
                .map_err(|source| ReportError::Write {
                    path: path.clone(),
                    source,
                })?;
        }

        info!("test results report written");
        Ok(())
    }
}
