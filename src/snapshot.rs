//! Snapshot baselines.
//!
//! A baseline is the JSON form of a value, stored at
//! `<root>/<group>/<test>_<assertion>.json`. Baselines are only written when a
//! rebase is requested, every other snapshot assertion reads and compares.
//!
//! Comparison renders both sides as pretty JSON with sorted object keys and
//! diffs them line by line, so key order never matters but sequence order does.

use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
};

use difference::{Changeset, Difference};
use serde::Serialize;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::{error::SnapshotError, group::GroupName};

/// Root directory for baselines when none is configured.
pub const DEFAULT_SNAPSHOTS_DIRECTORY: &str = "./test/__snapshots__";

/// Initialization state of a snapshot directory.
///
/// Leaves [`Pending`](DirectoryState::Pending) at most once. A failed
/// initialization is never retried.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryState {
    #[default]
    Pending,
    Ready,
    Failed,
}

/// Per context access to the baselines of one group.
#[derive(Debug)]
pub struct SnapshotStore {
    directory: PathBuf,
    state: DirectoryState,
    probes: usize,
}

impl SnapshotStore {
    pub fn new(root: impl AsRef<Path>, group: &GroupName) -> Self {
        Self {
            directory: root.as_ref().join(group.as_str()),
            state: DirectoryState::Pending,
            probes: 0,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn state(&self) -> DirectoryState {
        self.state
    }

    /// How often the filesystem was consulted to initialize the directory.
    pub fn probes(&self) -> usize {
        self.probes
    }

    pub fn path(&self, test_name: &str, assertion_name: &str) -> PathBuf {
        self.directory
            .join(format!("{test_name}_{assertion_name}.json"))
    }

    /// Make sure the directory exists, creating it recursively if needed.
    pub async fn ensure_directory(&mut self) -> DirectoryState {
        match self.state {
            DirectoryState::Ready => return DirectoryState::Ready,
            DirectoryState::Failed => {
                debug!(
                    directory = %self.directory.display(),
                    "snapshots directory failed to initialize before, will not retry"
                );
                return DirectoryState::Failed;
            }
            DirectoryState::Pending => (),
        }

        self.probes += 1;
        self.state = match fs::metadata(&self.directory).await {
            Ok(meta) if meta.is_dir() => DirectoryState::Ready,
            Ok(_) => {
                warn!(
                    directory = %self.directory.display(),
                    "path for snapshots exists but is not a directory"
                );
                DirectoryState::Failed
            }
            Err(_) => match fs::create_dir_all(&self.directory).await {
                Ok(()) => {
                    info!(directory = %self.directory.display(), "created snapshots directory");
                    DirectoryState::Ready
                }
                Err(err) => {
                    warn!(
                        directory = %self.directory.display(),
                        "failed to create snapshots directory: {err}"
                    );
                    DirectoryState::Failed
                }
            },
        };
        self.state
    }

    /// Serialize `value` and store it as the new baseline.
    pub async fn write_baseline<T: Serialize + ?Sized>(
        &mut self,
        test_name: &str,
        assertion_name: &str,
        value: &T,
    ) -> Result<PathBuf, SnapshotError> {
        let contents = serde_json::to_string(value)?;
        if self.ensure_directory().await == DirectoryState::Failed {
            return Err(SnapshotError::DirectoryUnavailable {
                path: self.directory.clone(),
            });
        }

        let path = self.path(test_name, assertion_name);
        fs::write(&path, contents)
            .await
            .map_err(|source| SnapshotError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    pub async fn read_baseline(
        &self,
        test_name: &str,
        assertion_name: &str,
    ) -> Result<Baseline, SnapshotError> {
        let path = self.path(test_name, assertion_name);
        let data = match fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(source) => return Err(SnapshotError::Missing { path, source }),
        };

        if data.trim().is_empty() {
            return Ok(Baseline::Empty);
        }

        serde_json::from_str(&data)
            .map(Baseline::Value)
            .map_err(|source| SnapshotError::Unreadable { path, source })
    }
}

/// A stored baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum Baseline {
    /// The file exists but holds nothing.
    Empty,
    Value(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentTag {
    Unchanged,
    Added,
    Removed,
}

/// One segment of a line diff between a baseline and a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSegment {
    pub tag: SegmentTag,
    pub value: String,
}

impl Display for DiffSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.tag {
            SegmentTag::Unchanged => ' ',
            SegmentTag::Added => '+',
            SegmentTag::Removed => '-',
        };
        for (idx, line) in self.value.lines().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{prefix}{line}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotVerdict {
    Match,
    /// The baseline is empty or falsy, it needs a rebase first.
    EmptyBaseline,
    Mismatch(Vec<DiffSegment>),
}

impl SnapshotVerdict {
    pub fn passed(&self) -> bool {
        matches!(self, SnapshotVerdict::Match)
    }
}

/// Compare a candidate value against a stored baseline.
pub fn compare(baseline: &Baseline, actual: &Value) -> SnapshotVerdict {
    let baseline = match baseline {
        Baseline::Empty => return SnapshotVerdict::EmptyBaseline,
        Baseline::Value(value) => value,
    };

    let segments = diff(baseline, actual);
    if segments
        .iter()
        .all(|segment| segment.tag == SegmentTag::Unchanged)
    {
        return SnapshotVerdict::Match;
    }

    match is_falsy(baseline) {
        true => SnapshotVerdict::EmptyBaseline,
        false => SnapshotVerdict::Mismatch(segments),
    }
}

/// Line diff of the pretty JSON renderings, additions are lines only in `actual`.
pub fn diff(baseline: &Value, actual: &Value) -> Vec<DiffSegment> {
    let changeset = Changeset::new(&format!("{baseline:#}"), &format!("{actual:#}"), "\n");
    changeset
        .diffs
        .into_iter()
        .map(|difference| match difference {
            Difference::Same(value) => DiffSegment {
                tag: SegmentTag::Unchanged,
                value,
            },
            Difference::Add(value) => DiffSegment {
                tag: SegmentTag::Added,
                value,
            },
            Difference::Rem(value) => DiffSegment {
                tag: SegmentTag::Removed,
                value,
            },
        })
        .collect()
}

/// Render diff segments as `+`, `-` and space prefixed lines.
pub fn render_diff(segments: &[DiffSegment]) -> String {
    segments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
