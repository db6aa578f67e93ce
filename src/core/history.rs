//! Deployment history: enumerating environment snapshots, selecting
//! one to activate, and marking superseded snapshots defective.
//!
//! A snapshot is one `env_<timestamp>.env` file. Within a directory the
//! fixed-width timestamp makes lexicographic order equal chronological
//! order, so listing sorts by the embedded timestamp string, descending.
//! Index 0 is always the most recent snapshot.

use std::path::{Path, PathBuf};

use crate::artifact::{self, SNAPSHOT_PREFIX, SNAPSHOT_SUFFIX};
use crate::error::Error;
use crate::local_files::FileSystem;
use crate::report;
use crate::reporter::Reporter;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotStatus {
    Active,
    Defective,
}

/// One environment snapshot in the artifact directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub path: PathBuf,
    pub timestamp: String,
    pub status: SnapshotStatus,
}

impl Snapshot {
    /// Parse an active snapshot from its path. Defective files carry an
    /// extra suffix and do not match, so they never re-enter selection.
    fn from_path(path: PathBuf) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let timestamp = name
            .strip_prefix(SNAPSHOT_PREFIX)?
            .strip_suffix(SNAPSHOT_SUFFIX)?;
        if timestamp.is_empty() {
            return None;
        }

        Some(Snapshot {
            timestamp: timestamp.to_string(),
            path,
            status: SnapshotStatus::Active,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// How the deploy pipeline picks a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Select by position, 0 = latest. Defect state is untouched.
    Index(usize),
    /// Mark everything strictly newer than `index` defective, then
    /// select the snapshot at `index`.
    Rollback { index: usize, reason: String },
    /// Select an exact file name in the artifact directory, bypassing
    /// indexing and defect state entirely.
    File(String),
}

/// Result of a selection: the env file to deploy and whatever was
/// marked defective on the way there.
#[derive(Debug)]
pub struct SelectionOutcome {
    pub env_file: PathBuf,
    pub marked_defective: Vec<Snapshot>,
}

/// Enumerate active snapshots in a directory, newest first.
pub fn list_snapshots(fs: &dyn FileSystem, env_dir: &Path) -> Result<Vec<Snapshot>> {
    let mut snapshots: Vec<Snapshot> = fs
        .list(env_dir)?
        .into_iter()
        .filter(|entry| !entry.is_dir)
        .filter_map(|entry| Snapshot::from_path(entry.path))
        .collect();

    snapshots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(snapshots)
}

/// Resolve a selection against the artifact directory.
///
/// Rollback bounds are checked before anything is marked, so an
/// out-of-range index leaves the directory untouched. Marking proceeds
/// from newest to oldest; a failure partway leaves a consistent prefix
/// of already-marked snapshots rather than gaps.
pub fn select_snapshot(
    fs: &dyn FileSystem,
    reporter: &dyn Reporter,
    env_dir: &Path,
    selection: &Selection,
    now: &str,
    dry_run: bool,
) -> Result<SelectionOutcome> {
    let (index, rollback_reason) = match selection {
        Selection::File(name) => {
            let path = env_dir.join(name);
            if !fs.exists(&path) {
                return Err(Error::selection(format!(
                    "Specified env file does not exist: {}",
                    path.display()
                )));
            }
            return Ok(SelectionOutcome {
                env_file: path,
                marked_defective: Vec::new(),
            });
        }
        Selection::Index(index) => (*index, None),
        Selection::Rollback { index, reason } => (*index, Some(reason.as_str())),
    };

    let snapshots = list_snapshots(fs, env_dir)?;
    if snapshots.is_empty() {
        return Err(Error::selection(format!(
            "No env files in {}",
            env_dir.display()
        )));
    }

    if index >= snapshots.len() {
        return Err(Error::selection(format!(
            "Invalid deployment index {} (have {} snapshots)",
            index,
            snapshots.len()
        )));
    }

    let mut marked_defective = Vec::with_capacity(index);
    if let Some(reason) = rollback_reason {
        for snapshot in &snapshots[..index] {
            marked_defective.push(mark_defective(fs, reporter, snapshot, reason, now, dry_run)?);
        }
    }

    Ok(SelectionOutcome {
        env_file: snapshots[index].path.clone(),
        marked_defective,
    })
}

/// Transition one snapshot from active to defective.
///
/// The env file is renamed with a `.defect` suffix (retained for audit,
/// never deleted), then the paired report is annotated and retired. A
/// missing or malformed report downgrades to a log line. Returns the
/// snapshot in its new state.
pub fn mark_defective(
    fs: &dyn FileSystem,
    reporter: &dyn Reporter,
    snapshot: &Snapshot,
    reason: &str,
    now: &str,
    dry_run: bool,
) -> Result<Snapshot> {
    let defective = artifact::with_defect_suffix(&snapshot.path);

    if dry_run {
        reporter.info(
            "deploy",
            &format!(
                "Dry run: rename {} to {}",
                snapshot.path.display(),
                defective.display()
            ),
        );
    } else {
        fs.rename(&snapshot.path, &defective)?;
    }

    let report_path = snapshot
        .path
        .with_file_name(artifact::report_file_name(&snapshot.timestamp));
    report::annotate_rollback(fs, reporter, &report_path, reason, now, dry_run)?;

    Ok(Snapshot {
        path: defective,
        timestamp: snapshot.timestamp.clone(),
        status: SnapshotStatus::Defective,
    })
}
