//! Deploy pipeline: pick a snapshot from the artifact directory and
//! hand it to the compose tool.

use std::path::PathBuf;

use crate::compose::Orchestrator;
use crate::error::Error;
use crate::history::{self, Selection, SelectionOutcome, Snapshot};
use crate::local_files::FileSystem;
use crate::reporter::Reporter;
use crate::utils::timestamp;
use crate::Result;

/// Inputs for one deploy invocation, mirroring the CLI surface.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub env_dir: String,
    pub file: Option<String>,
    pub rollback: Option<usize>,
    pub switch: Option<usize>,
    pub compose_files: Vec<String>,
    pub restart: bool,
    pub stop: bool,
    pub reason: Option<String>,
    pub dry_run: bool,
}

/// Derive the selection mode from the flag combination.
///
/// The same rules are enforced at the CLI layer; re-checking here keeps
/// programmatic callers honest.
fn selection_for(config: &DeployConfig) -> Result<Selection> {
    if config.rollback.is_some() && config.reason.is_none() {
        return Err(Error::validation("--reason is required for --rollback"));
    }

    if config.rollback.is_some() && config.switch.is_some() {
        return Err(Error::validation(
            "--rollback and --switch are mutually exclusive",
        ));
    }

    if let Some(file) = &config.file {
        return Ok(Selection::File(file.clone()));
    }

    if let Some(index) = config.rollback {
        let reason = config.reason.clone().unwrap_or_default();
        return Ok(Selection::Rollback { index, reason });
    }

    Ok(Selection::Index(config.switch.unwrap_or(0)))
}

/// Select a snapshot and run the requested compose verb against it.
///
/// All defect marking happens inside selection, before the orchestrator
/// is touched; a failed selection leaves the stack as it was.
pub fn run(
    config: &DeployConfig,
    fs: &dyn FileSystem,
    orchestrator: &dyn Orchestrator,
    reporter: &dyn Reporter,
) -> Result<SelectionOutcome> {
    let selection = selection_for(config)?;
    let env_dir = PathBuf::from(shellexpand::tilde(&config.env_dir).into_owned());
    let now = timestamp::now();

    let outcome = history::select_snapshot(
        fs,
        reporter,
        &env_dir,
        &selection,
        &now,
        config.dry_run,
    )?;

    reporter.info(
        "deploy",
        &format!("Using env: {}", outcome.env_file.display()),
    );

    if config.restart {
        orchestrator.up(&outcome.env_file, &config.compose_files, true)?;
    } else if config.stop {
        orchestrator.down(&outcome.env_file, &config.compose_files)?;
    } else {
        orchestrator.up(&outcome.env_file, &config.compose_files, false)?;
    }

    Ok(outcome)
}

/// Snapshot listing for operator inspection, newest first.
pub fn list(fs: &dyn FileSystem, env_dir: &str) -> Result<Vec<Snapshot>> {
    let dir = PathBuf::from(shellexpand::tilde(env_dir).into_owned());
    history::list_snapshots(fs, &dir)
}
