use std::path::Path;

use crate::error::{Error, Result};
use crate::reporter::Reporter;
use crate::utils::command;

/// Source-control operations the build pipeline depends on.
///
/// Implemented over the `git` CLI in production; tests substitute
/// recording fakes so pipeline logic runs without a repository.
pub trait SourceControl {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;
    fn fetch_all(&self, dir: &Path) -> Result<()>;
    fn checkout(&self, dir: &Path, git_ref: &str) -> Result<()>;
    fn remote_ref_exists(&self, dir: &Path, git_ref: &str) -> bool;
    fn reset_to_remote(&self, dir: &Path, git_ref: &str) -> Result<()>;
    fn head_short_hash(&self, dir: &Path) -> Result<String>;
}

/// `git` subprocess implementation.
pub struct GitCli<'a> {
    dry_run: bool,
    reporter: &'a dyn Reporter,
}

impl<'a> GitCli<'a> {
    pub fn new(dry_run: bool, reporter: &'a dyn Reporter) -> Self {
        Self { dry_run, reporter }
    }

    /// Run a git subcommand in a repository directory, honoring dry-run.
    fn git_in(&self, dir: &Path, args: &[&str], context: &str) -> Result<()> {
        if self.dry_run {
            self.reporter
                .info("git", &format!("Would run: git {}", args.join(" ")));
            return Ok(());
        }

        self.reporter
            .debug("git", &format!("Running: git {}", args.join(" ")));
        command::run_in(dir, "git", args, context).map_err(|e| Error::git(e.to_string()))?;
        Ok(())
    }
}

impl SourceControl for GitCli<'_> {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        self.reporter.info(
            "git",
            &format!("Cloning repo {} into {}", url, dest.display()),
        );

        if self.dry_run {
            self.reporter.info(
                "git",
                &format!("Would run: git clone {} {}", url, dest.display()),
            );
            return Ok(());
        }

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        command::run("git", &["clone", url, &dest.to_string_lossy()], "git clone")
            .map_err(|e| Error::git(e.to_string()))?;
        Ok(())
    }

    fn fetch_all(&self, dir: &Path) -> Result<()> {
        self.reporter
            .info("git", &format!("Fetching updates in {}", dir.display()));
        self.git_in(dir, &["fetch", "--all", "--tags"], "git fetch")
    }

    fn checkout(&self, dir: &Path, git_ref: &str) -> Result<()> {
        self.reporter.info(
            "git",
            &format!("Checking out {} in {}", git_ref, dir.display()),
        );
        self.git_in(dir, &["checkout", git_ref], "git checkout")
    }

    fn remote_ref_exists(&self, dir: &Path, git_ref: &str) -> bool {
        if self.dry_run {
            return false;
        }

        command::succeeded_in(
            dir,
            "git",
            &["rev-parse", "--verify", &format!("origin/{}", git_ref)],
        )
    }

    fn reset_to_remote(&self, dir: &Path, git_ref: &str) -> Result<()> {
        self.reporter.info(
            "git",
            &format!("Resetting {} to origin/{}", dir.display(), git_ref),
        );
        self.git_in(
            dir,
            &["reset", "--hard", &format!("origin/{}", git_ref)],
            "git reset",
        )
    }

    fn head_short_hash(&self, dir: &Path) -> Result<String> {
        if self.dry_run {
            return Ok("DRY".to_string());
        }

        command::run_in(dir, "git", &["rev-parse", "--short", "HEAD"], "git rev-parse")
            .map_err(|e| Error::git(e.to_string()))
    }
}

/// Bring a working copy to the requested ref.
///
/// Clones when the directory is absent, otherwise fetches all refs and
/// tags. After checkout, if the ref also exists as a remote tracking
/// branch the local ref is hard-reset to it so the checkout cannot
/// drift from origin. Tags and detached commits skip the reset.
pub fn ensure_ref(scm: &dyn SourceControl, url: &str, dir: &Path, git_ref: &str) -> Result<()> {
    if dir.exists() {
        scm.fetch_all(dir)?;
    } else {
        scm.clone_repo(url, dir)?;
    }

    scm.checkout(dir, git_ref)?;

    if scm.remote_ref_exists(dir, git_ref) {
        scm.reset_to_remote(dir, git_ref)?;
    }

    Ok(())
}
