use std::path::Path;

use crate::error::{Error, Result};
use crate::reporter::Reporter;
use crate::utils::command;

/// Container image operations the build pipeline depends on.
pub trait ImageBuilder {
    fn image_exists(&self, tag: &str) -> Result<bool>;
    fn build(&self, dir: &Path, tag: &str) -> Result<()>;
}

/// `docker` subprocess implementation.
///
/// The tag probe captures output; the build itself streams to the
/// terminal since image builds are long-running and operator-facing.
pub struct DockerCli<'a> {
    dry_run: bool,
    reporter: &'a dyn Reporter,
}

impl<'a> DockerCli<'a> {
    pub fn new(dry_run: bool, reporter: &'a dyn Reporter) -> Self {
        Self { dry_run, reporter }
    }
}

impl ImageBuilder for DockerCli<'_> {
    fn image_exists(&self, tag: &str) -> Result<bool> {
        if self.dry_run {
            self.reporter
                .info("docker", &format!("Would run: docker images -q {}", tag));
            return Ok(false);
        }

        let stdout = command::run("docker", &["images", "-q", tag], "docker images")
            .map_err(|e| Error::docker(e.to_string()))?;
        Ok(!stdout.is_empty())
    }

    fn build(&self, dir: &Path, tag: &str) -> Result<()> {
        if self.dry_run {
            self.reporter.info(
                "docker",
                &format!("Would run: docker build -t {} {}", tag, dir.display()),
            );
            return Ok(());
        }

        self.reporter.debug(
            "docker",
            &format!("Running: docker build -t {} {}", tag, dir.display()),
        );
        command::passthrough(
            "docker",
            &["build", "-t", tag, &dir.to_string_lossy()],
            "docker build",
        )
        .map_err(|e| Error::docker(e.to_string()))
    }
}
