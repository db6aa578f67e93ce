use std::path::Path;

use crate::error::{Error, Result};
use crate::reporter::Reporter;
use crate::utils::command;

/// Which compose implementation is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeTool {
    /// Standalone `docker-compose` binary.
    Standalone,
    /// `docker compose` plugin subcommand.
    DockerPlugin,
}

impl ComposeTool {
    /// Probe for an installed compose implementation, preferring the
    /// standalone binary. Runs even under dry-run so a missing tool is
    /// reported before any deployment action.
    pub fn detect() -> Result<Self> {
        if command::succeeded("docker-compose", &["version"]) {
            return Ok(ComposeTool::Standalone);
        }

        if command::succeeded("docker", &["compose", "version"]) {
            return Ok(ComposeTool::DockerPlugin);
        }

        Err(Error::tool_not_found(
            "Neither `docker compose` nor `docker-compose` is installed on this system.",
        ))
    }

    fn program(&self) -> &'static str {
        match self {
            ComposeTool::Standalone => "docker-compose",
            ComposeTool::DockerPlugin => "docker",
        }
    }

    fn base_args(&self) -> &'static [&'static str] {
        match self {
            ComposeTool::Standalone => &[],
            ComposeTool::DockerPlugin => &["compose"],
        }
    }
}

/// Compose operations the deploy pipeline depends on.
pub trait Orchestrator {
    fn up(&self, env_file: &Path, compose_files: &[String], recreate: bool) -> Result<()>;
    fn down(&self, env_file: &Path, compose_files: &[String]) -> Result<()>;
}

/// Subprocess implementation over the detected compose tool.
pub struct ComposeCli<'a> {
    tool: ComposeTool,
    dry_run: bool,
    reporter: &'a dyn Reporter,
}

impl<'a> ComposeCli<'a> {
    pub fn new(tool: ComposeTool, dry_run: bool, reporter: &'a dyn Reporter) -> Self {
        Self {
            tool,
            dry_run,
            reporter,
        }
    }

    /// Assemble and run one compose invocation. The command line is
    /// always logged; dry-run stops after logging.
    fn invoke(&self, env_file: &Path, compose_files: &[String], verb: &[&str]) -> Result<()> {
        let mut args: Vec<String> = self
            .tool
            .base_args()
            .iter()
            .map(|s| s.to_string())
            .collect();

        for file in compose_files {
            args.push("-f".to_string());
            args.push(file.clone());
        }

        args.push("--env-file".to_string());
        args.push(env_file.to_string_lossy().into_owned());
        args.extend(verb.iter().map(|s| s.to_string()));

        self.reporter.info(
            "compose",
            &format!("Running: {} {}", self.tool.program(), args.join(" ")),
        );

        if self.dry_run {
            return Ok(());
        }

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        command::passthrough(self.tool.program(), &arg_refs, "compose")
    }
}

impl Orchestrator for ComposeCli<'_> {
    fn up(&self, env_file: &Path, compose_files: &[String], recreate: bool) -> Result<()> {
        let verb: &[&str] = if recreate {
            &["up", "-d", "--force-recreate"]
        } else {
            &["up", "-d"]
        };
        self.invoke(env_file, compose_files, verb)
    }

    fn down(&self, env_file: &Path, compose_files: &[String]) -> Result<()> {
        self.invoke(env_file, compose_files, &["down"])
    }
}
