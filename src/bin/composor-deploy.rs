use std::process::ExitCode;

use clap::Parser;

use composor::compose::{ComposeCli, ComposeTool};
use composor::deploy::{self, DeployConfig};
use composor::local_files;
use composor::{Reporter, StderrReporter};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "composor-deploy")]
#[command(version = VERSION)]
#[command(about = "Select a deployment env snapshot and run the compose stack against it")]
struct Cli {
    /// Directory containing env files
    #[arg(long, default_value = ".")]
    env_dir: String,

    /// Use specific env file name
    #[arg(long)]
    file: Option<String>,

    /// Rollback index (1 = previous (default), 2 = before that, ...)
    #[arg(
        long,
        num_args = 0..=1,
        default_missing_value = "1",
        requires = "reason",
        conflicts_with = "switch"
    )]
    rollback: Option<usize>,

    /// Deploy based on index (0 = latest)
    #[arg(long, num_args = 0..=1, default_missing_value = "1")]
    switch: Option<usize>,

    /// Compose YAML files
    #[arg(long, num_args = 1.., default_value = "docker-compose.yml")]
    compose: Vec<String>,

    /// Restart containers with --force-recreate
    #[arg(long)]
    restart: bool,

    /// Stop all containers
    #[arg(long)]
    stop: bool,

    /// Reason for rollback (required for --rollback)
    #[arg(long)]
    reason: Option<String>,

    /// List available env files
    #[arg(long)]
    list: bool,

    /// Dry run mode
    #[arg(long)]
    dry: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let reporter = StderrReporter::new(false);
    let fs = local_files::local();

    if cli.list {
        return match deploy::list(&fs, &cli.env_dir) {
            Ok(snapshots) => {
                if snapshots.is_empty() {
                    reporter.info(
                        "deploy",
                        &format!("No env files in {}. Nothing to deploy", cli.env_dir),
                    );
                } else {
                    for (idx, snapshot) in snapshots.iter().enumerate() {
                        println!("{}: {}", idx, snapshot.file_name());
                    }
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                reporter.error("deploy", &e.to_string());
                ExitCode::from(1)
            }
        };
    }

    // A missing compose tool is fatal before any selection or marking.
    let tool = match ComposeTool::detect() {
        Ok(tool) => tool,
        Err(e) => {
            reporter.error("deploy", &e.to_string());
            return ExitCode::from(1);
        }
    };

    let config = DeployConfig {
        env_dir: cli.env_dir,
        file: cli.file,
        rollback: cli.rollback,
        switch: cli.switch,
        compose_files: cli.compose,
        restart: cli.restart,
        stop: cli.stop,
        reason: cli.reason,
        dry_run: cli.dry,
    };

    let compose = ComposeCli::new(tool, config.dry_run, &reporter);

    match deploy::run(&config, &fs, &compose, &reporter) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            reporter.error("deploy", &e.to_string());
            ExitCode::from(1)
        }
    }
}
