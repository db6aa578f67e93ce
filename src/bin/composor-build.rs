use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use composor::build::{self, BuildConfig};
use composor::docker::DockerCli;
use composor::git::GitCli;
use composor::local_files;
use composor::{Reporter, StderrReporter};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "composor-build")]
#[command(version = VERSION)]
#[command(about = "Build Docker images for configured apps and write consolidated env/report files")]
struct Cli {
    /// Path to apps config YAML
    #[arg(long, default_value = "apps.yaml")]
    config: String,

    /// Base directory for repos
    #[arg(long, default_value = "~/projects")]
    base_dir: String,

    /// Directory to save env files
    #[arg(long, default_value = "./envs")]
    env_dir: String,

    /// Log what would run without executing or writing anything
    #[arg(long)]
    dry: bool,

    /// Verbose logging
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let reporter = StderrReporter::new(cli.verbose);

    let config = BuildConfig {
        config_path: PathBuf::from(shellexpand::tilde(&cli.config).into_owned()),
        base_dir: cli.base_dir,
        env_dir: cli.env_dir,
        dry_run: cli.dry,
    };

    let fs = local_files::local();
    let git = GitCli::new(cli.dry, &reporter);
    let docker = DockerCli::new(cli.dry, &reporter);

    match build::run(&config, &fs, &git, &docker, &reporter) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            reporter.error("build", &e.to_string());
            ExitCode::from(1)
        }
    }
}
