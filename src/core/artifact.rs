//! Artifact store layout: file naming plus the consolidated env and
//! report writers. One build invocation produces exactly one env file
//! and one report, both keyed by the same timestamp.

use std::path::{Path, PathBuf};

use crate::local_files::FileSystem;
use crate::report::{AppImage, DeploymentReport};
use crate::reporter::Reporter;
use crate::utils::envkey;
use crate::Result;

pub const SNAPSHOT_PREFIX: &str = "env_";
pub const SNAPSHOT_SUFFIX: &str = ".env";
pub const REPORT_PREFIX: &str = "report_";
pub const REPORT_SUFFIX: &str = ".yaml";
pub const DEFECT_SUFFIX: &str = ".defect";

pub fn env_file_name(timestamp: &str) -> String {
    format!("{}{}{}", SNAPSHOT_PREFIX, timestamp, SNAPSHOT_SUFFIX)
}

pub fn report_file_name(timestamp: &str) -> String {
    format!("{}{}{}", REPORT_PREFIX, timestamp, REPORT_SUFFIX)
}

/// The same path with `.defect` appended to the full file name.
pub fn with_defect_suffix(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(DEFECT_SUFFIX);
    PathBuf::from(name)
}

/// Write the consolidated env file: one `<KEY>_IMAGE=<tag>` line per
/// app, in config order. Returns the target path; under dry-run the
/// path is computed and logged but nothing is written.
pub fn write_env_file(
    fs: &dyn FileSystem,
    reporter: &dyn Reporter,
    env_dir: &Path,
    timestamp: &str,
    apps: &[AppImage],
    dry_run: bool,
) -> Result<PathBuf> {
    let env_file = env_dir.join(env_file_name(timestamp));
    reporter.info(
        "build",
        &format!("Creating consolidated env file {}", env_file.display()),
    );

    let mut lines = Vec::with_capacity(apps.len());
    for app in apps {
        lines.push(format!(
            "{}_IMAGE={}",
            envkey::normalize(&app.name)?,
            app.image_tag
        ));
    }

    if !dry_run {
        fs.ensure_dir(env_dir)?;
        fs.write(&env_file, &(lines.join("\n") + "\n"))?;
    }

    Ok(env_file)
}

/// Write the report paired with an env file, beside it in the same
/// directory. Skipped entirely under dry-run.
pub fn write_report(
    fs: &dyn FileSystem,
    reporter: &dyn Reporter,
    env_dir: &Path,
    timestamp: &str,
    env_file: &Path,
    apps: &[AppImage],
    dry_run: bool,
) -> Result<PathBuf> {
    let report_file = env_dir.join(report_file_name(timestamp));
    reporter.info(
        "build",
        &format!("Writing consolidated report to {}", report_file.display()),
    );

    if !dry_run {
        let report = DeploymentReport {
            timestamp: timestamp.to_string(),
            env_file: env_file.to_string_lossy().into_owned(),
            apps: apps.to_vec(),
            rollback: None,
        };

        fs.ensure_dir(env_dir)?;
        fs.write(&report_file, &serde_yml::to_string(&report)?)?;
    }

    Ok(report_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_files::MemoryFs;
    use crate::reporter::RecordingReporter;

    fn apps() -> Vec<AppImage> {
        vec![
            AppImage {
                name: "webapp".to_string(),
                image_tag: "webapp:abc1234".to_string(),
            },
            AppImage {
                name: "my-worker".to_string(),
                image_tag: "my-worker:def5678".to_string(),
            },
        ]
    }

    #[test]
    fn file_names_embed_timestamp() {
        assert_eq!(env_file_name("20250830133324"), "env_20250830133324.env");
        assert_eq!(
            report_file_name("20250830133324"),
            "report_20250830133324.yaml"
        );
    }

    #[test]
    fn env_file_has_one_normalized_line_per_app() {
        let fs = MemoryFs::new();
        let reporter = RecordingReporter::new();

        let path = write_env_file(
            &fs,
            &reporter,
            Path::new("/envs"),
            "20250830133324",
            &apps(),
            false,
        )
        .unwrap();

        assert_eq!(path, PathBuf::from("/envs/env_20250830133324.env"));
        assert_eq!(
            fs.read(&path).unwrap(),
            "WEBAPP_IMAGE=webapp:abc1234\nMY_WORKER_IMAGE=my-worker:def5678\n"
        );
    }

    #[test]
    fn report_lists_apps_beside_env_file() {
        let fs = MemoryFs::new();
        let reporter = RecordingReporter::new();
        let env_file = Path::new("/envs/env_20250830133324.env");

        let path = write_report(
            &fs,
            &reporter,
            Path::new("/envs"),
            "20250830133324",
            env_file,
            &apps(),
            false,
        )
        .unwrap();

        assert_eq!(path, PathBuf::from("/envs/report_20250830133324.yaml"));
        let report: DeploymentReport = serde_yml::from_str(&fs.read(&path).unwrap()).unwrap();
        assert_eq!(report.timestamp, "20250830133324");
        assert_eq!(report.env_file, "/envs/env_20250830133324.env");
        assert_eq!(report.apps, apps());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let fs = MemoryFs::new();
        let reporter = RecordingReporter::new();

        let env_file = write_env_file(
            &fs,
            &reporter,
            Path::new("/envs"),
            "20250830133324",
            &apps(),
            true,
        )
        .unwrap();
        write_report(
            &fs,
            &reporter,
            Path::new("/envs"),
            "20250830133324",
            &env_file,
            &apps(),
            true,
        )
        .unwrap();

        assert!(fs.contents().is_empty());
        assert!(reporter.contains("Creating consolidated env file"));
        assert!(reporter.contains("Writing consolidated report to"));
    }
}
