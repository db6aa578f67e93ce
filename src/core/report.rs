use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yml::Value;

use crate::local_files::FileSystem;
use crate::reporter::Reporter;
use crate::Result;

/// One resolved application row, shared by the env file and the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppImage {
    pub name: String,
    pub image_tag: String,
}

/// Rollback annotation merged into a report when its snapshot is
/// marked defective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackNote {
    pub timestamp: String,
    pub reason: String,
}

/// Report written beside each environment snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentReport {
    pub timestamp: String,
    pub env_file: String,
    pub apps: Vec<AppImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback: Option<RollbackNote>,
}

/// Merge a rollback annotation into a report file and retire it.
///
/// The report is loaded as a YAML value rather than the typed struct so
/// keys this version does not know about survive the rewrite. A missing
/// or malformed report is skipped with a log line; rollback proceeds
/// without it.
pub fn annotate_rollback(
    fs: &dyn FileSystem,
    reporter: &dyn Reporter,
    report_path: &Path,
    reason: &str,
    now: &str,
    dry_run: bool,
) -> Result<()> {
    if !fs.exists(report_path) {
        reporter.info(
            "deploy",
            &format!("Not updating report, {} does not exist", report_path.display()),
        );
        return Ok(());
    }

    let raw = fs.read(report_path)?;
    let mut data = match serde_yml::from_str::<Value>(&raw) {
        Ok(Value::Mapping(map)) => map,
        _ => {
            reporter.warn(
                "deploy",
                &format!(
                    "Not updating report, {} has no data or invalid yaml file",
                    report_path.display()
                ),
            );
            return Ok(());
        }
    };

    let mut note = serde_yml::Mapping::new();
    note.insert(
        Value::String("timestamp".to_string()),
        Value::String(now.to_string()),
    );
    note.insert(
        Value::String("reason".to_string()),
        Value::String(reason.to_string()),
    );
    data.insert(
        Value::String("rollback".to_string()),
        Value::Mapping(note),
    );

    if dry_run {
        reporter.info(
            "deploy",
            &format!("Dry run: writing to {}", report_path.display()),
        );
        return Ok(());
    }

    reporter.debug("deploy", &format!("Updating {}", report_path.display()));
    let rewritten = serde_yml::to_string(&Value::Mapping(data))?;
    fs.write(report_path, &rewritten)?;
    fs.rename(report_path, &crate::artifact::with_defect_suffix(report_path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_files::MemoryFs;
    use crate::reporter::RecordingReporter;

    fn sample_report() -> DeploymentReport {
        DeploymentReport {
            timestamp: "20250830133324".to_string(),
            env_file: "/envs/env_20250830133324.env".to_string(),
            apps: vec![
                AppImage {
                    name: "webapp".to_string(),
                    image_tag: "webapp:abc1234".to_string(),
                },
                AppImage {
                    name: "worker".to_string(),
                    image_tag: "worker:def5678".to_string(),
                },
            ],
            rollback: None,
        }
    }

    #[test]
    fn report_round_trip_preserves_app_order() {
        let report = sample_report();
        let yaml = serde_yml::to_string(&report).unwrap();
        let parsed: DeploymentReport = serde_yml::from_str(&yaml).unwrap();

        assert_eq!(parsed.apps, report.apps);
        assert!(parsed.rollback.is_none());
    }

    #[test]
    fn absent_rollback_is_not_serialized() {
        let yaml = serde_yml::to_string(&sample_report()).unwrap();
        assert!(!yaml.contains("rollback"));
    }

    #[test]
    fn annotate_merges_note_and_retires_report() {
        let fs = MemoryFs::new();
        let reporter = RecordingReporter::new();
        let path = Path::new("/envs/report_20250830133324.yaml");
        fs.seed(
            path,
            "timestamp: '20250830133324'\nenv_file: /envs/env_20250830133324.env\napps: []\n",
        );

        annotate_rollback(&fs, &reporter, path, "bad build", "20250831120000", false).unwrap();

        assert!(!fs.exists(path));
        let retired = fs
            .read(Path::new("/envs/report_20250830133324.yaml.defect"))
            .unwrap();
        let parsed: DeploymentReport = serde_yml::from_str(&retired).unwrap();
        let note = parsed.rollback.unwrap();
        assert_eq!(note.reason, "bad build");
        assert_eq!(note.timestamp, "20250831120000");
    }

    #[test]
    fn annotate_preserves_unknown_keys() {
        let fs = MemoryFs::new();
        let reporter = RecordingReporter::new();
        let path = Path::new("/envs/report_20250830133324.yaml");
        fs.seed(path, "timestamp: '20250830133324'\noperator_note: keep me\n");

        annotate_rollback(&fs, &reporter, path, "bad build", "20250831120000", false).unwrap();

        let retired = fs
            .read(Path::new("/envs/report_20250830133324.yaml.defect"))
            .unwrap();
        assert!(retired.contains("operator_note: keep me"));
        assert!(retired.contains("reason: bad build"));
    }

    #[test]
    fn annotate_skips_missing_report() {
        let fs = MemoryFs::new();
        let reporter = RecordingReporter::new();

        annotate_rollback(
            &fs,
            &reporter,
            Path::new("/envs/report_20250830133324.yaml"),
            "bad build",
            "20250831120000",
            false,
        )
        .unwrap();

        assert!(reporter.contains("does not exist"));
        assert!(fs.contents().is_empty());
    }

    #[test]
    fn annotate_skips_unparseable_report_with_warning() {
        let fs = MemoryFs::new();
        let reporter = RecordingReporter::new();
        let path = Path::new("/envs/report_20250830133324.yaml");
        fs.seed(path, "- just\n- a\n- list\n");

        annotate_rollback(&fs, &reporter, path, "bad build", "20250831120000", false).unwrap();

        assert!(reporter.contains("warn"));
        assert!(fs.exists(path));
        assert_eq!(fs.read(path).unwrap(), "- just\n- a\n- list\n");
    }

    #[test]
    fn annotate_dry_run_leaves_report_untouched() {
        let fs = MemoryFs::new();
        let reporter = RecordingReporter::new();
        let path = Path::new("/envs/report_20250830133324.yaml");
        fs.seed(path, "timestamp: '20250830133324'\n");

        annotate_rollback(&fs, &reporter, path, "bad build", "20250831120000", true).unwrap();

        assert!(reporter.contains("Dry run: writing to"));
        assert!(fs.exists(path));
        assert_eq!(fs.read(path).unwrap(), "timestamp: '20250830133324'\n");
    }
}
