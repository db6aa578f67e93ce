//! Build pipeline: resolve every configured app to a ref, build image
//! tags keyed by commit hash, and flush the results into one env file
//! plus one report.

use std::path::PathBuf;

use crate::config::{self, AppSpec};
use crate::docker::ImageBuilder;
use crate::error::Error;
use crate::git::{self, SourceControl};
use crate::local_files::FileSystem;
use crate::report::AppImage;
use crate::reporter::Reporter;
use crate::utils::timestamp;
use crate::{artifact, Result};

/// Inputs for one build cycle.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub config_path: PathBuf,
    pub base_dir: String,
    pub env_dir: String,
    pub dry_run: bool,
}

/// What one build cycle produced. The timestamp keys both artifacts.
#[derive(Debug)]
pub struct BuildOutput {
    pub timestamp: String,
    pub env_file: PathBuf,
    pub report_file: PathBuf,
    pub apps: Vec<AppImage>,
}

/// Run one build cycle over every app in the config.
///
/// Apps are processed in config order and any failure aborts the whole
/// cycle; a partial env file is never written.
pub fn run(
    config: &BuildConfig,
    fs: &dyn FileSystem,
    scm: &dyn SourceControl,
    builder: &dyn ImageBuilder,
    reporter: &dyn Reporter,
) -> Result<BuildOutput> {
    let apps_config = config::load(fs, &config.config_path)?;
    if apps_config.apps.is_empty() {
        return Err(Error::config(format!(
            "Config file {} does not contain any app",
            config.config_path.display()
        )));
    }

    let timestamp = timestamp::now();
    let env_dir = PathBuf::from(shellexpand::tilde(&config.env_dir).into_owned());

    let mut apps = Vec::with_capacity(apps_config.apps.len());
    for app in &apps_config.apps {
        let image_tag = build_app_image(config, app, scm, builder, reporter)?;
        apps.push(AppImage {
            name: app.name.clone(),
            image_tag,
        });
    }

    let env_file = artifact::write_env_file(fs, reporter, &env_dir, &timestamp, &apps, config.dry_run)?;
    let report_file = artifact::write_report(
        fs,
        reporter,
        &env_dir,
        &timestamp,
        &env_file,
        &apps,
        config.dry_run,
    )?;

    Ok(BuildOutput {
        timestamp,
        env_file,
        report_file,
        apps,
    })
}

/// Resolve one app's working copy and return its image tag, building
/// the image only when the tag is not already present locally.
fn build_app_image(
    config: &BuildConfig,
    app: &AppSpec,
    scm: &dyn SourceControl,
    builder: &dyn ImageBuilder,
    reporter: &dyn Reporter,
) -> Result<String> {
    let checkout = app.checkout_dir(&config.base_dir);
    git::ensure_ref(scm, &app.repo, &checkout, &app.git_ref)?;

    let hash = scm.head_short_hash(&checkout)?;
    let image_tag = format!("{}:{}", app.name, hash);

    if builder.image_exists(&image_tag)? {
        reporter.info(
            "build",
            &format!("Image {} already exists, skipping build.", image_tag),
        );
    } else {
        reporter.info("build", &format!("Building Docker image {}", image_tag));
        builder.build(&checkout, &image_tag)?;
    }

    Ok(image_tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_files::MemoryFs;
    use crate::report::DeploymentReport;
    use crate::reporter::RecordingReporter;
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::path::Path;

    const CONFIG: &str = "\
apps:
  - name: webapp
    repo: https://example.com/webapp.git
    ref: main
  - name: worker
    repo: https://example.com/worker.git
    ref: v2.1.0
";

    struct FakeScm {
        fail_checkout: bool,
    }

    impl crate::git::SourceControl for FakeScm {
        fn clone_repo(&self, _url: &str, _dest: &Path) -> Result<()> {
            Ok(())
        }

        fn fetch_all(&self, _dir: &Path) -> Result<()> {
            Ok(())
        }

        fn checkout(&self, _dir: &Path, git_ref: &str) -> Result<()> {
            if self.fail_checkout {
                return Err(Error::git(format!("pathspec '{}' did not match", git_ref)));
            }
            Ok(())
        }

        fn remote_ref_exists(&self, _dir: &Path, _git_ref: &str) -> bool {
            false
        }

        fn reset_to_remote(&self, _dir: &Path, _git_ref: &str) -> Result<()> {
            Ok(())
        }

        fn head_short_hash(&self, _dir: &Path) -> Result<String> {
            Ok("abc1234".to_string())
        }
    }

    struct FakeBuilder {
        existing: BTreeSet<String>,
        built: RefCell<Vec<String>>,
    }

    impl FakeBuilder {
        fn new(existing: &[&str]) -> Self {
            Self {
                existing: existing.iter().map(|s| s.to_string()).collect(),
                built: RefCell::new(Vec::new()),
            }
        }

        fn built(&self) -> Vec<String> {
            self.built.borrow().clone()
        }
    }

    impl ImageBuilder for FakeBuilder {
        fn image_exists(&self, tag: &str) -> Result<bool> {
            Ok(self.existing.contains(tag))
        }

        fn build(&self, _dir: &Path, tag: &str) -> Result<()> {
            self.built.borrow_mut().push(tag.to_string());
            Ok(())
        }
    }

    fn build_config(dry_run: bool) -> BuildConfig {
        BuildConfig {
            config_path: PathBuf::from("/conf/apps.yaml"),
            base_dir: "/srv/projects".to_string(),
            env_dir: "/envs".to_string(),
            dry_run,
        }
    }

    #[test]
    fn build_cycle_produces_matching_env_and_report() {
        let fs = MemoryFs::new();
        fs.seed("/conf/apps.yaml", CONFIG);
        let reporter = RecordingReporter::new();
        let scm = FakeScm { fail_checkout: false };
        let builder = FakeBuilder::new(&[]);

        let output = run(&build_config(false), &fs, &scm, &builder, &reporter).unwrap();

        assert_eq!(
            output.env_file,
            PathBuf::from(format!("/envs/env_{}.env", output.timestamp))
        );
        assert_eq!(
            output.report_file,
            PathBuf::from(format!("/envs/report_{}.yaml", output.timestamp))
        );

        let env = fs.read(&output.env_file).unwrap();
        assert_eq!(
            env,
            "WEBAPP_IMAGE=webapp:abc1234\nWORKER_IMAGE=worker:abc1234\n"
        );

        let report: DeploymentReport =
            serde_yml::from_str(&fs.read(&output.report_file).unwrap()).unwrap();
        assert_eq!(report.timestamp, output.timestamp);
        assert_eq!(report.apps.len(), 2);
        assert_eq!(report.apps[0].name, "webapp");
        assert_eq!(report.apps[1].name, "worker");

        assert_eq!(builder.built(), vec!["webapp:abc1234", "worker:abc1234"]);
    }

    #[test]
    fn existing_image_skips_build_but_is_still_listed() {
        let fs = MemoryFs::new();
        fs.seed("/conf/apps.yaml", CONFIG);
        let reporter = RecordingReporter::new();
        let scm = FakeScm { fail_checkout: false };
        let builder = FakeBuilder::new(&["webapp:abc1234"]);

        let output = run(&build_config(false), &fs, &scm, &builder, &reporter).unwrap();

        assert_eq!(builder.built(), vec!["worker:abc1234"]);
        assert!(reporter.contains("Image webapp:abc1234 already exists, skipping build."));

        let env = fs.read(&output.env_file).unwrap();
        assert!(env.contains("WEBAPP_IMAGE=webapp:abc1234"));
    }

    #[test]
    fn empty_config_is_fatal_before_any_work() {
        let fs = MemoryFs::new();
        fs.seed("/conf/apps.yaml", "apps: []\n");
        let reporter = RecordingReporter::new();
        let scm = FakeScm { fail_checkout: false };
        let builder = FakeBuilder::new(&[]);

        let err = run(&build_config(false), &fs, &scm, &builder, &reporter).unwrap_err();

        assert_eq!(err.code(), "CONFIG_ERROR");
        assert!(err.to_string().contains("does not contain any app"));
        assert_eq!(fs.contents().len(), 1);
    }

    #[test]
    fn checkout_failure_aborts_whole_cycle() {
        let fs = MemoryFs::new();
        fs.seed("/conf/apps.yaml", CONFIG);
        let reporter = RecordingReporter::new();
        let scm = FakeScm { fail_checkout: true };
        let builder = FakeBuilder::new(&[]);

        let err = run(&build_config(false), &fs, &scm, &builder, &reporter).unwrap_err();

        assert_eq!(err.code(), "GIT_ERROR");
        assert!(builder.built().is_empty());
        assert_eq!(fs.contents().len(), 1);
    }

    #[test]
    fn dry_run_creates_no_artifacts() {
        let fs = MemoryFs::new();
        fs.seed("/conf/apps.yaml", CONFIG);
        let reporter = RecordingReporter::new();
        let scm = FakeScm { fail_checkout: false };
        let builder = FakeBuilder::new(&[]);

        run(&build_config(true), &fs, &scm, &builder, &reporter).unwrap();

        let paths: Vec<_> = fs.contents().into_keys().collect();
        assert_eq!(paths, vec![PathBuf::from("/conf/apps.yaml")]);
    }
}
