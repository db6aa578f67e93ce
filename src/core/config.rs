use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize};

use crate::error::Error;
use crate::local_files::FileSystem;
use crate::utils::envkey;
use crate::Result;

/// Parse YAML string into typed value.
pub(crate) fn from_yaml_str<T: DeserializeOwned>(s: &str) -> Result<T> {
    serde_yml::from_str(s).map_err(|e| Error::config(format!("Invalid YAML: {}", e)))
}

/// Top-level shape of the apps config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppsConfig {
    #[serde(default)]
    pub apps: Vec<AppSpec>,
}

/// One application entry: where its source lives and which ref to build.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSpec {
    pub name: String,
    pub repo: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    #[serde(default)]
    pub path: Option<String>,
}

impl AppSpec {
    /// Local working copy location: the tilde-expanded path override if
    /// set, otherwise the shared base directory, joined with the app name.
    pub fn checkout_dir(&self, base_dir: &str) -> PathBuf {
        let root = match self.path.as_deref() {
            Some(p) if !p.is_empty() => shellexpand::tilde(p).into_owned(),
            _ => shellexpand::tilde(base_dir).into_owned(),
        };
        PathBuf::from(root).join(&self.name)
    }
}

/// Load and validate the apps config.
///
/// App names are checked for env-key normalizability here so a bad name
/// fails before any clone or build work starts.
pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<AppsConfig> {
    if !fs.exists(path) {
        return Err(Error::config(format!(
            "Config file does not exist: {}",
            path.display()
        )));
    }

    let raw = fs.read(path)?;
    let config: AppsConfig = from_yaml_str(&raw)?;

    for app in &config.apps {
        envkey::normalize(&app.name)?;
    }

    Ok(config)
}
