use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Entry returned from directory listing
#[derive(Debug, Clone)]
pub struct Entry {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Trait for file system operations backing the artifact store
pub trait FileSystem {
    fn read(&self, path: &Path) -> Result<String>;
    fn write(&self, path: &Path, content: &str) -> Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn list(&self, dir: &Path) -> Result<Vec<Entry>>;
    fn ensure_dir(&self, dir: &Path) -> Result<()>;
}

/// Local filesystem implementation
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFs {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for LocalFs {
    fn read(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::other(format!("File not found: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        // Atomic write: write to temp file, then rename
        let parent = path
            .parent()
            .ok_or_else(|| Error::other(format!("Invalid path: {}", path.display())))?;

        let filename = path
            .file_name()
            .ok_or_else(|| Error::other(format!("Invalid path: {}", path.display())))?;

        let tmp_path = parent.join(format!("{}.tmp", filename.to_string_lossy()));

        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, path)?;

        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::other(format!("File not found: {}", from.display()))
            } else {
                Error::Io(e)
            }
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list(&self, dir: &Path) -> Result<Vec<Entry>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(dir)?;

        let mut result = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let is_dir = path.is_dir();
            result.push(Entry { path, is_dir });
        }

        Ok(result)
    }

    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// Convenience function to get local filesystem
pub fn local() -> LocalFs {
    LocalFs::new()
}

/// In-memory filesystem for exercising artifact and history logic
/// without touching disk. Stores file contents only; directories are
/// implicit.
#[cfg(test)]
pub(crate) struct MemoryFs {
    files: std::cell::RefCell<std::collections::BTreeMap<PathBuf, String>>,
}

#[cfg(test)]
impl MemoryFs {
    pub(crate) fn new() -> Self {
        Self {
            files: std::cell::RefCell::new(std::collections::BTreeMap::new()),
        }
    }

    pub(crate) fn seed(&self, path: impl Into<PathBuf>, content: &str) {
        self.files
            .borrow_mut()
            .insert(path.into(), content.to_string());
    }

    pub(crate) fn contents(&self) -> std::collections::BTreeMap<PathBuf, String> {
        self.files.borrow().clone()
    }
}

#[cfg(test)]
impl FileSystem for MemoryFs {
    fn read(&self, path: &Path) -> Result<String> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::other(format!("File not found: {}", path.display())))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let mut files = self.files.borrow_mut();
        let content = files
            .remove(from)
            .ok_or_else(|| Error::other(format!("File not found: {}", from.display())))?;
        files.insert(to.to_path_buf(), content);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn list(&self, dir: &Path) -> Result<Vec<Entry>> {
        let result = self
            .files
            .borrow()
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .map(|p| Entry {
                path: p.clone(),
                is_dir: false,
            })
            .collect();
        Ok(result)
    }

    fn ensure_dir(&self, _dir: &Path) -> Result<()> {
        Ok(())
    }
}
