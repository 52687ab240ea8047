use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::LoadError;

pub const TASKS_DIR: &str = "tasks";
pub const HANDLERS_DIR: &str = "handlers";
pub const TEMPLATES_DIR: &str = "templates";

/// Loader settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub dir: PathBuf,
}

impl LoadConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        LoadConfig {
            enabled: true,
            dir: dir.into(),
        }
    }

    /// Checks that `dir` is absolute and contains the `tasks` and `handlers`
    /// subdirectories. A disabled config is always valid.
    pub fn validate(&self) -> Result<(), LoadError> {
        if !self.enabled {
            return Ok(());
        }

        if !self.dir.is_absolute() {
            return Err(LoadError::RelativeDir(self.dir.clone()));
        }

        let entries = fs::read_dir(&self.dir).map_err(|source| LoadError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut dirs = HashSet::new();
        for entry in entries {
            let entry = entry.map_err(|source| LoadError::Io {
                path: self.dir.clone(),
                source,
            })?;
            if entry.path().is_dir() {
                dirs.insert(entry.file_name().to_string_lossy().into_owned());
            }
        }

        for subdir in [TASKS_DIR, HANDLERS_DIR] {
            if !dirs.contains(subdir) {
                return Err(LoadError::MissingSubdirectory {
                    dir: self.dir.clone(),
                    subdir,
                });
            }
        }
        Ok(())
    }

    pub fn tasks_dir(&self) -> PathBuf {
        self.dir.join(TASKS_DIR)
    }

    pub fn handlers_dir(&self) -> PathBuf {
        self.dir.join(HANDLERS_DIR)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.dir.join(TEMPLATES_DIR)
    }
}

/// Files in `dir` (not recursive) whose extension is one of `extensions`,
/// sorted by path.
pub(super) fn list_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, LoadError> {
    let io_error = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_dir() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.contains(&ext));
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
