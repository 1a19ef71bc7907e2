//! Path resolution for wfconv's local files.
//!
//! ```text
//! ~/.config/wfconv/            # Config directory (or WFCONV_HOME / --data-dir)
//! ├── store.json               # Key-value store: users, session, settings
//! └── logs/                    # Daily rolling log files
//!     └── wfconv.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

/// Environment variable that relocates the whole wfconv directory.
pub const HOME_ENV: &str = "WFCONV_HOME";

const APP_DIR: &str = "wfconv";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Neither an override nor a platform config directory is available.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot determine config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves wfconv paths, optionally rooted at an explicit base directory.
#[derive(Debug, Clone, Default)]
pub struct WfconvPaths {
    base: Option<PathBuf>,
}

impl WfconvPaths {
    /// Creates a resolver. `base` wins over `WFCONV_HOME`, which wins over the
    /// platform config directory.
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    /// Returns the wfconv directory (e.g. `~/.config/wfconv/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(home));
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the key-value store file.
    pub fn store_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("store.json"))
    }

    /// Returns the path to the logs directory.
    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_base_wins() {
        let paths = WfconvPaths::new(Some(PathBuf::from("/tmp/wfconv-test")));
        assert_eq!(
            paths.config_dir().unwrap(),
            PathBuf::from("/tmp/wfconv-test")
        );
        assert_eq!(
            paths.store_file().unwrap(),
            PathBuf::from("/tmp/wfconv-test/store.json")
        );
        assert_eq!(
            paths.logs_dir().unwrap(),
            PathBuf::from("/tmp/wfconv-test/logs")
        );
    }

    #[test]
    fn test_store_file_under_config_dir() {
        let paths = WfconvPaths::default();
        if let (Ok(dir), Ok(file)) = (paths.config_dir(), paths.store_file()) {
            assert!(file.starts_with(&dir));
            assert!(file.ends_with("store.json"));
        }
    }
}
