//! Where command output files land.

use std::path::{Path, PathBuf};

/// A directory (or nothing) gets `default_name` appended; anything else is
/// used as the file path.
pub fn resolve_output(output: Option<&Path>, default_name: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(default_name),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(default_name),
    }
}
