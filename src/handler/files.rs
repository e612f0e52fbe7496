//! File lookup module
//!
//! Resolves requested paths to absolute paths and checks them on disk.

use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Resolve a requested path to an absolute, normalized path
///
/// Relative paths are taken from the current working directory. Existing
/// paths are canonicalized (symlinks followed); missing ones are normalized
/// lexically so `.` and `..` never survive.
pub async fn resolve_path(raw: &str) -> PathBuf {
    let absolute = std::path::absolute(raw).unwrap_or_else(|_| PathBuf::from(raw));
    match fs::canonicalize(&absolute).await {
        Ok(p) => p,
        Err(_) => normalize_lexically(&absolute),
    }
}

/// Drop `.` components and fold `..` into their parent
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// True only for regular files (directories and missing paths are false)
pub async fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}
