// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{RepoCacheError, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Ensure the provided path exists, returning it on success.
pub fn ensure_directory(path: PathBuf) -> Result<PathBuf> {
    fs::create_dir_all(&path).map_err(|error| {
        RepoCacheError::ConfigError(format!(
            "Failed to create directory {}: {error}",
            path.display()
        ))
    })?;
    Ok(path)
}

/// Returns true when `path` is strictly below `root` without any `.` or `..` segment.
pub fn is_strictly_within(root: &Path, path: &Path) -> bool {
    if path
        .components()
        .any(|component| matches!(component, Component::ParentDir))
    {
        return false;
    }
    // `components()` drops interior `.` segments, so `/cache/owner/.` would compare equal
    // to `/cache/owner`.
    let raw = path.to_string_lossy();
    if raw
        .split(std::path::is_separator)
        .any(|segment| segment == "." || segment == "..")
    {
        return false;
    }
    path != root && path.starts_with(root)
}

/// Remove now-empty parent directories between `path` and `root` (exclusive).
///
/// Errors are ignored; a non-empty or missing directory simply stops the walk.
pub fn prune_empty_parents(root: &Path, path: &Path) {
    let mut current = path.parent();
    while let Some(dir) = current {
        if !is_strictly_within(root, dir) {
            break;
        }
        if fs::remove_dir(dir).is_err() {
            break;
        }
        log::trace!("Removed empty directory {}", dir.display());
        current = dir.parent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn ensure_directory_creates_nested_path() {
        let temp_dir = TempDir::new().unwrap();
        let nested = ensure_directory(temp_dir.path().join("owner").join("repo")).unwrap();
        assert_eq!(nested, temp_dir.path().join("owner").join("repo"));
        assert!(nested.is_dir());
    }

    #[test]
    fn strictly_within_rejects_root_and_escapes() {
        let root = Path::new("/cache");
        assert!(is_strictly_within(root, Path::new("/cache/owner/repo")));
        assert!(!is_strictly_within(root, Path::new("/cache")));
        assert!(!is_strictly_within(root, Path::new("/cache/../etc")));
        assert!(!is_strictly_within(root, Path::new("/etc/passwd")));
    }

    #[test]
    fn strictly_within_rejects_current_dir_segments() {
        let root = Path::new("/cache");
        assert!(!is_strictly_within(root, &root.join("owner").join(".")));
        assert!(!is_strictly_within(root, Path::new("/cache/./owner")));
        assert!(!is_strictly_within(root, Path::new("/cache/owner/./repo")));
        assert!(is_strictly_within(root, Path::new("/cache/owner/.github")));
    }

    #[test]
    fn prune_empty_parents_stops_at_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let leaf = root.join("@scope").join("pkg").join("1.0.0");
        fs::create_dir_all(&leaf).unwrap();
        fs::remove_dir(&leaf).unwrap();

        prune_empty_parents(root, &leaf);

        assert!(!root.join("@scope").exists());
        assert!(root.exists());
    }

    #[test]
    fn prune_empty_parents_keeps_non_empty_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let sibling = root.join("owner").join("other");
        let leaf = root.join("owner").join("repo");
        fs::create_dir_all(&sibling).unwrap();

        prune_empty_parents(root, &leaf);

        assert!(sibling.exists());
    }
}
