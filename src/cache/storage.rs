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

use super::models::MetadataIndex;
use crate::error::{RepoCacheError, Result};
use crate::platform::file_ops;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Load the index; a missing, unreadable or corrupt file yields an empty index.
pub fn load_index(path: &Path) -> MetadataIndex {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("No metadata at {}, starting empty", path.display());
            return MetadataIndex::new();
        }
        Err(e) => {
            log::warn!("Failed to read metadata {}: {e}", path.display());
            return MetadataIndex::new();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(index) => index,
        Err(e) => {
            log::warn!("Ignoring corrupt metadata {}: {e}", path.display());
            MetadataIndex::new()
        }
    }
}

/// Write the index to a unique temporary file next to `path` and return its location.
pub fn stage_index(index: &MetadataIndex, path: &Path) -> Result<PathBuf> {
    let parent = path.parent().ok_or_else(|| {
        RepoCacheError::ValidationError(format!(
            "Metadata path has no parent directory: {}",
            path.display()
        ))
    })?;
    fs::create_dir_all(parent)?;

    let json = serde_json::to_string_pretty(index)?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "metadata.json".to_string());
    let staged = parent.join(format!("{file_name}.{}.tmp", Uuid::new_v4()));

    fs::write(&staged, json)?;
    Ok(staged)
}

/// Atomically move a staged index over `path`.
pub fn commit_staged(staged: &Path, path: &Path) -> Result<()> {
    if let Err(e) = file_ops::atomic_rename(staged, path) {
        if let Err(cleanup) = fs::remove_file(staged) {
            log::debug!("Failed to remove {}: {cleanup}", staged.display());
        }
        return Err(e.into());
    }
    Ok(())
}

pub fn save_index(index: &MetadataIndex, path: &Path) -> Result<()> {
    let staged = stage_index(index, path)?;
    commit_staged(&staged, path)?;
    log::trace!("Saved {} entries to {}", index.repos.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::models::CacheEntry;
    use crate::spec::PackageSpecification;
    use tempfile::TempDir;

    fn index_with(name: &str) -> MetadataIndex {
        let mut index = MetadataIndex::new();
        index.upsert(CacheEntry::new(
            PackageSpecification::github(name, None),
            PathBuf::from("/cache").join(name),
            10,
        ));
        index
    }

    #[test]
    fn test_missing_file_is_empty_index() {
        let temp_dir = TempDir::new().unwrap();
        let index = load_index(&temp_dir.path().join("metadata.json"));
        assert_eq!(index, MetadataIndex::new());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("metadata.json");

        let index = index_with("owner/repo");
        save_index(&index, &path).unwrap();

        assert_eq!(load_index(&path), index);
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .flatten()
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_staged_file_sits_next_to_target() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("metadata.json");

        let staged = stage_index(&index_with("a/b"), &path).unwrap();

        assert_eq!(staged.parent(), path.parent());
        let name = staged.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("metadata.json."));
        assert!(name.ends_with(".tmp"));
        assert!(!path.exists());
    }

    #[test]
    fn test_commit_failure_removes_staged_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("metadata.json");
        let staged = stage_index(&index_with("a/b"), &path).unwrap();

        // A directory at the target makes the rename fail.
        fs::create_dir_all(path.join("blocker")).unwrap();
        assert!(commit_staged(&staged, &path).is_err());
        assert!(!staged.exists());
    }
}
