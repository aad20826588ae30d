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

use crate::spec::PackageSpecification;
use std::fs;
use std::path::{Path, PathBuf};

pub const METADATA_FILE: &str = "metadata.json";
pub const DEFAULT_VERSION_DIR: &str = "default";

pub fn metadata_file(cache_root: &Path) -> PathBuf {
    cache_root.join(METADATA_FILE)
}

/// Deterministic location for a specification, ignoring any legacy casing on disk.
///
/// GitHub entries live at `<root>/<owner>/<repo>`; package registry entries at
/// `<root>/<name>/<version-or-default>`.
pub fn normalized_path(cache_root: &Path, spec: &PackageSpecification) -> PathBuf {
    let mut path = cache_root.to_path_buf();
    for segment in spec.name.split('/') {
        path.push(segment);
    }

    if !spec.registry.is_version_control() {
        match spec.version.as_deref() {
            Some(version) if !version.is_empty() => path.push(version),
            _ => path.push(DEFAULT_VERSION_DIR),
        }
    }

    path
}

/// Maps specifications to their on-disk cache directory.
#[derive(Debug, Clone)]
pub struct CachePathResolver {
    cache_root: PathBuf,
}

impl CachePathResolver {
    pub fn new(cache_root: PathBuf) -> Self {
        Self { cache_root }
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Resolve the directory for `spec`. Never fails and never creates directories.
    pub fn resolve(&self, spec: &PackageSpecification) -> PathBuf {
        let normalized = normalized_path(&self.cache_root, spec);
        if !spec.registry.is_version_control() || normalized.exists() {
            return normalized;
        }

        match self.find_legacy_path(spec) {
            Some(legacy) => {
                log::debug!(
                    "Using legacy-cased cache path {} for {spec}",
                    legacy.display()
                );
                legacy
            }
            None => normalized,
        }
    }

    fn find_legacy_path(&self, spec: &PackageSpecification) -> Option<PathBuf> {
        let (owner, repo) = spec.owner_repo()?;
        let owner_dir = find_entry_ignoring_case(&self.cache_root, owner)?;
        find_entry_ignoring_case(&owner_dir, repo)
    }
}

fn find_entry_ignoring_case(dir: &Path, name: &str) -> Option<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::trace!("Legacy path scan skipped {}: {e}", dir.display());
            return None;
        }
    };

    entries
        .flatten()
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .find(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|candidate| candidate.to_lowercase() == name.to_lowercase())
                .unwrap_or(false)
        })
        .map(|entry| entry.path())
}
