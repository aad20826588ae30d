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
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const INDEX_VERSION: u32 = 1;

/// One fetched artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub spec: PackageSpecification,
    pub fetched_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub size_bytes: u64,
    pub path: PathBuf,
}

impl CacheEntry {
    /// A freshly fetched entry; both timestamps are now.
    pub fn new(spec: PackageSpecification, path: PathBuf, size_bytes: u64) -> Self {
        let now = Utc::now();
        Self {
            spec,
            fetched_at: now,
            last_accessed_at: now,
            size_bytes,
            path,
        }
    }
}

/// Persisted form of `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataIndex {
    pub version: u32,
    #[serde(default)]
    pub repos: Vec<CacheEntry>,
}

impl MetadataIndex {
    pub fn new() -> Self {
        Self {
            version: INDEX_VERSION,
            repos: Vec::new(),
        }
    }

    pub fn find(&self, spec: &PackageSpecification) -> Option<&CacheEntry> {
        self.repos.iter().find(|entry| &entry.spec == spec)
    }

    pub fn find_mut(&mut self, spec: &PackageSpecification) -> Option<&mut CacheEntry> {
        self.repos.iter_mut().find(|entry| &entry.spec == spec)
    }

    /// Replace any entry for the same specification with `entry`.
    pub fn upsert(&mut self, entry: CacheEntry) {
        self.remove(&entry.spec);
        self.repos.push(entry);
    }

    pub fn remove(&mut self, spec: &PackageSpecification) -> bool {
        let before = self.repos.len();
        self.repos.retain(|entry| &entry.spec != spec);
        self.repos.len() != before
    }
}

impl Default for MetadataIndex {
    fn default() -> Self {
        Self::new()
    }
}
