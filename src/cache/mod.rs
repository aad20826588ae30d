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

//! The metadata index: which specifications are cached, where, and when they
//! were fetched and last used.

pub mod models;
pub mod storage;

pub use models::{CacheEntry, INDEX_VERSION, MetadataIndex};
pub use storage::{load_index, save_index};

use crate::error::Result;
use crate::spec::PackageSpecification;
use chrono::{Duration, Utc};
use std::path::{Path, PathBuf};

/// In-memory owner of `metadata.json`.
///
/// The file is read on first use and kept for the life of the store. Writes
/// (`add`, `remove` and their batched forms) persist immediately. Access-time
/// updates only mark the store dirty; they reach disk on [`MetadataStore::flush`],
/// on the next durable write, or when the store is dropped.
#[derive(Debug)]
pub struct MetadataStore {
    path: PathBuf,
    cache: Option<MetadataIndex>,
    dirty: bool,
}

impl MetadataStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            cache: None,
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn load(&mut self) -> &MetadataIndex {
        self.index_mut()
    }

    fn index_mut(&mut self) -> &mut MetadataIndex {
        let path = &self.path;
        self.cache.get_or_insert_with(|| load_index(path))
    }

    pub fn all(&mut self) -> &[CacheEntry] {
        &self.load().repos
    }

    pub fn find(&mut self, spec: &PackageSpecification) -> Option<CacheEntry> {
        self.load().find(spec).cloned()
    }

    pub fn add(&mut self, entry: CacheEntry) -> Result<()> {
        log::debug!("Recording {}", entry.spec);
        self.index_mut().upsert(entry);
        self.save()
    }

    pub fn add_many(&mut self, entries: Vec<CacheEntry>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let index = self.index_mut();
        for entry in entries {
            index.upsert(entry);
        }
        self.save()
    }

    pub fn remove(&mut self, spec: &PackageSpecification) -> Result<bool> {
        let removed = self.index_mut().remove(spec);
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Remove every matching entry and persist once. Returns how many were removed.
    pub fn remove_many(&mut self, specs: &[PackageSpecification]) -> Result<usize> {
        let index = self.index_mut();
        let removed = specs.iter().filter(|spec| index.remove(spec)).count();
        if removed > 0 {
            self.save()?;
        }
        Ok(removed)
    }

    /// Bump `lastAccessedAt` in memory only. Returns false when `spec` is not indexed.
    pub fn update_access_time(&mut self, spec: &PackageSpecification) -> bool {
        match self.index_mut().find_mut(spec) {
            Some(entry) => {
                entry.last_accessed_at = Utc::now();
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Entries not accessed within the last `days` days.
    pub fn find_older_than(&mut self, days: u32) -> Vec<CacheEntry> {
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        self.all()
            .iter()
            .filter(|entry| entry.last_accessed_at < cutoff)
            .cloned()
            .collect()
    }

    pub fn find_larger_than(&mut self, bytes: u64) -> Vec<CacheEntry> {
        self.all()
            .iter()
            .filter(|entry| entry.size_bytes > bytes)
            .cloned()
            .collect()
    }

    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.save()
    }

    fn save(&mut self) -> Result<()> {
        let Some(index) = &self.cache else {
            return Ok(());
        };
        // Stay dirty on failure so a later flush retries.
        self.dirty = true;
        save_index(index, &self.path)?;
        self.dirty = false;
        Ok(())
    }
}

impl Drop for MetadataStore {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            log::debug!("Failed to flush metadata on drop: {e}");
        }
    }
}
