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

use super::directory_size;
use crate::cache::{CacheEntry, MetadataStore};
use crate::config::RepoCacheConfig;
use crate::download::{AttohttpcClient, HttpClient};
use crate::error::{RepoCacheError, Result};
use crate::paths::CachePathResolver;
use crate::paths::shared::{ensure_directory, is_strictly_within, prune_empty_parents};
use crate::platform::file_ops;
use crate::registry::{RegistryResolver, ResolveOptions};
use crate::spec::{PackageSpecification, Registry};
use crate::vcs::{GitClient, VersionControl};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Discard any cached copy and fetch again.
    pub force: bool,
    /// Refresh a cached checkout in place; archives are fetched again.
    pub update: bool,
    pub full_history: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchOutcome {
    AlreadyCached,
    Updated,
    Fetched,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchResult {
    pub outcome: FetchOutcome,
    pub entry: CacheEntry,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryInfo {
    #[serde(flatten)]
    pub entry: CacheEntry,
    pub version_controlled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_ref: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Name,
    Size,
    Accessed,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListFilter {
    pub registry: Option<Registry>,
    pub sort: SortOrder,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PruneCriteria {
    pub older_than_days: Option<u32>,
    pub larger_than_bytes: Option<u64>,
    pub dry_run: bool,
}

/// Entries removed (or, for a dry run, that would be removed).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalReport {
    pub entries: Vec<CacheEntry>,
    pub freed_bytes: u64,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub total_entries: usize,
    pub by_registry: BTreeMap<String, usize>,
    pub total_size_bytes: u64,
    pub oldest_access: Option<DateTime<Utc>>,
    pub newest_access: Option<DateTime<Utc>>,
}

/// Orchestrates the metadata index, the cache layout and registry resolution.
pub struct CacheManager {
    config: RepoCacheConfig,
    store: MetadataStore,
    paths: CachePathResolver,
    vcs: Box<dyn VersionControl>,
    http: Box<dyn HttpClient>,
}

impl CacheManager {
    pub fn new(config: RepoCacheConfig) -> Self {
        let http = AttohttpcClient::new().with_timeout(config.http_timeout());
        Self::with_collaborators(config, Box::new(GitClient::new()), Box::new(http))
    }

    pub fn with_collaborators(
        config: RepoCacheConfig,
        vcs: Box<dyn VersionControl>,
        http: Box<dyn HttpClient>,
    ) -> Self {
        let cache_root = config.cache_root();
        Self {
            store: MetadataStore::new(config.metadata_path()),
            paths: CachePathResolver::new(cache_root),
            config,
            vcs,
            http,
        }
    }

    pub fn config(&self) -> &RepoCacheConfig {
        &self.config
    }

    pub fn cache_root(&self) -> &Path {
        self.paths.cache_root()
    }

    pub fn fetch(
        &mut self,
        spec: &PackageSpecification,
        options: &FetchOptions,
    ) -> Result<FetchResult> {
        if let Some(existing) = self.store.find(spec) {
            let present = existing.path.exists();

            if present && !options.force && !options.update {
                log::info!("{spec} is already cached at {}", existing.path.display());
                self.store.update_access_time(spec);
                let entry = self.store.find(spec).unwrap_or(existing);
                return Ok(FetchResult {
                    outcome: FetchOutcome::AlreadyCached,
                    entry,
                });
            }

            if present
                && options.update
                && !options.force
                && self.vcs.is_version_controlled(&existing.path)
            {
                self.vcs.refresh(&existing.path)?;
                let entry = self.record(spec, existing.path)?;
                return Ok(FetchResult {
                    outcome: FetchOutcome::Updated,
                    entry,
                });
            }
        }

        let dest = self.paths.resolve(spec);
        self.ensure_within_cache(&dest)?;
        if dest.exists() {
            log::debug!("Clearing {} before fetch", dest.display());
            file_ops::remove_dir_all(&dest)?;
        } else if let Some(parent) = dest.parent() {
            ensure_directory(parent.to_path_buf())?;
        }

        let resolve_options = ResolveOptions {
            full_history: options.full_history,
        };
        let resolved = RegistryResolver::new(
            self.vcs.as_ref(),
            self.http.as_ref(),
            &self.config.registries,
            self.config.fetch.depth,
        )
        .with_checksum_verification(self.config.fetch.verify_checksums)
        .resolve(spec, &dest, &resolve_options);

        if let Err(e) = resolved {
            self.discard_partial(&dest);
            return Err(e);
        }

        let entry = self.record(spec, dest)?;
        log::info!("Cached {spec} at {}", entry.path.display());
        Ok(FetchResult {
            outcome: FetchOutcome::Fetched,
            entry,
        })
    }

    /// Path of a cached entry. Touches its access time and, for git
    /// checkouts, starts a detached refresh of remote refs.
    pub fn lookup_path(&mut self, spec: &PackageSpecification) -> Result<PathBuf> {
        let entry = self.find_or_not_cached(spec)?;
        self.store.update_access_time(spec);

        if !entry.path.exists() {
            log::warn!(
                "Cached directory for {spec} is missing: {}",
                entry.path.display()
            );
        } else if self.config.background_refresh && self.vcs.is_version_controlled(&entry.path) {
            if let Err(e) = self.vcs.spawn_fetch_refs(&entry.path) {
                log::debug!("Background refresh for {spec} not started: {e}");
            }
        }

        Ok(entry.path)
    }

    pub fn info(&mut self, spec: &PackageSpecification) -> Result<EntryInfo> {
        self.find_or_not_cached(spec)?;
        self.store.update_access_time(spec);
        let entry = self.find_or_not_cached(spec)?;

        let version_controlled = entry.path.exists() && self.vcs.is_version_controlled(&entry.path);
        let current_ref = version_controlled.then(|| self.vcs.current_ref(&entry.path));

        Ok(EntryInfo {
            entry,
            version_controlled,
            current_ref,
        })
    }

    pub fn list(&mut self, filter: &ListFilter) -> Vec<CacheEntry> {
        let mut entries: Vec<CacheEntry> = self
            .store
            .all()
            .iter()
            .filter(|entry| filter.registry.is_none_or(|r| entry.spec.registry == r))
            .cloned()
            .collect();

        match filter.sort {
            SortOrder::Name => entries.sort_by_cached_key(|e| e.spec.to_string().to_lowercase()),
            SortOrder::Size => entries.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes)),
            SortOrder::Accessed => {
                entries.sort_by(|a, b| b.last_accessed_at.cmp(&a.last_accessed_at))
            }
        }
        entries
    }

    pub fn remove(&mut self, spec: &PackageSpecification) -> Result<CacheEntry> {
        let entry = self.find_or_not_cached(spec)?;
        self.remove_directory(&entry.path)?;
        self.store.remove(spec)?;
        log::info!("Removed {spec}");
        Ok(entry)
    }

    /// Remove entries that match either criterion.
    pub fn prune(&mut self, criteria: &PruneCriteria) -> Result<RemovalReport> {
        let mut candidates: Vec<CacheEntry> = Vec::new();
        if let Some(days) = criteria.older_than_days {
            candidates.extend(self.store.find_older_than(days));
        }
        if let Some(bytes) = criteria.larger_than_bytes {
            for entry in self.store.find_larger_than(bytes) {
                if !candidates.iter().any(|c| c.spec == entry.spec) {
                    candidates.push(entry);
                }
            }
        }

        if criteria.dry_run {
            return Ok(RemovalReport {
                freed_bytes: candidates.iter().map(|e| e.size_bytes).sum(),
                entries: candidates,
                dry_run: true,
            });
        }
        self.remove_entries(candidates)
    }

    /// Remove every cached entry.
    pub fn clean(&mut self) -> Result<RemovalReport> {
        let entries = self.store.all().to_vec();
        self.remove_entries(entries)
    }

    pub fn stats(&mut self) -> CacheStats {
        let entries = self.store.all();

        let mut by_registry = BTreeMap::new();
        for entry in entries {
            *by_registry
                .entry(entry.spec.registry.to_string())
                .or_insert(0) += 1;
        }

        CacheStats {
            total_entries: entries.len(),
            by_registry,
            total_size_bytes: entries.iter().map(|e| e.size_bytes).sum(),
            oldest_access: entries.iter().map(|e| e.last_accessed_at).min(),
            newest_access: entries.iter().map(|e| e.last_accessed_at).max(),
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.store.flush()
    }

    fn find_or_not_cached(&mut self, spec: &PackageSpecification) -> Result<CacheEntry> {
        self.store
            .find(spec)
            .ok_or_else(|| RepoCacheError::NotCached {
                spec: spec.to_string(),
            })
    }

    /// Measure `path` and replace the entry for `spec` wholesale.
    fn record(&mut self, spec: &PackageSpecification, path: PathBuf) -> Result<CacheEntry> {
        let size = directory_size(&path)?;
        let entry = CacheEntry::new(spec.clone(), path, size);
        self.store.add(entry.clone())?;
        Ok(entry)
    }

    fn remove_entries(&mut self, entries: Vec<CacheEntry>) -> Result<RemovalReport> {
        let mut removed = Vec::with_capacity(entries.len());
        for entry in entries {
            match self.remove_directory(&entry.path) {
                Ok(()) => removed.push(entry),
                Err(e) => log::warn!("Skipping {}: {e}", entry.spec),
            }
        }

        let specs: Vec<PackageSpecification> = removed.iter().map(|e| e.spec.clone()).collect();
        self.store.remove_many(&specs)?;

        Ok(RemovalReport {
            freed_bytes: removed.iter().map(|e| e.size_bytes).sum(),
            entries: removed,
            dry_run: false,
        })
    }

    fn ensure_within_cache(&self, path: &Path) -> Result<()> {
        if is_strictly_within(self.cache_root(), path) {
            Ok(())
        } else {
            Err(RepoCacheError::SecurityError(format!(
                "Refusing to touch directory outside of the cache root: {}",
                path.display()
            )))
        }
    }

    fn remove_directory(&self, path: &Path) -> Result<()> {
        self.ensure_within_cache(path)?;
        file_ops::remove_dir_all(path)?;
        prune_empty_parents(self.cache_root(), path);
        Ok(())
    }

    fn discard_partial(&self, dest: &Path) {
        if !dest.exists() {
            prune_empty_parents(self.cache_root(), dest);
            return;
        }
        match file_ops::remove_dir_all(dest) {
            Ok(()) => prune_empty_parents(self.cache_root(), dest),
            Err(e) => log::debug!("Failed to remove partial fetch {}: {e}", dest.display()),
        }
    }
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod repository_tests;
