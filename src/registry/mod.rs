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

//! Registry resolution: turning a specification into source content on disk.
//!
//! Every registry funnels into an ordered list of [`Strategy`] values that are
//! tried until one succeeds. GitHub specifications become one or two direct
//! checkouts. Package registries are queried for a release first; the release
//! yields an optional checkout of its declared source repository at the
//! matching tag, followed by the published archive.

mod crates;
mod npm;
mod pypi;
pub mod repository;

pub use repository::{Host, RepositoryRef};

use crate::archive::extract_archive;
use crate::config::RegistryEndpoints;
use crate::download::{Checksum, HttpClient, download_archive};
use crate::error::{RegistryOperation, RepoCacheError, Result};
use crate::platform::file_ops;
use crate::spec::{PackageSpecification, Registry};
use crate::vcs::{CheckoutOptions, VersionControl};
use serde::de::DeserializeOwned;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub full_history: bool,
}

/// Downloadable archive for a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSource {
    pub url: String,
    pub checksum: Option<Checksum>,
}

/// Registry metadata reduced to what resolution needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRelease {
    pub version: String,
    /// Repository and home-page URLs in preference order.
    pub repository_candidates: Vec<String>,
    pub archive: Option<ArchiveSource>,
}

impl PackageRelease {
    pub fn repository(&self) -> Option<RepositoryRef> {
        self.repository_candidates
            .iter()
            .find_map(|candidate| RepositoryRef::parse(candidate))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Strategy {
    Checkout {
        url: String,
        options: CheckoutOptions,
    },
    Archive(Option<ArchiveSource>),
}

impl Strategy {
    fn describe(&self) -> String {
        match self {
            Strategy::Checkout { url, options } => match &options.reference {
                Some(reference) => format!("checkout of {url} at {reference}"),
                None => format!("checkout of {url}"),
            },
            Strategy::Archive(Some(source)) => format!("archive {}", source.url),
            Strategy::Archive(None) => "archive".to_string(),
        }
    }
}

/// Tag conventionally used for a release version: `1.2.3` → `v1.2.3`.
pub fn release_tag(version: &str) -> String {
    if version.starts_with('v') {
        version.to_string()
    } else {
        format!("v{version}")
    }
}

pub struct RegistryResolver<'a> {
    vcs: &'a dyn VersionControl,
    http: &'a dyn HttpClient,
    endpoints: &'a RegistryEndpoints,
    depth: u32,
    verify_checksums: bool,
}

impl<'a> RegistryResolver<'a> {
    pub fn new(
        vcs: &'a dyn VersionControl,
        http: &'a dyn HttpClient,
        endpoints: &'a RegistryEndpoints,
        depth: u32,
    ) -> Self {
        Self {
            vcs,
            http,
            endpoints,
            depth,
            verify_checksums: true,
        }
    }

    pub fn with_checksum_verification(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    /// Populate `dest` with the source for `spec`.
    pub fn resolve(
        &self,
        spec: &PackageSpecification,
        dest: &Path,
        options: &ResolveOptions,
    ) -> Result<()> {
        let depth = if options.full_history {
            None
        } else {
            Some(self.depth)
        };

        let strategies = match spec.registry {
            Registry::GitHub => self.github_strategies(spec, depth),
            _ => {
                let release = self.fetch_release(spec)?;
                log::info!("Resolved {spec} to version {}", release.version);
                self.release_strategies(&release, depth)
            }
        };

        self.run(spec.registry, &strategies, dest)
    }

    /// Query a package registry for the release named by `spec`.
    pub fn fetch_release(&self, spec: &PackageSpecification) -> Result<PackageRelease> {
        let version = spec.version.as_deref();
        match spec.registry {
            Registry::Npm => {
                npm::fetch_release(self.http, &self.endpoints.npm, &spec.name, version)
            }
            Registry::PyPI => {
                pypi::fetch_release(self.http, &self.endpoints.pypi, &spec.name, version)
            }
            Registry::Crates => {
                crates::fetch_release(self.http, &self.endpoints.crates, &spec.name, version)
            }
            Registry::GitHub => Err(RepoCacheError::ValidationError(format!(
                "'{spec}' has no registry metadata"
            ))),
        }
    }

    fn github_strategies(&self, spec: &PackageSpecification, depth: Option<u32>) -> Vec<Strategy> {
        let url = format!(
            "{}/{}.git",
            self.endpoints.github.trim_end_matches('/'),
            spec.name
        );
        let default_branch = CheckoutOptions::new(depth);

        let mut strategies = Vec::with_capacity(2);
        if let Some(reference) = &spec.version {
            strategies.push(Strategy::Checkout {
                url: url.clone(),
                options: default_branch.clone().with_reference(reference.clone()),
            });
        }
        strategies.push(Strategy::Checkout {
            url,
            options: default_branch,
        });
        strategies
    }

    fn release_strategies(&self, release: &PackageRelease, depth: Option<u32>) -> Vec<Strategy> {
        let mut strategies = Vec::with_capacity(2);

        match release.repository() {
            Some(repository) => strategies.push(Strategy::Checkout {
                url: repository.clone_url(&self.endpoints.github),
                options: CheckoutOptions::new(depth).with_reference(release_tag(&release.version)),
            }),
            None => log::debug!("No recognizable source repository; using the archive"),
        }
        strategies.push(Strategy::Archive(release.archive.clone()));
        strategies
    }

    fn run(&self, registry: Registry, strategies: &[Strategy], dest: &Path) -> Result<()> {
        let mut last_error = None;

        for (index, strategy) in strategies.iter().enumerate() {
            if index > 0 {
                clear_destination(dest);
            }

            log::debug!("Trying {}", strategy.describe());
            match self.attempt(registry, strategy, dest) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    if index + 1 < strategies.len() {
                        log::warn!("{} failed, falling back: {e}", strategy.describe());
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            RepoCacheError::registry(registry, RegistryOperation::Checkout, "no strategy available")
        }))
    }

    fn attempt(&self, registry: Registry, strategy: &Strategy, dest: &Path) -> Result<()> {
        match strategy {
            Strategy::Checkout { url, options } => self
                .vcs
                .checkout(url, dest, options)
                .map_err(|e| RepoCacheError::registry(registry, RegistryOperation::Checkout, e)),
            Strategy::Archive(None) => Err(RepoCacheError::registry(
                registry,
                RegistryOperation::DownloadArchive,
                "no source archive published for this version",
            )),
            Strategy::Archive(Some(source)) => {
                let checksum = source
                    .checksum
                    .as_ref()
                    .filter(|_| self.verify_checksums);
                let staging = download_archive(self.http, registry, &source.url, checksum)?;

                let extracted = extract_archive(staging.path(), dest).map_err(|e| {
                    RepoCacheError::registry(registry, RegistryOperation::ExtractArchive, e)
                });

                if let Err(e) = staging.close() {
                    log::debug!("Failed to remove staging archive: {e}");
                }
                extracted.map(|count| log::debug!("Extracted {count} entries"))
            }
        }
    }
}

/// GET `url` and decode a JSON body; 404 and other non-2xx statuses become
/// `fetch-metadata` failures.
fn fetch_json<T: DeserializeOwned>(
    http: &dyn HttpClient,
    registry: Registry,
    url: &str,
) -> Result<T> {
    let mut response = http.get(url)?;

    if response.status() == 404 {
        return Err(RepoCacheError::registry(
            registry,
            RegistryOperation::FetchMetadata,
            format!("package not found ({url})"),
        ));
    }
    if !response.is_success() {
        return Err(RepoCacheError::registry(
            registry,
            RegistryOperation::FetchMetadata,
            format!("HTTP {} from {url}", response.status()),
        ));
    }

    let body = response.text().map_err(|e| RepoCacheError::network(url, e))?;
    serde_json::from_str(&body).map_err(|e| {
        RepoCacheError::registry(
            registry,
            RegistryOperation::FetchMetadata,
            format!("invalid metadata from {url}: {e}"),
        )
    })
}

/// Percent-encode everything outside the URL unreserved set.
fn encode_path_segment(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(char::from(byte))
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

fn clear_destination(dest: &Path) {
    if dest.exists() {
        if let Err(e) = file_ops::remove_dir_all(dest) {
            log::debug!("Failed to clear {}: {e}", dest.display());
        }
    }
}
