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

use super::{ArchiveSource, PackageRelease, fetch_json};
use crate::download::{Checksum, HttpClient};
use crate::error::{RegistryOperation, RepoCacheError, Result};
use crate::spec::Registry;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct Packument {
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
    #[serde(default)]
    versions: HashMap<String, VersionManifest>,
    #[serde(default)]
    repository: Option<RepositoryField>,
    #[serde(default)]
    homepage: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VersionManifest {
    #[serde(default)]
    repository: Option<RepositoryField>,
    #[serde(default)]
    homepage: Option<String>,
    dist: Option<Dist>,
}

#[derive(Debug, Deserialize)]
struct Dist {
    tarball: String,
    #[serde(default)]
    shasum: Option<String>,
}

/// `repository` is either a bare string or `{ "type": "git", "url": ... }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RepositoryField {
    Url(String),
    Object { url: Option<String> },
}

impl RepositoryField {
    fn url(&self) -> Option<&str> {
        match self {
            RepositoryField::Url(url) => Some(url),
            RepositoryField::Object { url } => url.as_deref(),
        }
    }
}

pub(super) fn metadata_url(base: &str, name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), name.replace('/', "%2F"))
}

pub(super) fn fetch_release(
    http: &dyn HttpClient,
    base: &str,
    name: &str,
    version: Option<&str>,
) -> Result<PackageRelease> {
    let packument: Packument = fetch_json(http, Registry::Npm, &metadata_url(base, name))?;

    let resolved = resolve_version(&packument, version).ok_or_else(|| {
        RepoCacheError::registry(
            Registry::Npm,
            RegistryOperation::ResolveVersion,
            format!(
                "version '{}' of '{name}' not found",
                version.unwrap_or("latest")
            ),
        )
    })?;
    log::debug!("Resolved npm:{name}@{} to {resolved}", version.unwrap_or(""));

    let manifest = &packument.versions[&resolved];

    let repository_candidates = [
        manifest.repository.as_ref().and_then(RepositoryField::url),
        packument.repository.as_ref().and_then(RepositoryField::url),
        manifest.homepage.as_deref(),
        packument.homepage.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::to_string)
    .collect();

    let archive = manifest.dist.as_ref().map(|dist| ArchiveSource {
        url: dist.tarball.clone(),
        checksum: dist.shasum.clone().map(Checksum::sha1),
    });

    Ok(PackageRelease {
        version: resolved,
        repository_candidates,
        archive,
    })
}

/// Absent → `latest` dist-tag; exact version key; else a dist-tag name.
fn resolve_version(packument: &Packument, requested: Option<&str>) -> Option<String> {
    let candidate = match requested {
        None => packument.dist_tags.get("latest")?.clone(),
        Some(version) if packument.versions.contains_key(version) => version.to_string(),
        Some(tag) => packument.dist_tags.get(tag)?.clone(),
    };

    packument
        .versions
        .contains_key(&candidate)
        .then_some(candidate)
}
