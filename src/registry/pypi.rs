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

/// `project_urls` labels that usually point at the source repository, in priority order.
const SOURCE_LABELS: &[&str] = &[
    "source",
    "source code",
    "repository",
    "code",
    "github",
    "homepage",
    "home",
];

#[derive(Debug, Deserialize)]
struct ProjectResponse {
    info: ProjectInfo,
    #[serde(default)]
    releases: HashMap<String, Vec<ReleaseFile>>,
}

#[derive(Debug, Deserialize)]
struct ProjectInfo {
    version: String,
    #[serde(default)]
    home_page: Option<String>,
    #[serde(default)]
    project_urls: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct ReleaseFile {
    packagetype: String,
    url: String,
    #[serde(default)]
    digests: Digests,
}

#[derive(Debug, Default, Deserialize)]
struct Digests {
    #[serde(default)]
    sha256: Option<String>,
}

pub(super) fn metadata_url(base: &str, name: &str) -> String {
    format!(
        "{}/pypi/{}/json",
        base.trim_end_matches('/'),
        super::encode_path_segment(name)
    )
}

pub(super) fn fetch_release(
    http: &dyn HttpClient,
    base: &str,
    name: &str,
    version: Option<&str>,
) -> Result<PackageRelease> {
    let project: ProjectResponse = fetch_json(http, Registry::PyPI, &metadata_url(base, name))?;

    let resolved = match version {
        None => project.info.version.clone(),
        Some(requested) => requested.to_string(),
    };

    let files = project
        .releases
        .get(&resolved)
        .filter(|files| !files.is_empty())
        .ok_or_else(|| {
            RepoCacheError::registry(
                Registry::PyPI,
                RegistryOperation::ResolveVersion,
                format!("release '{resolved}' of '{name}' not found"),
            )
        })?;

    let archive = files
        .iter()
        .find(|file| file.packagetype == "sdist")
        .map(|file| ArchiveSource {
            url: file.url.clone(),
            checksum: file.digests.sha256.clone().map(Checksum::sha256),
        });

    Ok(PackageRelease {
        repository_candidates: repository_candidates(&project.info),
        version: resolved,
        archive,
    })
}

fn repository_candidates(info: &ProjectInfo) -> Vec<String> {
    let mut candidates = Vec::new();

    if let Some(urls) = &info.project_urls {
        for label in SOURCE_LABELS {
            candidates.extend(
                urls.iter()
                    .filter(|(key, _)| key.trim().eq_ignore_ascii_case(label))
                    .map(|(_, url)| url.clone()),
            );
        }
    }

    if let Some(home_page) = info.home_page.as_ref().filter(|url| !url.is_empty()) {
        candidates.push(home_page.clone());
    }

    candidates
}
