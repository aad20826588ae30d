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

#[derive(Debug, Deserialize)]
struct CrateResponse {
    #[serde(rename = "crate")]
    krate: CrateInfo,
    #[serde(default)]
    versions: Vec<CrateVersion>,
}

#[derive(Debug, Deserialize)]
struct CrateInfo {
    #[serde(default)]
    max_stable_version: Option<String>,
    max_version: String,
    #[serde(default)]
    repository: Option<String>,
    #[serde(default)]
    homepage: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrateVersion {
    num: String,
    dl_path: String,
    #[serde(default)]
    checksum: Option<String>,
    #[serde(default)]
    yanked: bool,
}

pub(super) fn metadata_url(base: &str, name: &str) -> String {
    format!(
        "{}/api/v1/crates/{}",
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
    let response: CrateResponse = fetch_json(http, Registry::Crates, &metadata_url(base, name))?;

    let requested = match version {
        Some(version) => version.to_string(),
        None => response
            .krate
            .max_stable_version
            .clone()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| response.krate.max_version.clone()),
    };

    let found = response
        .versions
        .iter()
        .find(|v| v.num == requested && !v.yanked)
        .ok_or_else(|| {
            RepoCacheError::registry(
                Registry::Crates,
                RegistryOperation::ResolveVersion,
                format!("version '{requested}' of '{name}' not found or yanked"),
            )
        })?;

    let repository_candidates = [&response.krate.repository, &response.krate.homepage]
        .into_iter()
        .flatten()
        .cloned()
        .collect();

    Ok(PackageRelease {
        version: found.num.clone(),
        repository_candidates,
        archive: Some(ArchiveSource {
            url: format!("{}{}", base.trim_end_matches('/'), found.dl_path),
            checksum: found.checksum.clone().map(Checksum::sha256),
        }),
    })
}
