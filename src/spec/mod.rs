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

pub mod parser;

pub use parser::parse_spec;

use crate::error::{RepoCacheError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Source a package specification is fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Registry {
    GitHub,
    Npm,
    #[serde(rename = "pypi")]
    PyPI,
    Crates,
}

impl Registry {
    pub const ALL: [Registry; 4] = [
        Registry::GitHub,
        Registry::Npm,
        Registry::PyPI,
        Registry::Crates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Registry::GitHub => "github",
            Registry::Npm => "npm",
            Registry::PyPI => "pypi",
            Registry::Crates => "crates",
        }
    }

    pub fn is_version_control(&self) -> bool {
        matches!(self, Registry::GitHub)
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Registry {
    type Err = RepoCacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "github" | "gh" => Ok(Registry::GitHub),
            "npm" => Ok(Registry::Npm),
            "pypi" | "pip" => Ok(Registry::PyPI),
            "crates" | "cargo" | "rust" => Ok(Registry::Crates),
            _ => {
                let known: Vec<&str> = Registry::ALL.iter().map(Registry::as_str).collect();
                Err(RepoCacheError::ValidationError(format!(
                    "Unknown registry '{s}' (expected one of: {})",
                    known.join(", ")
                )))
            }
        }
    }
}

/// Normalized identifier of a fetchable package or repository.
///
/// Equality follows the cache-entry rule: GitHub names compare
/// case-insensitively, every other registry compares names exactly, and an
/// absent version equals the empty version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSpecification {
    pub registry: Registry,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl PackageSpecification {
    pub fn new(registry: Registry, name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            registry,
            name: name.into(),
            version,
        }
    }

    pub fn github(name: impl Into<String>, reference: Option<&str>) -> Self {
        Self::new(Registry::GitHub, name, reference.map(str::to_string))
    }

    pub fn version_or_empty(&self) -> &str {
        self.version.as_deref().unwrap_or("")
    }

    /// Owner and repository segments of a GitHub specification.
    pub fn owner_repo(&self) -> Option<(&str, &str)> {
        if !self.registry.is_version_control() {
            return None;
        }
        self.name.split_once('/')
    }

    fn comparable_name(&self) -> String {
        if self.registry.is_version_control() {
            self.name.to_lowercase()
        } else {
            self.name.clone()
        }
    }
}

impl PartialEq for PackageSpecification {
    fn eq(&self, other: &Self) -> bool {
        if self.registry != other.registry {
            return false;
        }

        self.comparable_name() == other.comparable_name()
            && self.version_or_empty() == other.version_or_empty()
    }
}

impl Eq for PackageSpecification {}

impl Hash for PackageSpecification {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.registry.hash(state);
        self.comparable_name().hash(state);
        self.version_or_empty().hash(state);
    }
}

impl fmt::Display for PackageSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.registry.is_version_control() {
            write!(f, "{}:", self.registry)?;
        }
        write!(f, "{}", self.name)?;
        match self.version.as_deref() {
            Some(version) if !version.is_empty() => write!(f, "@{version}"),
            _ => Ok(()),
        }
    }
}

impl FromStr for PackageSpecification {
    type Err = RepoCacheError;

    fn from_str(s: &str) -> Result<Self> {
        parse_spec(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_github_equality_ignores_case() {
        let a = PackageSpecification::github("Vercel/Next.js", None);
        let b = PackageSpecification::github("vercel/next.js", None);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_package_registry_equality_is_case_sensitive() {
        let a = PackageSpecification::new(Registry::Npm, "Lodash", None);
        let b = PackageSpecification::new(Registry::Npm, "lodash", None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_absent_version_equals_empty_version() {
        let a = PackageSpecification::new(Registry::Crates, "serde", None);
        let b = PackageSpecification::new(Registry::Crates, "serde", Some(String::new()));
        assert_eq!(a, b);

        let c = PackageSpecification::new(Registry::Crates, "serde", Some("1.0.0".to_string()));
        assert_ne!(a, c);
    }

    #[test]
    fn test_different_registries_never_equal() {
        let a = PackageSpecification::new(Registry::Npm, "left-pad", None);
        let b = PackageSpecification::new(Registry::Crates, "left-pad", None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_canonical_forms() {
        let github = PackageSpecification::github("vercel/next.js", Some("v14.0.0"));
        assert_eq!(github.to_string(), "vercel/next.js@v14.0.0");

        let npm =
            PackageSpecification::new(Registry::Npm, "@effect/cli", Some("0.73.0".to_string()));
        assert_eq!(npm.to_string(), "npm:@effect/cli@0.73.0");

        let pypi = PackageSpecification::new(Registry::PyPI, "requests", None);
        assert_eq!(pypi.to_string(), "pypi:requests");
    }

    #[test]
    fn test_registry_serde_names() {
        let json = serde_json::to_string(&Registry::PyPI).unwrap();
        assert_eq!(json, "\"pypi\"");
        let parsed: Registry = serde_json::from_str("\"github\"").unwrap();
        assert_eq!(parsed, Registry::GitHub);
    }

    #[test]
    fn test_registry_from_str_aliases() {
        assert_eq!(Registry::from_str("cargo").unwrap(), Registry::Crates);
        assert_eq!(Registry::from_str("PIP").unwrap(), Registry::PyPI);
        let error = Registry::from_str("maven").unwrap_err();
        assert!(error.to_string().contains("github, npm, pypi, crates"));
    }
}
