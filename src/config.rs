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

use crate::error::{RepoCacheError, Result};
use crate::paths::{cache, home};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "REPOCACHE";
const DEFAULT_CLONE_DEPTH: u32 = 100;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_GITHUB_URL: &str = "https://github.com";
pub const DEFAULT_NPM_URL: &str = "https://registry.npmjs.org";
pub const DEFAULT_PYPI_URL: &str = "https://pypi.org";
pub const DEFAULT_CRATES_URL: &str = "https://crates.io";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoCacheConfig {
    #[serde(skip)]
    home: PathBuf,

    /// Overrides `<home>/cache` as the cache root
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    #[serde(default)]
    pub fetch: FetchConfig,

    /// Spawn a detached `git fetch` after `path` lookups
    #[serde(default = "default_true")]
    pub background_refresh: bool,

    /// Editor command used by `open`
    #[serde(default)]
    pub editor: Option<String>,

    #[serde(default)]
    pub registries: RegistryEndpoints,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_clone_depth")]
    pub depth: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_true")]
    pub verify_checksums: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_CLONE_DEPTH,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            verify_checksums: true,
        }
    }
}

/// Base URLs for the GitHub host and the registry metadata APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEndpoints {
    #[serde(default = "default_github_url")]
    pub github: String,

    #[serde(default = "default_npm_url")]
    pub npm: String,

    #[serde(default = "default_pypi_url")]
    pub pypi: String,

    #[serde(default = "default_crates_url")]
    pub crates: String,
}

impl Default for RegistryEndpoints {
    fn default() -> Self {
        Self {
            github: default_github_url(),
            npm: default_npm_url(),
            pypi: default_pypi_url(),
            crates: default_crates_url(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_clone_depth() -> u32 {
    DEFAULT_CLONE_DEPTH
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_github_url() -> String {
    DEFAULT_GITHUB_URL.to_string()
}

fn default_npm_url() -> String {
    DEFAULT_NPM_URL.to_string()
}

fn default_pypi_url() -> String {
    DEFAULT_PYPI_URL.to_string()
}

fn default_crates_url() -> String {
    DEFAULT_CRATES_URL.to_string()
}

impl RepoCacheConfig {
    /// Load configuration for the given home: `config.toml` first, then `REPOCACHE_*` env vars.
    pub fn new(home: PathBuf) -> Result<Self> {
        let config_path = home::config_file(&home);
        if config_path.exists() {
            log::debug!("Loading config from {config_path:?}");
        } else {
            log::debug!("Config file not found at {config_path:?}, using defaults");
        }

        let settings = Config::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| RepoCacheError::ConfigError(format!("Failed to load config: {e}")))?;

        let mut config: RepoCacheConfig = settings
            .try_deserialize()
            .map_err(|e| RepoCacheError::ConfigError(format!("Invalid config: {e}")))?;
        config.home = home;

        if config.fetch.depth == 0 {
            return Err(RepoCacheError::ConfigError(
                "fetch.depth must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn cache_root(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| home::cache_dir(&self.home))
    }

    pub fn metadata_path(&self) -> PathBuf {
        cache::metadata_file(&self.cache_root())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }
}

/// Load the configuration for the resolved repocache home.
pub fn new_repocache_config() -> Result<RepoCacheConfig> {
    let home = home::resolve_home()?;
    RepoCacheConfig::new(home)
}
