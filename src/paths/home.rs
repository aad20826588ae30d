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
use dirs::home_dir;
use std::path::{Path, PathBuf};

pub const HOME_ENV_VAR: &str = "REPOCACHE_HOME";
pub const HOME_DIR_NAME: &str = ".repocache";
pub const CACHE_DIR: &str = "cache";
pub const CONFIG_FILE: &str = "config.toml";

/// Resolve the repocache home: `$REPOCACHE_HOME` when absolute, else `~/.repocache`.
pub fn resolve_home() -> Result<PathBuf> {
    if let Ok(value) = std::env::var(HOME_ENV_VAR) {
        let path = PathBuf::from(value);
        if path.is_absolute() {
            return Ok(path);
        }
        log::warn!(
            "Ignoring {HOME_ENV_VAR}={}: path must be absolute",
            path.display()
        );
    }

    home_dir()
        .map(|home| home.join(HOME_DIR_NAME))
        .ok_or_else(|| {
            RepoCacheError::ConfigError("Unable to determine home directory".to_string())
        })
}

pub fn cache_dir(home: &Path) -> PathBuf {
    home.join(CACHE_DIR)
}

pub fn config_file(home: &Path) -> PathBuf {
    home.join(CONFIG_FILE)
}
