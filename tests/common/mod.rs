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


//! Helpers for driving the `repocache` binary against an isolated home.

use assert_cmd::Command;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestHome {
    dir: TempDir,
}

#[allow(dead_code)]
impl TestHome {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn cache_root(&self) -> PathBuf {
        self.path().join("cache")
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.cache_root().join("metadata.json")
    }

    /// A command with `REPOCACHE_HOME` pointing here and background refresh off.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("repocache").unwrap();
        cmd.env("REPOCACHE_HOME", self.path())
            .env("REPOCACHE_BACKGROUND_REFRESH", "false")
            .env_remove("RUST_LOG")
            .env_remove("VISUAL")
            .env_remove("EDITOR");
        cmd
    }

    /// Create `relative` under the cache root with one file of `size` bytes and
    /// return an index entry describing it.
    pub fn seed_dir(&self, spec: Value, relative: &str, size: usize, days_ago: i64) -> Value {
        let dir = self.cache_root().join(relative);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("README.md"), vec![b'x'; size]).unwrap();

        let accessed: DateTime<Utc> = Utc::now() - Duration::days(days_ago);
        json!({
            "spec": spec,
            "fetchedAt": accessed,
            "lastAccessedAt": accessed,
            "sizeBytes": size,
            "path": dir,
        })
    }

    pub fn write_index(&self, entries: Vec<Value>) {
        fs::create_dir_all(self.cache_root()).unwrap();
        let index = json!({ "version": 1, "repos": entries });
        fs::write(
            self.metadata_path(),
            serde_json::to_string_pretty(&index).unwrap(),
        )
        .unwrap();
    }

    pub fn read_index(&self) -> Value {
        let content = fs::read_to_string(self.metadata_path()).unwrap();
        serde_json::from_str(&content).unwrap()
    }
}
