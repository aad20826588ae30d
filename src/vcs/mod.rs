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

//! Version-control checkouts of source repositories.

pub mod git;

pub use git::GitClient;

use crate::error::Result;
use std::path::Path;

/// Options for a fresh checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutOptions {
    /// History depth; `None` clones the full history.
    pub depth: Option<u32>,
    /// Branch or tag to check out instead of the remote default.
    pub reference: Option<String>,
}

impl CheckoutOptions {
    pub fn new(depth: Option<u32>) -> Self {
        Self {
            depth,
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

pub trait VersionControl: Send + Sync {
    /// Create a working copy of `url` at `dest`.
    fn checkout(&self, url: &str, dest: &Path, options: &CheckoutOptions) -> Result<()>;

    /// Bring an existing working copy up to date with its remote.
    fn refresh(&self, path: &Path) -> Result<()>;

    /// Fetch remote refs and tags without touching the working tree.
    fn fetch_refs_only(&self, path: &Path) -> Result<()>;

    /// Start [`VersionControl::fetch_refs_only`] as a detached child process.
    ///
    /// Returns once the process is spawned; its outcome is never observed.
    fn spawn_fetch_refs(&self, path: &Path) -> Result<()>;

    fn is_version_controlled(&self, path: &Path) -> bool;

    /// Human-readable description of what the working copy has checked out:
    /// a branch name, an exact tag, a short commit id, or `unknown`.
    fn current_ref(&self, path: &Path) -> String;
}
