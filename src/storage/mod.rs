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

pub mod formatting;
pub mod repository;

pub use formatting::{format_relative_time, format_size, parse_size};
pub use repository::{
    CacheManager, CacheStats, EntryInfo, FetchOptions, FetchOutcome, FetchResult, ListFilter,
    PruneCriteria, RemovalReport, SortOrder,
};

use crate::error::Result;
use std::path::Path;

/// Total size of the regular files under `path`. Symlinks are not followed.
pub fn directory_size(path: &Path) -> Result<u64> {
    let mut total_size = 0u64;

    for entry in walkdir::WalkDir::new(path).follow_links(false) {
        let entry = entry?;
        if entry.file_type().is_file() {
            total_size += entry.metadata()?.len();
        }
    }

    Ok(total_size)
}
