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


use crate::commands::prune::count_entries;
use crate::commands::{print_json, relative};
use crate::error::Result;
use crate::storage::{CacheManager, CacheStats, format_size};
use colored::Colorize;

pub struct StatsCommand<'a> {
    manager: &'a mut CacheManager,
}

impl<'a> StatsCommand<'a> {
    pub fn new(manager: &'a mut CacheManager) -> Self {
        Self { manager }
    }

    pub fn execute(&mut self, json: bool) -> Result<()> {
        let stats = self.manager.stats();
        if json {
            return print_json(&stats);
        }

        println!("Cache Statistics:");
        println!("  Location: {}", self.manager.cache_root().display());
        for line in describe(&stats) {
            println!("  {line}");
        }
        Ok(())
    }
}

fn describe(stats: &CacheStats) -> Vec<String> {
    let mut lines = vec![
        format!("Entries: {}", stats.total_entries.to_string().cyan()),
        format!("Total size: {}", format_size(stats.total_size_bytes)),
    ];
    for (registry, count) in &stats.by_registry {
        lines.push(format!("  {registry}: {}", count_entries(*count)));
    }
    if let Some(oldest) = stats.oldest_access {
        lines.push(format!("Least recently used: {}", relative(oldest)));
    }
    if let Some(newest) = stats.newest_access {
        lines.push(format!("Most recently used: {}", relative(newest)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::collections::BTreeMap;

    #[test]
    fn test_describe_empty_cache() {
        let lines = describe(&CacheStats::default());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "Total size: 0 B");
    }

    #[test]
    fn test_describe_counts_by_registry() {
        let now = Utc::now();
        let stats = CacheStats {
            total_entries: 3,
            by_registry: BTreeMap::from([("github".to_string(), 2), ("npm".to_string(), 1)]),
            total_size_bytes: 3 * 1024 * 1024,
            oldest_access: Some(now - Duration::days(10)),
            newest_access: Some(now),
        };

        let lines = describe(&stats);
        assert!(lines.contains(&"Total size: 3.0 MB".to_string()));
        assert!(lines.contains(&"  github: 2 entries".to_string()));
        assert!(lines.contains(&"  npm: 1 entry".to_string()));
        assert!(lines.contains(&"Least recently used: 10 days ago".to_string()));
        assert!(lines.contains(&"Most recently used: just now".to_string()));
    }
}
