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


use crate::commands::{parse_argument, print_json, spinner};
use crate::error::Result;
use crate::storage::{CacheManager, FetchOptions, FetchOutcome, FetchResult, format_size};
use colored::Colorize;

pub struct FetchCommand<'a> {
    manager: &'a mut CacheManager,
}

impl<'a> FetchCommand<'a> {
    pub fn new(manager: &'a mut CacheManager) -> Self {
        Self { manager }
    }

    pub fn execute(&mut self, spec: &str, options: &FetchOptions, json: bool) -> Result<()> {
        let spec = parse_argument(spec)?;

        let progress = (!json).then(|| spinner(format!("Fetching {spec}...")));
        let result = self.manager.fetch(&spec, options);
        if let Some(progress) = &progress {
            progress.finish_and_clear();
        }
        let result = result?;

        if json {
            return print_json(&result);
        }
        println!("{}", summary(&result));
        println!("  {}", result.entry.path.display());
        Ok(())
    }
}

fn summary(result: &FetchResult) -> String {
    let spec = &result.entry.spec;
    match result.outcome {
        FetchOutcome::AlreadyCached => format!(
            "{} {spec} is already cached (use --update or --force to refresh)",
            "•".cyan()
        ),
        FetchOutcome::Updated => format!("{} Updated {spec}", "✓".green().bold()),
        FetchOutcome::Fetched => format!(
            "{} Fetched {spec} ({})",
            "✓".green().bold(),
            format_size(result.entry.size_bytes)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheEntry;
    use crate::spec::parse_spec;
    use std::path::PathBuf;

    fn result(outcome: FetchOutcome) -> FetchResult {
        let spec = parse_spec("npm:lodash@4.17.21").unwrap();
        FetchResult {
            outcome,
            entry: CacheEntry::new(spec, PathBuf::from("/cache/lodash/4.17.21"), 1536),
        }
    }

    #[test]
    fn test_summary_mentions_spec_and_size() {
        assert!(
            summary(&result(FetchOutcome::Fetched)).contains("Fetched npm:lodash@4.17.21 (1.5 KB)")
        );
        assert!(summary(&result(FetchOutcome::Updated)).contains("Updated npm:lodash@4.17.21"));
        assert!(summary(&result(FetchOutcome::AlreadyCached)).contains("already cached"));
    }
}
