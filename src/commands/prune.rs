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


use crate::commands::print_json;
use crate::error::{RepoCacheError, Result};
use crate::storage::{CacheManager, PruneCriteria, RemovalReport, format_size, parse_size};
use colored::Colorize;

pub struct PruneCommand<'a> {
    manager: &'a mut CacheManager,
}

impl<'a> PruneCommand<'a> {
    pub fn new(manager: &'a mut CacheManager) -> Self {
        Self { manager }
    }

    pub fn execute(
        &mut self,
        days: Option<u32>,
        max_size: Option<&str>,
        dry_run: bool,
        json: bool,
    ) -> Result<()> {
        let criteria = build_criteria(days, max_size, dry_run)?;
        let report = self.manager.prune(&criteria)?;

        if json {
            return print_json(&report);
        }
        print_report(&report);
        Ok(())
    }
}

fn build_criteria(
    days: Option<u32>,
    max_size: Option<&str>,
    dry_run: bool,
) -> Result<PruneCriteria> {
    if days.is_none() && max_size.is_none() {
        return Err(RepoCacheError::ValidationError(
            "prune needs --days or --max-size".to_string(),
        ));
    }

    Ok(PruneCriteria {
        older_than_days: days,
        larger_than_bytes: max_size.map(parse_size).transpose()?,
        dry_run,
    })
}

pub(crate) fn print_report(report: &RemovalReport) {
    if report.entries.is_empty() {
        println!("Nothing to remove");
        return;
    }

    let heading = if report.dry_run {
        format!("Would remove {}:", count_entries(report.entries.len()))
    } else {
        format!("{} Removed {}:", "✓".green().bold(), count_entries(report.entries.len()))
    };
    println!("{heading}");
    for entry in &report.entries {
        println!("  - {} ({})", entry.spec, format_size(entry.size_bytes));
    }
    println!();
    let verb = if report.dry_run { "Would free" } else { "Freed" };
    println!("{verb} {}", format_size(report.freed_bytes));
}

pub(crate) fn count_entries(count: usize) -> String {
    if count == 1 {
        "1 entry".to_string()
    } else {
        format!("{count} entries")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_criteria_requires_a_filter() {
        let result = build_criteria(None, None, false);
        assert!(matches!(result, Err(RepoCacheError::ValidationError(_))));
    }

    #[test]
    fn test_build_criteria_parses_size() {
        let criteria = build_criteria(Some(30), Some("500M"), true).unwrap();
        assert_eq!(criteria.older_than_days, Some(30));
        assert_eq!(criteria.larger_than_bytes, Some(500 * 1024 * 1024));
        assert!(criteria.dry_run);

        assert!(build_criteria(None, Some("huge"), false).is_err());
    }

    #[test]
    fn test_count_entries() {
        assert_eq!(count_entries(1), "1 entry");
        assert_eq!(count_entries(4), "4 entries");
    }
}
