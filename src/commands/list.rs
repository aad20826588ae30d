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


use crate::cache::CacheEntry;
use crate::commands::{plural, print_json, relative};
use crate::error::Result;
use crate::spec::Registry;
use crate::storage::{CacheManager, ListFilter, SortOrder, format_size};
use clap::ValueEnum;
use comfy_table::{Cell, CellAlignment, Table};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    #[default]
    Name,
    Size,
    Accessed,
}

impl From<SortKey> for SortOrder {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Name => SortOrder::Name,
            SortKey::Size => SortOrder::Size,
            SortKey::Accessed => SortOrder::Accessed,
        }
    }
}

pub struct ListCommand<'a> {
    manager: &'a mut CacheManager,
}

impl<'a> ListCommand<'a> {
    pub fn new(manager: &'a mut CacheManager) -> Self {
        Self { manager }
    }

    pub fn execute(&mut self, registry: Option<&str>, sort: SortKey, json: bool) -> Result<()> {
        let filter = ListFilter {
            registry: registry.map(Registry::from_str).transpose()?,
            sort: sort.into(),
        };
        let entries = self.manager.list(&filter);

        if json {
            return print_json(&entries);
        }

        if entries.is_empty() {
            println!("Nothing cached yet");
            println!("Use 'repocache fetch <spec>' to cache a repository or package");
            return Ok(());
        }

        println!("{}", render_table(&entries));
        let total: u64 = entries.iter().map(|e| e.size_bytes).sum();
        println!();
        println!(
            "Total: {} ({})",
            format_size(total),
            plural(entries.len(), "repo")
        );
        Ok(())
    }
}

fn render_table(entries: &[CacheEntry]) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_BORDERS_ONLY);
    table.set_header(vec![
        Cell::new("Spec"),
        Cell::new("Size"),
        Cell::new("Last used"),
        Cell::new("Path"),
    ]);

    for entry in entries {
        table.add_row(vec![
            Cell::new(entry.spec.to_string()),
            Cell::new(format_size(entry.size_bytes)).set_alignment(CellAlignment::Right),
            Cell::new(relative(entry.last_accessed_at)),
            Cell::new(entry.path.display().to_string()),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepoCacheConfig;
    use crate::download::AttohttpcClient;
    use crate::spec::parse_spec;
    use crate::vcs::test_support::MockVcs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_sort_key_maps_to_sort_order() {
        assert_eq!(SortOrder::from(SortKey::Name), SortOrder::Name);
        assert_eq!(SortOrder::from(SortKey::Size), SortOrder::Size);
        assert_eq!(SortOrder::from(SortKey::Accessed), SortOrder::Accessed);
    }

    #[test]
    fn test_render_table_has_row_per_entry() {
        let entries = vec![
            CacheEntry::new(
                parse_spec("tokio-rs/tokio").unwrap(),
                PathBuf::from("/cache/tokio-rs/tokio"),
                2048,
            ),
            CacheEntry::new(
                parse_spec("pypi:requests@2.31.0").unwrap(),
                PathBuf::from("/cache/requests/2.31.0"),
                100,
            ),
        ];

        let rendered = render_table(&entries).to_string();
        assert!(rendered.contains("tokio-rs/tokio"));
        assert!(rendered.contains("pypi:requests@2.31.0"));
        assert!(rendered.contains("2.0 KB"));
        assert!(rendered.contains("Last used"));
    }

    #[test]
    fn test_unknown_registry_filter_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config = RepoCacheConfig::new(temp_dir.path().to_path_buf()).unwrap();
        let mut manager = CacheManager::with_collaborators(
            config,
            Box::new(MockVcs::new()),
            Box::new(AttohttpcClient::new()),
        );

        let result = ListCommand::new(&mut manager).execute(Some("maven"), SortKey::Name, true);
        assert!(result.is_err());
    }
}
