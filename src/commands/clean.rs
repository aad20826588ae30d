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


use crate::commands::prune::{count_entries, print_report};
use crate::commands::confirm;
use crate::error::Result;
use crate::storage::{CacheManager, ListFilter, format_size};

pub struct CleanCommand<'a> {
    manager: &'a mut CacheManager,
}

impl<'a> CleanCommand<'a> {
    pub fn new(manager: &'a mut CacheManager) -> Self {
        Self { manager }
    }

    pub fn execute(&mut self, yes: bool) -> Result<()> {
        let entries = self.manager.list(&ListFilter::default());
        if entries.is_empty() {
            println!("Cache is already empty");
            return Ok(());
        }

        if !yes {
            let total: u64 = entries.iter().map(|e| e.size_bytes).sum();
            println!(
                "This will remove {} ({}) from {}",
                count_entries(entries.len()),
                format_size(total),
                self.manager.cache_root().display()
            );
            if !confirm("Do you want to continue?")? {
                println!("Aborted");
                return Ok(());
            }
        }

        let report = self.manager.clean()?;
        print_report(&report);
        Ok(())
    }
}
