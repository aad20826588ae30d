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


use crate::commands::{parse_argument, print_json, relative};
use crate::error::Result;
use crate::storage::{CacheManager, EntryInfo, format_size};
use chrono::Local;
use colored::Colorize;

pub struct InfoCommand<'a> {
    manager: &'a mut CacheManager,
}

impl<'a> InfoCommand<'a> {
    pub fn new(manager: &'a mut CacheManager) -> Self {
        Self { manager }
    }

    pub fn execute(&mut self, spec: &str, json: bool) -> Result<()> {
        let spec = parse_argument(spec)?;
        let info = self.manager.info(&spec)?;

        if json {
            return print_json(&info);
        }
        for line in describe(&info) {
            println!("{line}");
        }
        Ok(())
    }
}

fn describe(info: &EntryInfo) -> Vec<String> {
    let entry = &info.entry;
    let mut lines = vec![
        entry.spec.to_string().bold().to_string(),
        format!("  Registry: {}", entry.spec.registry),
        format!("  Path: {}", entry.path.display()),
        format!("  Size: {}", format_size(entry.size_bytes)),
        format!(
            "  Fetched: {}",
            entry.fetched_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ),
        format!("  Last used: {}", relative(entry.last_accessed_at)),
    ];

    if let Some(reference) = &info.current_ref {
        lines.push(format!("  Checked out: {}", reference.cyan()));
    } else if !info.version_controlled {
        lines.push("  Source: extracted archive".to_string());
    }
    lines
}
