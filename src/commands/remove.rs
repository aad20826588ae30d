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


use crate::commands::parse_argument;
use crate::error::Result;
use crate::storage::{CacheManager, format_size};
use colored::Colorize;

pub struct RemoveCommand<'a> {
    manager: &'a mut CacheManager,
}

impl<'a> RemoveCommand<'a> {
    pub fn new(manager: &'a mut CacheManager) -> Self {
        Self { manager }
    }

    pub fn execute(&mut self, spec: &str) -> Result<()> {
        let spec = parse_argument(spec)?;
        let removed = self.manager.remove(&spec)?;
        println!(
            "{} Removed {} ({} freed)",
            "✓".green().bold(),
            removed.spec,
            format_size(removed.size_bytes)
        );
        Ok(())
    }
}
