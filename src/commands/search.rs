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
use crate::error::{RepoCacheError, Result};
use crate::platform::find_tool;
use crate::storage::CacheManager;
use std::path::Path;
use std::process::Command;

const SEARCH_TOOL: &str = "rg";

/// Full-text search over cached sources, delegated to ripgrep.
pub struct SearchCommand<'a> {
    manager: &'a mut CacheManager,
}

impl<'a> SearchCommand<'a> {
    pub fn new(manager: &'a mut CacheManager) -> Self {
        Self { manager }
    }

    pub fn execute(
        &mut self,
        pattern: &str,
        spec: Option<&str>,
        extra_args: &[String],
    ) -> Result<()> {
        let (scope, whole_cache) = match spec {
            Some(spec) => {
                let spec = parse_argument(spec)?;
                (self.manager.lookup_path(&spec)?, false)
            }
            None => (self.manager.cache_root().to_path_buf(), true),
        };

        if !scope.exists() {
            println!("Nothing cached yet");
            return Ok(());
        }

        let program = find_tool(SEARCH_TOOL)?;
        let args = search_arguments(pattern, &scope, whole_cache, extra_args);
        log::debug!("Running {} {:?}", program.display(), args);

        let status = Command::new(&program).args(&args).status()?;
        match status.code() {
            // 1 means no matches
            Some(0) | Some(1) => Ok(()),
            _ => Err(RepoCacheError::CommandFailed {
                program: SEARCH_TOOL.to_string(),
                status: status.to_string(),
            }),
        }
    }
}

fn search_arguments(
    pattern: &str,
    scope: &Path,
    whole_cache: bool,
    extra_args: &[String],
) -> Vec<String> {
    let mut args: Vec<String> = extra_args.to_vec();
    if whole_cache {
        args.push("--glob".to_string());
        args.push("!metadata.json*".to_string());
    }
    args.push("--".to_string());
    args.push(pattern.to_string());
    args.push(scope.display().to_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_arguments_for_single_entry() {
        let args = search_arguments("fn main", Path::new("/cache/a/b"), false, &[]);
        assert_eq!(args, vec!["--", "fn main", "/cache/a/b"]);
    }

    #[test]
    fn test_search_arguments_for_whole_cache_skip_index() {
        let extra = vec!["-i".to_string(), "--type=rust".to_string()];
        let args = search_arguments("-leading-dash", Path::new("/cache"), true, &extra);
        assert_eq!(
            args,
            vec![
                "-i",
                "--type=rust",
                "--glob",
                "!metadata.json*",
                "--",
                "-leading-dash",
                "/cache"
            ]
        );
    }
}
