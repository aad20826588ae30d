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
use crate::platform::process::{run_attached, spawn_detached, split_command_line};
use crate::platform::{file_manager_program, find_tool};
use crate::storage::CacheManager;
use std::env;

/// How a cached directory gets opened.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Launcher {
    Editor(String),
    FileManager,
}

pub struct OpenCommand<'a> {
    manager: &'a mut CacheManager,
}

impl<'a> OpenCommand<'a> {
    pub fn new(manager: &'a mut CacheManager) -> Self {
        Self { manager }
    }

    pub fn execute(&mut self, spec: &str, editor: Option<&str>) -> Result<()> {
        let spec = parse_argument(spec)?;
        let path = self.manager.lookup_path(&spec)?;
        if !path.exists() {
            return Err(RepoCacheError::NotCached {
                spec: spec.to_string(),
            });
        }

        let launcher = choose_launcher(
            editor,
            self.manager.config().editor.as_deref(),
            env::var("VISUAL").ok().as_deref(),
            env::var("EDITOR").ok().as_deref(),
        );

        match launcher {
            Launcher::Editor(command_line) => {
                let (program, args) = split_command_line(&command_line).ok_or_else(|| {
                    RepoCacheError::ValidationError(format!("Invalid editor '{command_line}'"))
                })?;
                let program = find_tool(&program)?;
                run_attached(&program, &args, &path)
            }
            Launcher::FileManager => {
                let program = find_tool(file_manager_program())?;
                spawn_detached(&program, &[], &path)?;
                println!("Opened {}", path.display());
                Ok(())
            }
        }
    }
}

/// Precedence: flag, config, `$VISUAL`, `$EDITOR`. Blank values are skipped.
fn choose_launcher(
    flag: Option<&str>,
    configured: Option<&str>,
    visual: Option<&str>,
    editor: Option<&str>,
) -> Launcher {
    [flag, configured, visual, editor]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(|value| Launcher::Editor(value.to_string()))
        .unwrap_or(Launcher::FileManager)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins() {
        assert_eq!(
            choose_launcher(Some("code --wait"), Some("vim"), Some("emacs"), Some("nano")),
            Launcher::Editor("code --wait".to_string())
        );
    }

    #[test]
    fn test_config_before_environment() {
        assert_eq!(
            choose_launcher(None, Some("hx"), Some("emacs"), None),
            Launcher::Editor("hx".to_string())
        );
    }

    #[test]
    fn test_visual_before_editor_and_blank_skipped() {
        assert_eq!(
            choose_launcher(None, Some("  "), Some("emacs"), Some("nano")),
            Launcher::Editor("emacs".to_string())
        );
        assert_eq!(
            choose_launcher(None, None, Some(""), Some("nano")),
            Launcher::Editor("nano".to_string())
        );
    }

    #[test]
    fn test_file_manager_fallback() {
        assert_eq!(choose_launcher(None, None, None, None), Launcher::FileManager);
    }
}
