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

//! Locating and launching external programs.

use crate::error::{RepoCacheError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Resolve an executable on `PATH`.
pub fn find_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|e| {
        log::debug!("Lookup of '{name}' failed: {e}");
        RepoCacheError::ToolNotFound(name.to_string())
    })
}

/// Program used to reveal a directory in the desktop file manager.
pub fn file_manager_program() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(windows) {
        "explorer"
    } else {
        "xdg-open"
    }
}

/// Split an editor setting such as `code --wait` into program and arguments.
pub fn split_command_line(command_line: &str) -> Option<(String, Vec<String>)> {
    let mut parts = command_line.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

/// Launch `program args... target` without waiting for it to exit.
pub fn spawn_detached(program: &Path, args: &[String], target: &Path) -> Result<()> {
    log::debug!("Launching {} {:?} {}", program.display(), args, target.display());
    Command::new(program)
        .args(args)
        .arg(target)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}

/// Run `program args... target` attached to the terminal and wait for it.
pub fn run_attached(program: &Path, args: &[String], target: &Path) -> Result<()> {
    log::debug!("Running {} {:?} {}", program.display(), args, target.display());
    let status = Command::new(program).args(args).arg(target).status()?;
    if !status.success() {
        return Err(RepoCacheError::CommandFailed {
            program: program.display().to_string(),
            status: status.to_string(),
        });
    }
    Ok(())
}
