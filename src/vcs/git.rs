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

use super::{CheckoutOptions, VersionControl};
use crate::error::{RepoCacheError, Result};
use crate::platform::find_tool;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const GIT: &str = "git";
const UNKNOWN_REF: &str = "unknown";

/// `git` subprocess adapter.
///
/// The executable is looked up on `PATH` for every operation so a missing
/// git surfaces as [`RepoCacheError::ToolNotFound`] at the point of use.
#[derive(Debug, Default)]
pub struct GitClient {
    program: Option<PathBuf>,
}

impl GitClient {
    pub fn new() -> Self {
        Self { program: None }
    }

    /// Use a specific git executable instead of searching `PATH`.
    pub fn with_program(program: PathBuf) -> Self {
        Self {
            program: Some(program),
        }
    }

    fn program(&self) -> Result<PathBuf> {
        match &self.program {
            Some(program) => Ok(program.clone()),
            None => find_tool(GIT),
        }
    }

    fn command(&self, dir: Option<&Path>) -> Result<Command> {
        let mut command = Command::new(self.program()?);
        command.env("GIT_TERMINAL_PROMPT", "0");
        if let Some(dir) = dir {
            command.current_dir(dir);
        }
        Ok(command)
    }

    /// Run git to completion, turning a non-zero exit into a version-control error.
    fn run<I, S>(&self, operation: &str, dir: Option<&Path>, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = self.command(dir)?;
        command.args(args).stdin(Stdio::null());
        log::debug!("Running {command:?}");

        let output = command
            .output()
            .map_err(|e| RepoCacheError::version_control(operation, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            };
            return Err(RepoCacheError::version_control(operation, message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn query(&self, path: &Path, args: &[&str]) -> Option<String> {
        self.run("query", Some(path), args)
            .ok()
            .filter(|value| !value.is_empty())
    }
}

impl VersionControl for GitClient {
    fn checkout(&self, url: &str, dest: &Path, options: &CheckoutOptions) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut args: Vec<String> = vec!["clone".into(), "--quiet".into()];
        if let Some(depth) = options.depth {
            args.push("--depth".into());
            args.push(depth.to_string());
        }
        if let Some(reference) = &options.reference {
            args.push("--branch".into());
            args.push(reference.clone());
        }
        args.push(url.to_string());
        args.push(dest.to_string_lossy().into_owned());

        log::info!("Cloning {url} into {}", dest.display());
        self.run("clone", None, &args)?;
        Ok(())
    }

    fn refresh(&self, path: &Path) -> Result<()> {
        log::info!("Refreshing {}", path.display());
        self.run("fetch", Some(path), ["fetch", "--quiet", "origin"])?;

        if let Err(e) = self.run(
            "reset",
            Some(path),
            ["reset", "--hard", "--quiet", "origin/HEAD"],
        ) {
            log::debug!("Reset to origin/HEAD failed ({e}), trying upstream");
            self.run("reset", Some(path), ["reset", "--hard", "--quiet", "@{upstream}"])?;
        }
        Ok(())
    }

    fn fetch_refs_only(&self, path: &Path) -> Result<()> {
        self.run("fetch", Some(path), ["fetch", "--quiet", "--tags", "origin"])?;
        Ok(())
    }

    fn spawn_fetch_refs(&self, path: &Path) -> Result<()> {
        let mut command = self.command(Some(path))?;
        command
            .args(["fetch", "--quiet", "--tags", "origin"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = command
            .spawn()
            .map_err(|e| RepoCacheError::version_control("fetch", e))?;
        log::debug!(
            "Started background fetch (pid {}) in {}",
            child.id(),
            path.display()
        );
        Ok(())
    }

    fn is_version_controlled(&self, path: &Path) -> bool {
        path.join(".git").exists()
    }

    fn current_ref(&self, path: &Path) -> String {
        self.query(path, &["symbolic-ref", "--short", "-q", "HEAD"])
            .or_else(|| self.query(path, &["describe", "--tags", "--exact-match"]))
            .or_else(|| self.query(path, &["rev-parse", "--short", "HEAD"]))
            .unwrap_or_else(|| UNKNOWN_REF.to_string())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git_available() -> bool {
        find_tool(GIT).is_ok()
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new(GIT)
            .args([
                "-c",
                "user.name=Test",
                "-c",
                "user.email=test@example.com",
                "-c",
                "commit.gpgsign=false",
                "-c",
                "tag.gpgsign=false",
            ])
            .args(args)
            .current_dir(dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?} failed");
    }

    /// Origin repository with one commit tagged `v1.0.0`.
    fn origin_repo(root: &Path) -> PathBuf {
        let origin = root.join("origin");
        fs::create_dir_all(&origin).unwrap();
        git(&origin, &["init", "--quiet"]);
        fs::write(origin.join("README.md"), "hello").unwrap();
        git(&origin, &["add", "README.md"]);
        git(&origin, &["commit", "--quiet", "-m", "initial"]);
        git(&origin, &["tag", "v1.0.0"]);
        origin
    }

    fn file_url(path: &Path) -> String {
        format!("file://{}", path.display())
    }

    #[test]
    fn test_checkout_and_current_ref_on_tag() {
        if !git_available() {
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let origin = origin_repo(temp_dir.path());
        let dest = temp_dir.path().join("cache").join("owner").join("repo");

        let client = GitClient::new();
        let options = CheckoutOptions::new(Some(1)).with_reference("v1.0.0");
        client.checkout(&file_url(&origin), &dest, &options).unwrap();

        assert!(client.is_version_controlled(&dest));
        assert_eq!(fs::read_to_string(dest.join("README.md")).unwrap(), "hello");
        assert_eq!(client.current_ref(&dest), "v1.0.0");
    }

    #[test]
    fn test_checkout_missing_reference_fails() {
        if !git_available() {
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let origin = origin_repo(temp_dir.path());
        let dest = temp_dir.path().join("clone");

        let client = GitClient::new();
        let options = CheckoutOptions::new(None).with_reference("no-such-ref");
        let err = client
            .checkout(&file_url(&origin), &dest, &options)
            .unwrap_err();

        assert!(matches!(
            err,
            RepoCacheError::VersionControl { operation, .. } if operation == "clone"
        ));
    }

    #[test]
    fn test_refresh_picks_up_new_commits() {
        if !git_available() {
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let origin = origin_repo(temp_dir.path());
        let dest = temp_dir.path().join("clone");

        let client = GitClient::new();
        client
            .checkout(&file_url(&origin), &dest, &CheckoutOptions::default())
            .unwrap();

        fs::write(origin.join("README.md"), "updated").unwrap();
        git(&origin, &["commit", "--quiet", "-am", "update"]);

        client.refresh(&dest).unwrap();
        assert_eq!(fs::read_to_string(dest.join("README.md")).unwrap(), "updated");

        git(&origin, &["tag", "v2.0.0"]);
        client.fetch_refs_only(&dest).unwrap();
    }

    #[test]
    fn test_current_ref_outside_repository_is_unknown() {
        if !git_available() {
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let client = GitClient::new();
        // TempDir may itself sit inside a repository on some machines; only
        // assert on a non-empty answer there.
        let reference = client.current_ref(temp_dir.path());
        assert!(!reference.is_empty());
        assert!(!client.is_version_controlled(temp_dir.path()));
    }

    #[test]
    fn test_missing_program_is_reported() {
        let client = GitClient::with_program(PathBuf::from("/nonexistent/git"));
        let temp_dir = TempDir::new().unwrap();
        let result = client.refresh(temp_dir.path());
        assert!(matches!(result, Err(RepoCacheError::VersionControl { .. })));
    }
}
