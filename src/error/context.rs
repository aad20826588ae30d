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

use crate::error::{RegistryOperation, RepoCacheError};
use std::fmt;

pub struct ErrorContext<'a> {
    pub error: &'a RepoCacheError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl<'a> ErrorContext<'a> {
    pub fn new(error: &'a RepoCacheError) -> Self {
        let (suggestion, details) = match error {
            RepoCacheError::SpecParse { .. } => {
                let suggestion = Some(
                    "Specification format: 'owner/repo[@ref]', 'npm:<name>[@version]', \
                     'pypi:<name>[@version]' or 'crates:<name>[@version]'."
                        .to_string(),
                );
                (suggestion, None)
            }
            RepoCacheError::Registry {
                registry,
                operation,
                cause,
            } => {
                let suggestion = match operation {
                    RegistryOperation::FetchMetadata => Some(format!(
                        "Check that the package exists on {registry} and that you are online."
                    )),
                    RegistryOperation::ResolveVersion => Some(
                        "Check the requested version, or omit it to fetch the latest release."
                            .to_string(),
                    ),
                    RegistryOperation::Checkout => Some(
                        "Check that the repository exists and is publicly accessible.".to_string(),
                    ),
                    RegistryOperation::DownloadArchive | RegistryOperation::ExtractArchive => Some(
                        "Ensure you have enough disk space and try again.".to_string(),
                    ),
                };
                let details = Some(format!("Cause: {cause}"));
                (suggestion, details)
            }
            RepoCacheError::Network { url, cause } => {
                let suggestion = Some(
                    "Check your internet connection and proxy settings, then try again."
                        .to_string(),
                );
                let details = Some(format!("Request to {url} failed: {cause}"));
                (suggestion, details)
            }
            RepoCacheError::VersionControl { message, .. } => {
                let suggestion = Some(
                    "Make sure git is installed and the repository is reachable.".to_string(),
                );
                let details = Some(message.clone());
                (suggestion, details)
            }
            RepoCacheError::NotCached { spec } => {
                let suggestion = Some(format!("Run 'repocache fetch {spec}' to cache it first."));
                (suggestion, None)
            }
            RepoCacheError::ChecksumMismatch {
                expected, actual, ..
            } => {
                let suggestion = Some(
                    "Try fetching again. If the problem persists, the archive may be corrupted at \
                     the source."
                        .to_string(),
                );
                let details = Some(format!("Expected: {expected}\nActual:   {actual}"));
                (suggestion, details)
            }
            RepoCacheError::ToolNotFound(tool) => {
                let suggestion =
                    Some(format!("Install '{tool}' and make sure it is on your PATH."));
                (suggestion, None)
            }
            RepoCacheError::ConfigError(_) => {
                let suggestion = Some(
                    "Check ~/.repocache/config.toml and REPOCACHE_* environment variables."
                        .to_string(),
                );
                (suggestion, None)
            }
            RepoCacheError::Io(io_err) => {
                let suggestion = match io_err.kind() {
                    std::io::ErrorKind::PermissionDenied => Some(
                        "Check file permissions on the cache directory.".to_string(),
                    ),
                    std::io::ErrorKind::NotFound => {
                        Some("Ensure the file or directory exists.".to_string())
                    }
                    _ => None,
                };
                (suggestion, None)
            }
            _ => (None, None),
        };

        Self {
            error,
            suggestion,
            details,
        }
    }
}

impl<'a> fmt::Display for ErrorContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\n\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}
