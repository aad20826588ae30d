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

mod context;
mod exit_codes;
mod format;
#[cfg(test)]
mod tests;

pub use context::ErrorContext;
pub use exit_codes::get_exit_code;
pub use format::{format_error_chain, format_error_json, format_error_with_color};

use crate::spec::Registry;
use std::fmt;
use thiserror::Error;

/// Named step of the registry resolution cascade, used to tag failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryOperation {
    FetchMetadata,
    ResolveVersion,
    Checkout,
    DownloadArchive,
    ExtractArchive,
}

impl RegistryOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryOperation::FetchMetadata => "fetch-metadata",
            RegistryOperation::ResolveVersion => "resolve-version",
            RegistryOperation::Checkout => "checkout",
            RegistryOperation::DownloadArchive => "download-archive",
            RegistryOperation::ExtractArchive => "extract-archive",
        }
    }
}

impl fmt::Display for RegistryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum RepoCacheError {
    #[error("Invalid package specification '{input}': {message}")]
    SpecParse { input: String, message: String },

    #[error("{registry} {operation} failed: {cause}")]
    Registry {
        registry: Registry,
        operation: RegistryOperation,
        cause: String,
    },

    #[error("Network error for {url}: {cause}")]
    Network { url: String, cause: String },

    #[error("git {operation} failed: {message}")]
    VersionControl { operation: String, message: String },

    #[error("'{spec}' is not cached")]
    NotCached { spec: String },

    #[error("Failed to extract archive: {0}")]
    Extract(String),

    #[error("Checksum mismatch for {url}")]
    ChecksumMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    #[error("Required tool '{0}' was not found in PATH")]
    ToolNotFound(String),

    #[error("'{program}' exited with {status}")]
    CommandFailed { program: String, status: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Security error: {0}")]
    SecurityError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

impl RepoCacheError {
    pub fn registry(
        registry: Registry,
        operation: RegistryOperation,
        cause: impl fmt::Display,
    ) -> Self {
        RepoCacheError::Registry {
            registry,
            operation,
            cause: cause.to_string(),
        }
    }

    pub fn network(url: &str, cause: impl fmt::Display) -> Self {
        RepoCacheError::Network {
            url: url.to_string(),
            cause: cause.to_string(),
        }
    }

    pub fn version_control(operation: &str, message: impl fmt::Display) -> Self {
        RepoCacheError::VersionControl {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }

    /// Short machine-readable tag used when rendering errors as JSON.
    pub fn tag(&self) -> &'static str {
        match self {
            RepoCacheError::SpecParse { .. } => "parse-error",
            RepoCacheError::Registry { .. } => "registry-error",
            RepoCacheError::Network { .. } => "network-error",
            RepoCacheError::VersionControl { .. } => "vcs-error",
            RepoCacheError::NotCached { .. } => "not-found",
            RepoCacheError::Extract(_) => "extract-error",
            RepoCacheError::ChecksumMismatch { .. } => "checksum-mismatch",
            RepoCacheError::ToolNotFound(_) => "tool-not-found",
            RepoCacheError::CommandFailed { .. } => "command-failed",
            RepoCacheError::ConfigError(_) => "config-error",
            RepoCacheError::SecurityError(_) => "security-error",
            RepoCacheError::ValidationError(_) => "validation-error",
            RepoCacheError::Io(_) => "io-error",
            RepoCacheError::Json(_) => "json-error",
            RepoCacheError::WalkDir(_) => "io-error",
            RepoCacheError::Zip(_) => "extract-error",
        }
    }
}

pub type Result<T> = std::result::Result<T, RepoCacheError>;
