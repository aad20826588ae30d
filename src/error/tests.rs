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

use crate::error::format::format_error_with_color;
use crate::error::*;
use crate::spec::Registry;

#[test]
fn test_error_context_not_cached() {
    let error = RepoCacheError::NotCached {
        spec: "vercel/next.js".to_string(),
    };
    let context = ErrorContext::new(&error);

    assert!(context.suggestion.is_some());
    assert!(
        context
            .suggestion
            .unwrap()
            .contains("repocache fetch vercel/next.js")
    );
    assert!(context.details.is_none());
}

#[test]
fn test_error_context_registry_carries_cause() {
    let error = RepoCacheError::registry(
        Registry::Npm,
        RegistryOperation::ResolveVersion,
        "version 9.9.9 not found",
    );
    let context = ErrorContext::new(&error);

    assert!(context.details.unwrap().contains("9.9.9"));
    assert!(context.suggestion.unwrap().contains("latest"));
}

#[test]
fn test_registry_error_display_includes_operation_tag() {
    let error = RepoCacheError::registry(Registry::Crates, RegistryOperation::Checkout, "boom");
    assert_eq!(error.to_string(), "crates checkout failed: boom");
}

#[test]
fn test_exit_codes() {
    let parse = RepoCacheError::SpecParse {
        input: "a/b/c".to_string(),
        message: "too many slashes".to_string(),
    };
    assert_eq!(get_exit_code(&parse), 2);

    let not_cached = RepoCacheError::NotCached {
        spec: "npm:lodash".to_string(),
    };
    assert_eq!(get_exit_code(&not_cached), 4);

    let network = RepoCacheError::network("https://example.com", "timed out");
    assert_eq!(get_exit_code(&network), 20);

    let tool = RepoCacheError::ToolNotFound("rg".to_string());
    assert_eq!(get_exit_code(&tool), 127);

    let failed = RepoCacheError::CommandFailed {
        program: "rg".to_string(),
        status: "exit status: 2".to_string(),
    };
    assert_eq!(get_exit_code(&failed), 1);
    assert_eq!(failed.to_string(), "'rg' exited with exit status: 2");

    let io = RepoCacheError::Io(std::io::Error::other("disk"));
    assert_eq!(get_exit_code(&io), 1);
}

#[test]
fn test_format_error_chain_layout() {
    let error = RepoCacheError::network("https://registry.npmjs.org/lodash", "connection reset");
    let formatted = format_error_chain(&error);

    assert!(formatted.starts_with("Error: Network error"));
    assert!(formatted.contains("Details: Request to https://registry.npmjs.org/lodash"));
    assert!(formatted.contains("Suggestion:"));
}

#[test]
fn test_format_error_without_color_has_no_escapes() {
    let error = RepoCacheError::ToolNotFound("git".to_string());
    let formatted = format_error_with_color(&error, false);

    assert!(!formatted.contains("\x1b["));
    assert!(formatted.contains("• Install 'git'"));
}

#[test]
fn test_format_error_json_structured_cause() {
    let error = RepoCacheError::registry(
        Registry::PyPI,
        RegistryOperation::FetchMetadata,
        "HTTP 404",
    );
    let value = format_error_json(&error);

    assert_eq!(value["error"], "registry-error");
    assert_eq!(value["cause"]["registry"], "pypi");
    assert_eq!(value["cause"]["operation"], "fetch-metadata");
    assert_eq!(value["cause"]["cause"], "HTTP 404");
}
