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

use crate::error::{ErrorContext, RepoCacheError};
use serde_json::json;

pub fn format_error_chain(error: &RepoCacheError) -> String {
    let context = ErrorContext::new(error);
    context.to_string()
}

/// Format error for display to user with colors and formatting
pub fn format_error_with_color(error: &RepoCacheError, use_color: bool) -> String {
    let red = if use_color { "\x1b[31m" } else { "" };
    let yellow = if use_color { "\x1b[33m" } else { "" };
    let cyan = if use_color { "\x1b[36m" } else { "" };
    let reset = if use_color { "\x1b[0m" } else { "" };
    let bold = if use_color { "\x1b[1m" } else { "" };

    let context = ErrorContext::new(error);
    let mut output = String::new();

    output.push_str(&format!("{red}{bold}Error:{reset} {error}\n"));

    if let Some(details) = &context.details {
        output.push_str(&format!("\n{details}\n"));
    }

    if let Some(suggestion) = &context.suggestion {
        output.push_str(&format!("\n{yellow}{bold}Suggestions:{reset}\n"));
        for line in suggestion.lines() {
            if !line.trim().is_empty() {
                output.push_str(&format!("{cyan}• {line}{reset}\n"));
            }
        }
    }

    // Always end with a reset to ensure no color bleeding
    if use_color && !output.is_empty() {
        output.push_str(reset);
    }

    output
}

/// Render an error as a `{error, message, ...}` JSON object for `--json` output.
pub fn format_error_json(error: &RepoCacheError) -> serde_json::Value {
    let mut value = json!({
        "error": error.tag(),
        "message": error.to_string(),
    });

    let cause = match error {
        RepoCacheError::Registry {
            registry,
            operation,
            cause,
        } => Some(json!({
            "registry": registry.as_str(),
            "operation": operation.as_str(),
            "cause": cause,
        })),
        RepoCacheError::Network { url, cause } => Some(json!({ "url": url, "cause": cause })),
        RepoCacheError::SpecParse { input, message } => {
            Some(json!({ "input": input, "message": message }))
        }
        RepoCacheError::NotCached { spec } => Some(json!({ "spec": spec })),
        _ => None,
    };

    if let (Some(cause), Some(object)) = (cause, value.as_object_mut()) {
        object.insert("cause".to_string(), cause);
    }

    value
}
