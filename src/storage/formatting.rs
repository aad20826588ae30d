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

use crate::error::{RepoCacheError, Result};
use chrono::{DateTime, Utc};

/// Format a byte count with binary units.
///
/// # Examples
/// ```
/// use repocache::storage::formatting::format_size;
///
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(1536), "1.5 KB");
/// assert_eq!(format_size(1048576), "1.0 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Parse a size such as `500`, `10K`, `1.5M` or `2GB` into bytes.
pub fn parse_size(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let invalid = || RepoCacheError::ValidationError(format!("Invalid size '{input}'"));

    let upper = trimmed.to_ascii_uppercase();
    let number = upper
        .strip_suffix("B")
        .filter(|rest| rest.ends_with(['K', 'M', 'G', 'T']))
        .unwrap_or(upper.as_str());

    let (digits, multiplier) = match number.chars().last() {
        Some('K') => (&number[..number.len() - 1], 1024u64),
        Some('M') => (&number[..number.len() - 1], 1024u64.pow(2)),
        Some('G') => (&number[..number.len() - 1], 1024u64.pow(3)),
        Some('T') => (&number[..number.len() - 1], 1024u64.pow(4)),
        _ => (number.strip_suffix('B').unwrap_or(number), 1),
    };

    let value: f64 = digits.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    Ok((value * multiplier as f64).round() as u64)
}

/// Describe `time` relative to `now`, e.g. `just now`, `5 minutes ago`, `3 days ago`.
pub fn format_relative_time(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = now.signed_duration_since(time).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let (amount, unit) = match seconds {
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 86_400 * 30 => (s / 86_400, "day"),
        s if s < 86_400 * 365 => (s / (86_400 * 30), "month"),
        s => (s / (86_400 * 365), "year"),
    };

    if amount == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{amount} {unit}s ago")
    }
}
