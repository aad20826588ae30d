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

use crate::error::RepoCacheError;

pub fn get_exit_code(error: &RepoCacheError) -> i32 {
    match error {
        RepoCacheError::SpecParse { .. }
        | RepoCacheError::ConfigError(_)
        | RepoCacheError::ValidationError(_) => 2,

        RepoCacheError::NotCached { .. } => 4,

        RepoCacheError::SecurityError(_) => 13,

        RepoCacheError::Network { .. } => 20,

        RepoCacheError::Registry { .. } => 21,

        RepoCacheError::VersionControl { .. } => 22,

        RepoCacheError::ToolNotFound(_) => 127, // Standard "command not found" exit code

        _ => 1,
    }
}
