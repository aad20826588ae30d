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

use std::fs;
use std::io;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Set file permissions from a Unix mode value.
///
/// Used when extracting archives that carry Unix permissions. No-op on Windows.
#[cfg(unix)]
pub fn set_permissions_from_mode(path: &Path, mode: u32) -> io::Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(windows)]
pub fn set_permissions_from_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

/// Make a file or directory writable.
///
/// On Unix this adds owner write permission; on Windows it clears the
/// read-only attribute.
pub fn make_writable(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.file_type().is_symlink() {
        return Ok(());
    }
    let mut permissions = metadata.permissions();

    #[cfg(unix)]
    {
        let mode = permissions.mode() | 0o200;
        permissions.set_mode(mode);
    }

    #[cfg(windows)]
    {
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
    }

    fs::set_permissions(path, permissions)
}

/// Atomically rename a file from source to destination.
///
/// On Windows the destination is removed first because rename refuses to
/// replace an existing file there.
pub fn atomic_rename(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        if to.exists() {
            fs::remove_file(to)?;
        }
    }

    fs::rename(from, to)
}

/// Remove a directory tree, retrying once after clearing read-only bits.
///
/// Git writes its pack files read-only, which makes a plain
/// `remove_dir_all` fail on Windows.
pub fn remove_dir_all(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            log::debug!(
                "Retrying removal of {} after clearing read-only flags",
                path.display()
            );
            for entry in walkdir::WalkDir::new(path).into_iter().flatten() {
                let _ = make_writable(entry.path());
            }
            fs::remove_dir_all(path)
        }
        Err(e) => Err(e),
    }
}
