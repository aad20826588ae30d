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
use crate::platform::file_ops;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use tar::Archive as TarArchive;
use zip::ZipArchive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveType {
    TarGz,
    Zip,
}

/// Extract a source archive into `destination`, dropping its top-level directory.
///
/// Registry archives wrap their contents in a single directory (`package/` for
/// npm, `<name>-<version>/` for crates and sdists); the first path component
/// of every entry is stripped so the destination holds the package root.
pub fn extract_archive(archive_path: &Path, destination: &Path) -> Result<usize> {
    fs::create_dir_all(destination)?;

    let archive_type = detect_archive_type(archive_path)?;
    log::debug!(
        "Extracting {:?} archive {} into {}",
        archive_type,
        archive_path.display(),
        destination.display()
    );

    match archive_type {
        ArchiveType::TarGz => extract_tar_gz(archive_path, destination),
        ArchiveType::Zip => extract_zip(archive_path, destination),
    }
}

/// Detect the archive type from its magic bytes.
///
/// Staging files always carry a `.tgz` suffix, so the extension is not trusted.
pub fn detect_archive_type(path: &Path) -> Result<ArchiveType> {
    let mut file = File::open(path)?;
    let mut magic_bytes = [0u8; 4];
    file.read_exact(&mut magic_bytes).map_err(|_| {
        RepoCacheError::Extract(format!(
            "Cannot read file to determine archive type: {path:?}"
        ))
    })?;

    // gzip: 1f 8b
    if magic_bytes[0] == 0x1f && magic_bytes[1] == 0x8b {
        return Ok(ArchiveType::TarGz);
    }

    // zip: 50 4b 03 04 / 50 4b 05 06 / 50 4b 07 08
    if magic_bytes[0] == 0x50
        && magic_bytes[1] == 0x4b
        && (magic_bytes[2] == 0x03 || magic_bytes[2] == 0x05 || magic_bytes[2] == 0x07)
    {
        return Ok(ArchiveType::Zip);
    }

    Err(RepoCacheError::Extract(format!(
        "Unsupported archive format. File does not appear to be tar.gz or zip: {path:?}"
    )))
}

fn extract_tar_gz(archive_path: &Path, destination: &Path) -> Result<usize> {
    let file = File::open(archive_path)?;
    let gz = flate2::read::GzDecoder::new(file);
    let mut archive = TarArchive::new(gz);

    archive.set_preserve_permissions(true);
    archive.set_overwrite(true);

    let mut extracted_count = 0;
    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.into_owned();

        validate_entry_path(&entry_path)?;
        let Some(relative) = strip_top_level(&entry_path) else {
            continue;
        };

        let entry_type = entry.header().entry_type();
        if entry_type.is_hard_link() {
            log::warn!("Skipping hard link {}", entry_path.display());
            continue;
        }
        if entry_type.is_symlink() {
            let target = entry.link_name()?.map(|t| t.into_owned()).unwrap_or_default();
            if !link_stays_within(&relative, &target) {
                return Err(RepoCacheError::SecurityError(format!(
                    "Archive link {entry_path:?} points outside the destination: {target:?}"
                )));
            }
        }

        reject_symlinked_components(destination, &relative)?;
        let dest_path = destination.join(&relative);
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }

        entry.unpack(&dest_path)?;
        extracted_count += 1;

        if extracted_count % 500 == 0 {
            log::debug!("Extracted {extracted_count} entries...");
        }
    }

    log::info!("Extracted {extracted_count} entries from tar.gz archive");
    Ok(extracted_count)
}

fn extract_zip(archive_path: &Path, destination: &Path) -> Result<usize> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    let total_files = archive.len();
    let mut extracted_count = 0;

    for i in 0..total_files {
        let mut file = archive.by_index(i)?;
        let Some(entry_path) = file.enclosed_name() else {
            return Err(RepoCacheError::SecurityError(format!(
                "Archive entry escapes destination: {}",
                file.name()
            )));
        };

        validate_entry_path(&entry_path)?;
        let Some(relative) = strip_top_level(&entry_path) else {
            continue;
        };
        reject_symlinked_components(destination, &relative)?;
        let outpath = destination.join(relative);

        if file.is_dir() {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = File::create(&outpath)?;
            std::io::copy(&mut file, &mut outfile)?;
        }

        if let Some(mode) = file.unix_mode() {
            file_ops::set_permissions_from_mode(&outpath, mode)?;
        }
        extracted_count += 1;
    }

    log::info!("Extracted {extracted_count} entries from zip archive");
    Ok(extracted_count)
}

/// Drop the first normal path component; `None` for the top-level directory itself.
fn strip_top_level(path: &Path) -> Option<PathBuf> {
    let mut components = path
        .components()
        .filter(|component| matches!(component, Component::Normal(_)));
    components.next()?;

    let stripped: PathBuf = components.collect();
    if stripped.as_os_str().is_empty() {
        None
    } else {
        Some(stripped)
    }
}

/// Whether a symlink stored at `relative` with `target` resolves inside the
/// destination root, judged lexically.
fn link_stays_within(relative: &Path, target: &Path) -> bool {
    let mut depth = relative.components().count().saturating_sub(1);
    for component in target.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    !target.as_os_str().is_empty()
}

/// Refuse to write through, or over, a symlink already present under `destination`.
fn reject_symlinked_components(destination: &Path, relative: &Path) -> Result<()> {
    let mut current = destination.to_path_buf();
    for component in relative.components() {
        current.push(component);
        match fs::symlink_metadata(&current) {
            Ok(metadata) if metadata.file_type().is_symlink() => {
                return Err(RepoCacheError::SecurityError(format!(
                    "Archive entry {} would be written through a symlink",
                    relative.display()
                )));
            }
            Ok(_) => {}
            Err(_) => break,
        }
    }
    Ok(())
}

fn validate_entry_path(entry_path: &Path) -> Result<()> {
    for component in entry_path.components() {
        match component {
            Component::ParentDir => {
                return Err(RepoCacheError::SecurityError(format!(
                    "Archive contains path traversal: {entry_path:?}"
                )));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(RepoCacheError::SecurityError(format!(
                    "Archive contains absolute path: {entry_path:?}"
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use flate2::Compression;
    use flate2::write::GzEncoder;

    /// Build an in-memory `.tar.gz` from `(path, contents)` pairs.
    pub fn tar_gz(files: &[(&str, &str)]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for (path, contents) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, path, contents.as_bytes())
                .unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap()
    }

    /// Like [`tar_gz`], but `links` become symlink entries `(path, target)`.
    pub fn tar_gz_with_links(files: &[(&str, &str)], links: &[(&str, &str)]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for (path, target) in links {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Symlink);
            header.set_size(0);
            header.set_mode(0o777);
            builder.append_link(&mut header, path, target).unwrap();
        }
        for (path, contents) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, path, contents.as_bytes())
                .unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap()
    }
}
