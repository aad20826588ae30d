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

pub mod checksum;
pub mod client;

pub use checksum::{Checksum, ChecksumAlgorithm, verify_checksum};
pub use client::{AttohttpcClient, HttpClient, HttpResponse};

use crate::error::{RegistryOperation, RepoCacheError, Result};
use crate::spec::Registry;
use std::io::{BufWriter, Read, Write};
use tempfile::NamedTempFile;

const DOWNLOAD_CHUNK_SIZE: usize = 64 * 1024;
const STAGING_PREFIX: &str = "repocache-";
const STAGING_SUFFIX: &str = ".tgz";

/// Download an archive into a random-suffixed staging file in the platform temp dir.
///
/// The returned file is deleted when dropped, whether or not extraction
/// succeeds; deletion failures are ignored.
pub fn download_archive(
    client: &dyn HttpClient,
    registry: Registry,
    url: &str,
    checksum: Option<&Checksum>,
) -> Result<NamedTempFile> {
    let mut response = client.get(url)?;
    if !response.is_success() {
        return Err(RepoCacheError::registry(
            registry,
            RegistryOperation::DownloadArchive,
            format!("HTTP {} from {url}", response.status()),
        ));
    }

    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .suffix(STAGING_SUFFIX)
        .tempfile()?;
    log::debug!("Downloading {url} to {}", staging.path().display());

    let written = copy_body(response.as_mut(), staging.as_file())?;
    log::debug!("Downloaded {written} bytes from {url}");

    if let Some(expected) = checksum {
        verify_checksum(staging.path(), expected, url)?;
    }

    Ok(staging)
}

fn copy_body(response: &mut dyn HttpResponse, file: &std::fs::File) -> Result<u64> {
    let mut writer = BufWriter::new(file);
    let mut buffer = vec![0; DOWNLOAD_CHUNK_SIZE];
    let mut downloaded = 0u64;

    loop {
        match response.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                writer.write_all(&buffer[..n])?;
                downloaded += n as u64;
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    writer.flush()?;
    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::path::PathBuf;

    #[test]
    fn test_download_archive_stages_and_cleans_up() {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/pkg.tgz")
            .with_status(200)
            .with_body("archive-bytes")
            .create();

        let client = AttohttpcClient::new();
        let url = format!("{}/pkg.tgz", server.url());
        let staging = download_archive(&client, Registry::Npm, &url, None).unwrap();

        let path: PathBuf = staging.path().to_path_buf();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(STAGING_PREFIX));
        assert!(name.ends_with(STAGING_SUFFIX));
        assert!(path.starts_with(std::env::temp_dir()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "archive-bytes");

        drop(staging);
        assert!(!path.exists());
    }

    #[test]
    fn test_download_archive_http_error_is_registry_error() {
        let mut server = Server::new();
        let _m = server.mock("GET", "/gone.tgz").with_status(410).create();

        let client = AttohttpcClient::new();
        let url = format!("{}/gone.tgz", server.url());
        let err = download_archive(&client, Registry::Crates, &url, None).unwrap_err();

        match err {
            RepoCacheError::Registry {
                registry,
                operation,
                cause,
            } => {
                assert_eq!(registry, Registry::Crates);
                assert_eq!(operation, RegistryOperation::DownloadArchive);
                assert!(cause.contains("410"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_download_archive_checksum_mismatch() {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/pkg.crate")
            .with_status(200)
            .with_body("tampered")
            .create();

        let client = AttohttpcClient::new();
        let url = format!("{}/pkg.crate", server.url());
        let expected = Checksum::sha256("0".repeat(64));
        let err = download_archive(&client, Registry::Crates, &url, Some(&expected)).unwrap_err();

        assert!(matches!(err, RepoCacheError::ChecksumMismatch { .. }));
    }
}
