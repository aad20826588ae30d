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
use digest::{Digest, DynDigest};
use sha1::Sha1;
use sha2::Sha256;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const CHUNK_SIZE: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    Sha1,
    Sha256,
}

/// Digest published by a registry for an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    pub algorithm: ChecksumAlgorithm,
    pub value: String,
}

impl Checksum {
    pub fn sha1(value: impl Into<String>) -> Self {
        Self {
            algorithm: ChecksumAlgorithm::Sha1,
            value: value.into(),
        }
    }

    pub fn sha256(value: impl Into<String>) -> Self {
        Self {
            algorithm: ChecksumAlgorithm::Sha256,
            value: value.into(),
        }
    }
}

pub fn calculate_checksum(file_path: &Path, algorithm: ChecksumAlgorithm) -> Result<String> {
    let mut file = File::open(file_path)?;
    let mut buffer = vec![0; CHUNK_SIZE];

    let mut hasher: Box<dyn DynDigest> = match algorithm {
        ChecksumAlgorithm::Sha1 => Box::new(Sha1::new()),
        ChecksumAlgorithm::Sha256 => Box::new(Sha256::new()),
    };

    loop {
        match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => DynDigest::update(&mut *hasher, &buffer[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(hex::encode(hasher.finalize()))
}

pub fn verify_checksum(file_path: &Path, expected: &Checksum, url: &str) -> Result<()> {
    let actual = calculate_checksum(file_path, expected.algorithm)?;

    if !actual.eq_ignore_ascii_case(expected.value.trim()) {
        return Err(RepoCacheError::ChecksumMismatch {
            url: url.to_string(),
            expected: expected.value.clone(),
            actual,
        });
    }

    log::debug!("Checksum verified for {url} using {:?}", expected.algorithm);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_calculate_sha256() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(b"Hello, World!")?;

        let checksum = calculate_checksum(temp_file.path(), ChecksumAlgorithm::Sha256)?;
        assert_eq!(
            checksum,
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );

        Ok(())
    }

    #[test]
    fn test_calculate_sha1() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(b"Hello, World!")?;

        let checksum = calculate_checksum(temp_file.path(), ChecksumAlgorithm::Sha1)?;
        assert_eq!(checksum, "0a0a9f2a6772942557ab5355d76af442f8f65e01");

        Ok(())
    }

    #[test]
    fn test_verify_checksum_is_case_insensitive() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(b"Hello, World!")?;

        let expected = Checksum::sha1("0A0A9F2A6772942557AB5355D76AF442F8F65E01");
        verify_checksum(temp_file.path(), &expected, "https://example.com/a.tgz")
    }

    #[test]
    fn test_verify_checksum_mismatch() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(b"Test content")?;

        let expected = Checksum::sha256("0".repeat(64));
        let result = verify_checksum(temp_file.path(), &expected, "https://example.com/a.tgz");

        match result {
            Err(RepoCacheError::ChecksumMismatch { url, .. }) => {
                assert_eq!(url, "https://example.com/a.tgz");
            }
            other => panic!("expected checksum mismatch, got {other:?}"),
        }

        Ok(())
    }
}
