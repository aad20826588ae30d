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

//! Extraction of source repository references from registry metadata URLs.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:git\+)?(?:[a-z+]+://)?(?:[^@/\s]+@)?(?:www\.)?(github\.com|gitlab\.com|bitbucket\.org|codeberg\.org|git\.sr\.ht)(?::\d+)?[/:]([^/\s#?]+)/([^/\s#?]+)",
    )
    .expect("valid repository URL regex")
});

static SHORTHAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(github|gitlab|bitbucket):([^/\s]+)/([^/\s#?]+)")
        .expect("valid repository shorthand regex")
});

static BARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9][A-Za-z0-9_.-]*)/([A-Za-z0-9_.-]+)$")
        .expect("valid bare repository regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    GitHub,
    GitLab,
    Bitbucket,
    Codeberg,
    SourceHut,
}

impl Host {
    pub fn domain(&self) -> &'static str {
        match self {
            Host::GitHub => "github.com",
            Host::GitLab => "gitlab.com",
            Host::Bitbucket => "bitbucket.org",
            Host::Codeberg => "codeberg.org",
            Host::SourceHut => "git.sr.ht",
        }
    }

    fn from_domain(domain: &str) -> Option<Self> {
        match domain.to_ascii_lowercase().as_str() {
            "github.com" => Some(Host::GitHub),
            "gitlab.com" => Some(Host::GitLab),
            "bitbucket.org" => Some(Host::Bitbucket),
            "codeberg.org" => Some(Host::Codeberg),
            "git.sr.ht" => Some(Host::SourceHut),
            _ => None,
        }
    }

    fn from_shorthand(prefix: &str) -> Option<Self> {
        match prefix.to_ascii_lowercase().as_str() {
            "github" => Some(Host::GitHub),
            "gitlab" => Some(Host::GitLab),
            "bitbucket" => Some(Host::Bitbucket),
            _ => None,
        }
    }
}

/// A repository on a known hosting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub host: Host,
    pub owner: String,
    pub repo: String,
}

impl RepositoryRef {
    /// Recognize a repository reference in a `repository` or `homepage` value.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Some(captures) = SHORTHAND_RE.captures(input) {
            let host = Host::from_shorthand(&captures[1])?;
            return Self::build(host, &captures[2], &captures[3]);
        }

        if let Some(captures) = URL_RE.captures(input) {
            let host = Host::from_domain(&captures[1])?;
            return Self::build(host, &captures[2], &captures[3]);
        }

        // npm's `owner/repo` shorthand means GitHub
        if let Some(captures) = BARE_RE.captures(input) {
            return Self::build(Host::GitHub, &captures[1], &captures[2]);
        }

        None
    }

    fn build(host: Host, owner: &str, repo: &str) -> Option<Self> {
        let repo = repo.strip_suffix(".git").unwrap_or(repo);
        if owner.is_empty() || repo.is_empty() {
            return None;
        }
        if host == Host::SourceHut && !owner.starts_with('~') {
            return None;
        }

        Some(Self {
            host,
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// HTTPS clone URL; GitHub references go through the configured GitHub base.
    pub fn clone_url(&self, github_base: &str) -> String {
        let base = match self.host {
            Host::GitHub => github_base.trim_end_matches('/').to_string(),
            other => format!("https://{}", other.domain()),
        };
        format!("{base}/{}/{}.git", self.owner, self.repo)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.host.domain(), self.owner, self.repo)
    }
}
