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
use crate::spec::{PackageSpecification, Registry};

const GITHUB_URL_PREFIXES: [&str; 3] = ["https://github.com/", "http://github.com/", "github.com/"];

/// Parse a free-form package identifier.
///
/// Accepted forms:
/// - `owner/repo`, `owner/repo@ref`, `owner/repo#ref` (GitHub)
/// - `github:owner/repo`, `gh:owner/repo`, `https://github.com/owner/repo`
/// - `npm:name[@version]`, `npm:@scope/name[@version]`, or a bare npm name
/// - `pypi:name[@version]`, `pip:name==version`
/// - `crates:name[@version]`, `cargo:name`, `rust:name`
pub fn parse_spec(input: &str) -> Result<PackageSpecification> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(parse_error(input, "specification cannot be empty"));
    }

    if let Some(rest) = strip_github_url(trimmed) {
        return parse_github(input, rest);
    }

    if let Some((registry, rest)) = split_registry_prefix(trimmed) {
        log::trace!("Parsing '{rest}' with explicit {registry} prefix");
        return match registry {
            Registry::GitHub => parse_github(input, rest),
            Registry::Npm => parse_npm(input, rest),
            Registry::PyPI => parse_pypi(input, rest),
            Registry::Crates => parse_crates(input, rest),
        };
    }

    if trimmed.contains('/') && !trimmed.starts_with('@') {
        parse_github(input, trimmed)
    } else {
        parse_npm(input, trimmed)
    }
}

fn parse_error(input: &str, message: impl Into<String>) -> RepoCacheError {
    RepoCacheError::SpecParse {
        input: input.to_string(),
        message: message.into(),
    }
}

fn strip_github_url(value: &str) -> Option<&str> {
    let lower = value.to_ascii_lowercase();
    GITHUB_URL_PREFIXES
        .iter()
        .find(|prefix| lower.starts_with(*prefix))
        .map(|prefix| value[prefix.len()..].trim_end_matches('/'))
}

fn split_registry_prefix(value: &str) -> Option<(Registry, &str)> {
    let (prefix, rest) = value.split_once(':')?;
    let registry = match prefix.to_ascii_lowercase().as_str() {
        "github" | "gh" => Registry::GitHub,
        "npm" => Registry::Npm,
        "pypi" | "pip" => Registry::PyPI,
        "crates" | "cargo" | "rust" => Registry::Crates,
        _ => return None,
    };
    Some((registry, rest.trim()))
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_github(input: &str, rest: &str) -> Result<PackageSpecification> {
    let (name, reference) = match rest.find(['@', '#']) {
        Some(index) => (&rest[..index], non_empty(&rest[index + 1..])),
        None => (rest, None),
    };

    let name = name.trim();
    let name = name.strip_suffix(".git").unwrap_or(name);
    let segments: Vec<&str> = name.split('/').collect();
    if segments.len() != 2 || segments.iter().any(|segment| segment.trim().is_empty()) {
        return Err(parse_error(
            input,
            "GitHub repositories must be written as 'owner/repo'",
        ));
    }

    validate_name(input, name)?;
    if reference.as_deref().is_some_and(is_dot_segment) {
        return Err(parse_error(input, "'.' and '..' are not valid refs"));
    }

    Ok(PackageSpecification::new(
        Registry::GitHub,
        name.to_lowercase(),
        reference,
    ))
}

fn parse_npm(input: &str, rest: &str) -> Result<PackageSpecification> {
    if rest.is_empty() {
        return Err(parse_error(input, "package name cannot be empty"));
    }

    if let Some(scoped) = rest.strip_prefix('@') {
        let Some((scope, remainder)) = scoped.split_once('/') else {
            return Err(parse_error(
                input,
                "scoped packages must be written as '@scope/name'",
            ));
        };

        let (package, version) = split_single_at(input, remainder)?;
        if scope.is_empty() || package.is_empty() {
            return Err(parse_error(input, "scope and package name cannot be empty"));
        }
        if package.contains('/') {
            return Err(parse_error(input, "package name cannot contain '/'"));
        }

        validate_name(input, scope)?;
        validate_name(input, package)?;
        validate_version(input, version.as_deref())?;

        return Ok(PackageSpecification::new(
            Registry::Npm,
            format!("@{scope}/{package}"),
            version,
        ));
    }

    let (name, version) = split_single_at(input, rest)?;
    if name.is_empty() {
        return Err(parse_error(input, "package name cannot be empty"));
    }
    if name.contains('/') {
        return Err(parse_error(
            input,
            "unscoped npm package names cannot contain '/'",
        ));
    }

    validate_name(input, name)?;
    validate_version(input, version.as_deref())?;

    Ok(PackageSpecification::new(Registry::Npm, name, version))
}

fn parse_pypi(input: &str, rest: &str) -> Result<PackageSpecification> {
    let (name, version) = match rest.find(['@', '=']) {
        Some(index) => {
            let raw_version = &rest[index + 1..];
            let raw_version = raw_version.strip_prefix('=').unwrap_or(raw_version);
            (rest[..index].trim(), non_empty(raw_version))
        }
        None => (rest.trim(), None),
    };

    if name.is_empty() {
        return Err(parse_error(input, "package name cannot be empty"));
    }

    if name.contains('/') {
        return Err(parse_error(input, "package name cannot contain '/'"));
    }
    validate_name(input, name)?;
    validate_version(input, version.as_deref())?;

    Ok(PackageSpecification::new(Registry::PyPI, name, version))
}

fn parse_crates(input: &str, rest: &str) -> Result<PackageSpecification> {
    let (name, version) = split_single_at(input, rest)?;
    if name.is_empty() {
        return Err(parse_error(input, "crate name cannot be empty"));
    }

    if name.contains('/') {
        return Err(parse_error(input, "crate name cannot contain '/'"));
    }
    validate_name(input, name)?;
    validate_version(input, version.as_deref())?;

    Ok(PackageSpecification::new(Registry::Crates, name, version))
}

fn is_dot_segment(value: &str) -> bool {
    value == "." || value == ".."
}

/// Names become cache directories one `/`-separated segment at a time.
fn validate_name(input: &str, name: &str) -> Result<()> {
    if name.contains('\\') {
        return Err(parse_error(input, "names cannot contain '\\'"));
    }
    if name.split('/').map(str::trim).any(is_dot_segment) {
        return Err(parse_error(input, "'.' and '..' are not valid name segments"));
    }
    Ok(())
}

fn validate_version(input: &str, version: Option<&str>) -> Result<()> {
    let Some(version) = version else {
        return Ok(());
    };
    if version.contains(['/', '\\']) {
        return Err(parse_error(input, "versions cannot contain path separators"));
    }
    if is_dot_segment(version) {
        return Err(parse_error(input, "'.' and '..' are not valid versions"));
    }
    Ok(())
}

/// Split `name@version` on a single `@`, rejecting additional delimiters.
fn split_single_at<'a>(input: &str, value: &'a str) -> Result<(&'a str, Option<String>)> {
    let mut parts = value.splitn(3, '@');
    let name = parts.next().unwrap_or("").trim();
    let version = parts.next().and_then(non_empty);
    if parts.next().is_some() {
        return Err(parse_error(input, "unexpected '@' in version"));
    }
    Ok((name, version))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(registry: Registry, name: &str, version: Option<&str>) -> PackageSpecification {
        PackageSpecification::new(registry, name, version.map(str::to_string))
    }

    #[test]
    fn test_github_with_ref() {
        let parsed = parse_spec("vercel/next.js@v14.0.0").unwrap();
        assert_eq!(parsed.registry, Registry::GitHub);
        assert_eq!(parsed.name, "vercel/next.js");
        assert_eq!(parsed.version.as_deref(), Some("v14.0.0"));
    }

    #[test]
    fn test_github_hash_ref_and_lowercasing() {
        let parsed = parse_spec("Vercel/Next.js#canary").unwrap();
        assert_eq!(parsed.name, "vercel/next.js");
        assert_eq!(parsed.version.as_deref(), Some("canary"));
    }

    #[test]
    fn test_github_ref_is_not_split_further() {
        let parsed = parse_spec("owner/repo@release@2024#1").unwrap();
        assert_eq!(parsed.name, "owner/repo");
        assert_eq!(parsed.version.as_deref(), Some("release@2024#1"));
    }

    #[test]
    fn test_github_prefixes_and_urls() {
        let expected = spec(Registry::GitHub, "rust-lang/cargo", None);
        assert_eq!(parse_spec("github:rust-lang/cargo").unwrap(), expected);
        assert_eq!(parse_spec("gh:rust-lang/cargo").unwrap(), expected);
        assert_eq!(
            parse_spec("https://github.com/rust-lang/cargo.git").unwrap(),
            expected
        );
        assert_eq!(parse_spec("github.com/rust-lang/cargo/").unwrap(), expected);
    }

    #[test]
    fn test_github_rejects_extra_segments() {
        assert!(parse_spec("a/b/c").is_err());
        assert!(parse_spec("github:justowner").is_err());
        assert!(parse_spec("owner/").is_err());
    }

    #[test]
    fn test_npm_scoped_with_prefix() {
        let parsed = parse_spec("npm:@effect/cli@0.73.0").unwrap();
        assert_eq!(parsed.registry, Registry::Npm);
        assert_eq!(parsed.name, "@effect/cli");
        assert_eq!(parsed.version.as_deref(), Some("0.73.0"));
    }

    #[test]
    fn test_bare_scoped_name_defaults_to_npm() {
        let parsed = parse_spec("@Types/Node").unwrap();
        assert_eq!(parsed.registry, Registry::Npm);
        // scoped names keep their casing
        assert_eq!(parsed.name, "@Types/Node");
        assert_eq!(parsed.version, None);
    }

    #[test]
    fn test_bare_name_defaults_to_npm() {
        assert_eq!(
            parse_spec("lodash@4.17.21").unwrap(),
            spec(Registry::Npm, "lodash", Some("4.17.21"))
        );
        assert_eq!(parse_spec("Lodash").unwrap().name, "Lodash");
    }

    #[test]
    fn test_npm_errors() {
        assert!(parse_spec("npm:").is_err());
        assert!(parse_spec("npm:@scope").is_err());
        assert!(parse_spec("npm:@/pkg").is_err());
        assert!(parse_spec("lodash@1@2").is_err());
        assert!(parse_spec("@1.0.0").is_err());
    }

    #[test]
    fn test_pypi_delimiters() {
        let expected = spec(Registry::PyPI, "requests", Some("2.31.0"));
        assert_eq!(parse_spec("pypi:requests@2.31.0").unwrap(), expected);
        assert_eq!(parse_spec("pip:requests==2.31.0").unwrap(), expected);
        assert_eq!(parse_spec("pypi:requests = 2.31.0").unwrap(), expected);
        assert_eq!(parse_spec("pypi: requests ").unwrap().version, None);
        assert!(parse_spec("pypi:==1.0").is_err());
    }

    #[test]
    fn test_crates_aliases() {
        let expected = spec(Registry::Crates, "serde", Some("1.0.200"));
        assert_eq!(parse_spec("crates:serde@1.0.200").unwrap(), expected);
        assert_eq!(parse_spec("cargo:serde@1.0.200").unwrap(), expected);
        assert_eq!(parse_spec("RUST:serde@1.0.200").unwrap(), expected);
        assert!(parse_spec("crates:serde@1@2").is_err());
        assert!(parse_spec("crates:@1").is_err());
    }

    #[test]
    fn test_dot_segments_are_rejected() {
        for input in [
            "owner/.",
            "../repo",
            "gh:owner/..",
            "owner/repo@..",
            "npm:@scope/..",
            "npm:..@1.0.0",
            "npm:left-pad@.",
            "pypi:..",
            "pip:requests==.",
            "crates:.",
            "crates:foo@..",
        ] {
            let err = parse_spec(input).unwrap_err();
            assert!(matches!(err, RepoCacheError::SpecParse { .. }), "{input}");
        }
    }

    #[test]
    fn test_versions_with_separators_are_rejected() {
        assert!(parse_spec("npm:x@../y").is_err());
        assert!(parse_spec("crates:serde@1.0/evil").is_err());
        assert!(parse_spec("pypi:requests@a\\b").is_err());
        assert!(parse_spec("pypi:a/b").is_err());
        assert!(parse_spec("crates:a\\b").is_err());
    }

    #[test]
    fn test_dotted_names_and_slashed_refs_are_allowed() {
        assert_eq!(parse_spec("owner/.github").unwrap().name, "owner/.github");
        assert_eq!(
            parse_spec("owner/repo@feature/x").unwrap().version.as_deref(),
            Some("feature/x")
        );
        assert_eq!(parse_spec("crates:serde@1.0.0").unwrap().name, "serde");
    }

    #[test]
    fn test_empty_version_is_absent() {
        assert_eq!(parse_spec("owner/repo@").unwrap().version, None);
        assert_eq!(parse_spec("crates:serde@").unwrap().version, None);
    }

    #[test]
    fn test_empty_input() {
        let err = parse_spec("   ").unwrap_err();
        assert!(matches!(err, RepoCacheError::SpecParse { .. }));
    }

    #[test]
    fn test_canonical_round_trip() {
        let inputs = [
            "vercel/next.js@v14.0.0",
            "Owner/Repo#main",
            "npm:@effect/cli@0.73.0",
            "lodash",
            "pip:Django==5.0",
            "crates:tokio@1.38.0",
            "gh:a/b@x#y",
        ];

        for input in inputs {
            let parsed = parse_spec(input).unwrap();
            let reparsed = parse_spec(&parsed.to_string()).unwrap();
            assert_eq!(parsed.registry, reparsed.registry, "{input}");
            assert_eq!(parsed.name, reparsed.name, "{input}");
            assert_eq!(parsed.version, reparsed.version, "{input}");
        }
    }
}
