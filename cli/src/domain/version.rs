//! Version ordering for the installed, remote and compiled-in versions.
//!
//! Parsing never fails. Input is normalised into a [`semver::Version`] and
//! ordering is delegated to it:
//! - an optional leading `v` is dropped, `+build` metadata is ignored;
//! - non-numeric or missing core segments become `0`;
//! - prerelease identifiers keep semver precedence (numeric identifiers
//!   compare numerically, alphanumeric ones lexically, a release outranks
//!   any prerelease of the same core).

use std::cmp::Ordering;

use semver::{BuildMetadata, Prerelease};

/// The version baked into this binary.
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version assumed for installs that predate the `.version` sidecar.
///
/// Strictly lower than any version that writes the sidecar.
pub const PRE_VERSIONING_BASELINE: &str = "0.1.0";

/// Parse a version string leniently.
#[must_use]
pub fn parse(input: &str) -> semver::Version {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    let without_build = trimmed.split_once('+').map_or(trimmed, |(core, _)| core);
    let (core, pre) = match without_build.split_once('-') {
        Some((core, pre)) => (core, pre),
        None => (without_build, ""),
    };

    let mut segments = core.split('.').map(|s| s.trim().parse::<u64>().unwrap_or(0));
    let major = segments.next().unwrap_or(0);
    let minor = segments.next().unwrap_or(0);
    let patch = segments.next().unwrap_or(0);

    semver::Version {
        major,
        minor,
        patch,
        pre: normalize_prerelease(pre),
        build: BuildMetadata::EMPTY,
    }
}

/// Total order on version strings.
#[must_use]
pub fn compare(a: &str, b: &str) -> Ordering {
    parse(a).cmp(&parse(b))
}

/// Returns `true` when `candidate` is strictly newer than `installed`.
#[must_use]
pub fn is_newer(candidate: &str, installed: &str) -> bool {
    compare(candidate, installed) == Ordering::Greater
}

/// Strip the `v` prefix and surrounding whitespace for display and URLs.
#[must_use]
pub fn clean(input: &str) -> String {
    let trimmed = input.trim();
    trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed)
        .to_string()
}

fn normalize_prerelease(pre: &str) -> Prerelease {
    let identifiers: Vec<String> = pre
        .split('.')
        .filter(|id| !id.is_empty())
        .map(|id| {
            let sanitized: String = id
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
                .collect();
            if sanitized.bytes().all(|b| b.is_ascii_digit()) {
                let stripped = sanitized.trim_start_matches('0');
                if stripped.is_empty() {
                    "0".to_string()
                } else {
                    stripped.to_string()
                }
            } else {
                sanitized
            }
        })
        .collect();
    if identifiers.is_empty() {
        return Prerelease::EMPTY;
    }
    Prerelease::new(&identifiers.join(".")).unwrap_or(Prerelease::EMPTY)
}
