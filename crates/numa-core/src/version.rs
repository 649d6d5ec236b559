//! Semantic version parsing and the "should install" decision.

use semver::Version;

use crate::error::{Result, UpdateError};

/// Parse a version string, tolerating a leading `v` (e.g. `v1.2.0`).
pub fn parse_version(raw: &str) -> Result<Version> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    Version::parse(trimmed).map_err(|e| UpdateError::parse(format!("invalid version {raw:?}: {e}")))
}

/// True iff `remote` is strictly newer than `current`. Equal or older never installs.
pub fn should_install(current: &Version, remote: &Version) -> bool {
    remote > current
}

/// Version of the running program as baked in at build time.
pub fn running_version() -> Version {
    // CARGO_PKG_VERSION is always valid semver.
    Version::parse(env!("CARGO_PKG_VERSION")).unwrap_or_else(|_| Version::new(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        parse_version(s).unwrap()
    }

    #[test]
    fn newer_remote_installs() {
        assert!(should_install(&v("1.1.0"), &v("1.2.0")));
        assert!(should_install(&v("1.9.9"), &v("2.0.0")));
        assert!(should_install(&v("1.2.0"), &v("1.2.1")));
    }

    #[test]
    fn equal_or_older_remote_never_installs() {
        assert!(!should_install(&v("1.2.0"), &v("1.2.0")));
        assert!(!should_install(&v("1.2.0"), &v("1.1.9")));
        assert!(!should_install(&v("2.0.0"), &v("1.10.0")));
    }

    #[test]
    fn numeric_not_lexical_ordering() {
        assert!(should_install(&v("1.9.0"), &v("1.10.0")));
    }

    #[test]
    fn prerelease_orders_before_release() {
        assert!(should_install(&v("1.2.0-beta.1"), &v("1.2.0")));
        assert!(!should_install(&v("1.2.0"), &v("1.2.0-beta.1")));
    }

    #[test]
    fn decision_matches_ordering_for_all_pairs() {
        let versions = ["0.1.0", "1.0.0-alpha", "1.0.0", "1.0.1", "1.1.0", "2.0.0"];
        for a in versions {
            for b in versions {
                let (va, vb) = (v(a), v(b));
                assert_eq!(should_install(&va, &vb), vb > va, "{a} -> {b}");
            }
        }
    }

    #[test]
    fn leading_v_accepted() {
        assert_eq!(v("v1.2.3"), Version::new(1, 2, 3));
        assert_eq!(v(" 1.2.3 "), Version::new(1, 2, 3));
    }

    #[test]
    fn garbage_is_parse_error() {
        let err = parse_version("latest").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Parse);
    }

    #[test]
    fn running_version_is_crate_version() {
        assert_eq!(running_version().to_string(), env!("CARGO_PKG_VERSION"));
    }
}
