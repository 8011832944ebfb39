//! Build identifier resolution. Compiled into both `build.rs` and the
//! library so the order can be tested.

use std::fmt;

/// Where the build identifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    /// Supplied through the `THINGS_VERSION` environment variable.
    Env,
    /// Short git revision of the source tree.
    Git,
    /// The crate's package version.
    Package,
}

impl VersionSource {
    pub fn from_build(raw: &str) -> Self {
        match raw {
            "env" => VersionSource::Env,
            "git" => VersionSource::Git,
            _ => VersionSource::Package,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VersionSource::Env => "env",
            VersionSource::Git => "git",
            VersionSource::Package => "package",
        }
    }
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-blank `THINGS_VERSION` wins, then the short git revision, then the
/// package version. `git_sha` only runs when the variable is unset or blank.
#[cfg_attr(not(test), allow(dead_code))]
pub fn resolve_version(
    env_value: Option<&str>,
    git_sha: impl FnOnce() -> Option<String>,
    package: &str,
) -> (String, VersionSource) {
    if let Some(value) = env_value.map(str::trim).filter(|v| !v.is_empty()) {
        return (value.to_string(), VersionSource::Env);
    }
    match git_sha() {
        Some(sha) => (sha, VersionSource::Git),
        None => (package.to_string(), VersionSource::Package),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn no_git() -> Option<String> {
        None
    }

    #[test]
    fn env_value_wins_and_skips_git() {
        let resolved = resolve_version(
            Some(" d2c4b46\n"),
            || panic!("git consulted despite THINGS_VERSION"),
            "0.1.0",
        );
        assert_eq!(resolved, ("d2c4b46".to_string(), VersionSource::Env));
    }

    #[test]
    fn blank_env_falls_back_to_git() {
        let resolved = resolve_version(Some("  "), || Some("abc1234".to_string()), "0.1.0");
        assert_eq!(resolved, ("abc1234".to_string(), VersionSource::Git));
    }

    #[test]
    fn package_version_is_last_resort() {
        assert_eq!(
            resolve_version(None, no_git, "0.1.0"),
            ("0.1.0".to_string(), VersionSource::Package)
        );
    }

    #[test]
    fn source_names_round_trip() {
        for source in [VersionSource::Env, VersionSource::Git, VersionSource::Package] {
            assert_eq!(VersionSource::from_build(source.as_str()), source);
        }
        assert_eq!(VersionSource::from_build("other"), VersionSource::Package);
    }
}
