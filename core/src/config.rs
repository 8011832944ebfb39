use std::path::Path;
use std::path::PathBuf;

use dirs::home_dir;
use serde::Deserialize;

use crate::Result;
use crate::ThingsError;

/// Environment variable that relocates the config + action log directory.
pub const THINGS_HOME_ENV_VAR: &str = "THINGS_HOME";

pub const DEFAULT_LIMIT: usize = 200;

/// User configuration loaded from `<things home>/config.toml`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Things URL-scheme authorization token.
    pub auth_token: Option<String>,
    /// Path to the Things database, used when neither `--db` nor
    /// `THINGSDB` is set.
    pub database: Option<PathBuf>,
    /// Default `--limit` for list commands.
    pub default_limit: usize,
    /// Bring Things to the foreground when opening URLs.
    pub foreground: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth_token: None,
            database: None,
            default_limit: DEFAULT_LIMIT,
            foreground: false,
        }
    }
}

impl Config {
    /// Load a `config.toml`. A missing file yields the defaults; a malformed
    /// one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        toml::from_str(&contents).map_err(|source| ThingsError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Directory holding `config.toml` and `actions.jsonl`: `$THINGS_HOME` when
/// set, otherwise `~/.things3-cli`. Does not verify that it exists.
pub fn things_home() -> Result<PathBuf> {
    match std::env::var(THINGS_HOME_ENV_VAR) {
        Ok(val) if !val.is_empty() => return Ok(PathBuf::from(val)),
        _ => {}
    }
    let mut p = home_dir().ok_or(ThingsError::NoHomeDir)?;
    p.push(".things3-cli");
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.default_limit, 200);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "auth_token = \"abc\"\nforeground = true\n").unwrap();
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.auth_token.as_deref(), Some("abc"));
        assert!(cfg.foreground);
        assert_eq!(cfg.default_limit, DEFAULT_LIMIT);
        assert_eq!(cfg.database, None);
    }

    #[test]
    fn malformed_file_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_limit = \"lots\"").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"), "{err}");
    }
}
