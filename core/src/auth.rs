//! Resolution of the Things URL-scheme auth token required by `update`.

use std::fmt;

use crate::Result;
use crate::ThingsError;
use crate::config::Config;

pub const THINGS_AUTH_TOKEN_ENV_VAR: &str = "THINGS_AUTH_TOKEN";

/// Where the resolved token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Flag,
    Env,
    Config,
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenSource::Flag => "--auth-token",
            TokenSource::Env => THINGS_AUTH_TOKEN_ENV_VAR,
            TokenSource::Config => "config file",
        };
        f.write_str(s)
    }
}

/// Token from the environment, trimmed; empty when unset.
pub fn auth_token_from_env() -> String {
    std::env::var(THINGS_AUTH_TOKEN_ENV_VAR)
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// `--auth-token`, then `THINGS_AUTH_TOKEN`, then `auth_token` in the config.
pub fn resolve_auth_token(explicit: &str, config: &Config) -> Result<(String, TokenSource)> {
    let resolved = resolve_from(
        explicit,
        &auth_token_from_env(),
        config.auth_token.as_deref().unwrap_or_default(),
    )?;
    tracing::debug!(source = %resolved.1, "resolved auth token");
    Ok(resolved)
}

fn resolve_from(explicit: &str, env: &str, configured: &str) -> Result<(String, TokenSource)> {
    [
        (explicit, TokenSource::Flag),
        (env, TokenSource::Env),
        (configured, TokenSource::Config),
    ]
    .into_iter()
    .map(|(token, source)| (token.trim(), source))
    .find(|(token, _)| !token.is_empty())
    .map(|(token, source)| (token.to_string(), source))
    .ok_or(ThingsError::MissingAuthToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flag_beats_env_beats_config() {
        assert_eq!(
            resolve_from(" a ", "b", "c").unwrap(),
            ("a".to_string(), TokenSource::Flag)
        );
        assert_eq!(
            resolve_from("", "b", "c").unwrap(),
            ("b".to_string(), TokenSource::Env)
        );
        assert_eq!(
            resolve_from("  ", "", "c").unwrap(),
            ("c".to_string(), TokenSource::Config)
        );
    }

    #[test]
    fn missing_everywhere_is_an_error() {
        assert!(matches!(
            resolve_from("", " ", ""),
            Err(ThingsError::MissingAuthToken)
        ));
    }
}
