use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ThingsError>;

/// Errors raised while validating input or building Things commands.
///
/// The `Display` text is what the user sees after the `Error: ` prefix the
/// binary adds.
#[derive(Error, Debug)]
pub enum ThingsError {
    #[error(
        "Missing Things auth token. Set THINGS_AUTH_TOKEN, add auth_token to the config file, or pass --auth-token=TOKEN (Things > Settings > General > Things URLs)."
    )]
    MissingAuthToken,

    #[error("Must specify --id=id")]
    MissingId,

    #[error("Must specify title")]
    MissingTitle,

    #[error("Must specify --id=ID or query")]
    MissingShowTarget,

    #[error("Must specify --id=ID or todo title")]
    MissingTodoTarget,

    #[error("Must specify --id=ID or project title")]
    MissingProjectTarget,

    #[error("Must specify --id=ID or area title")]
    MissingAreaTarget,

    #[error("no todo ids to move to the Trash")]
    NoTrashTargets,

    #[error("{}", unsafe_title_message(title, key, *suggestion))]
    UnsafeTitle {
        title: String,
        key: String,
        suggestion: Option<&'static str>,
    },

    #[error("invalid --when value {value:?} ({reason})")]
    InvalidWhen { value: String, reason: String },

    #[error("invalid date {value:?} (expected {expected})")]
    InvalidDate {
        value: String,
        expected: &'static str,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("could not resolve home directory")]
    NoHomeDir,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn unsafe_title_message(title: &str, key: &str, suggestion: Option<&str>) -> String {
    match suggestion {
        Some(flag) => format!(
            "title {title:?} looks like {key}=...; did you mean {flag}? Use --allow-unsafe-title to keep it as the title."
        ),
        None => format!(
            "title {title:?} looks like {key}=...; use --allow-unsafe-title to keep it as the title."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unsafe_title_mentions_suggestion() {
        let err = ThingsError::UnsafeTitle {
            title: "tags=work".to_string(),
            key: "tags".to_string(),
            suggestion: Some("--tags"),
        };
        assert_eq!(
            err.to_string(),
            "title \"tags=work\" looks like tags=...; did you mean --tags? Use --allow-unsafe-title to keep it as the title."
        );
    }

    #[test]
    fn invalid_when_quotes_value() {
        let err = ThingsError::InvalidWhen {
            value: "nope".to_string(),
            reason: "bad".to_string(),
        };
        assert_eq!(err.to_string(), "invalid --when value \"nope\" (bad)");
    }
}
