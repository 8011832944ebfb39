//! Refuse titles that look like a mistyped flag, e.g. `things add tags=work`.

use crate::Result;
use crate::ThingsError;

const FLAG_KEYS: &[&str] = &[
    "tag",
    "tags",
    "add-tags",
    "when",
    "deadline",
    "list",
    "list-id",
    "area",
    "area-id",
    "project",
    "project-id",
    "heading",
    "notes",
    "id",
    "auth-token",
];

pub fn guard_unsafe_title(title: &str, allow_unsafe: bool) -> Result<()> {
    if allow_unsafe {
        return Ok(());
    }
    let title = title.trim();
    let Some(key) = unsafe_title_key(title) else {
        return Ok(());
    };
    let suggestion = match key.as_str() {
        "tag" | "tags" => Some("--tags"),
        "add-tags" => Some("--add-tags"),
        _ => None,
    };
    Err(ThingsError::UnsafeTitle {
        title: title.to_string(),
        key,
        suggestion,
    })
}

/// The flag name a title's first word resembles, if any.
pub fn unsafe_title_key(title: &str) -> Option<String> {
    let token = title.split_whitespace().next()?;
    let token = token
        .strip_prefix("--")
        .or_else(|| token.strip_prefix('-'))
        .unwrap_or(token);
    let (key, _) = token.split_once('=')?;
    let key = key.trim().to_ascii_lowercase();
    if key.is_empty() {
        return None;
    }
    if FLAG_KEYS.contains(&key.as_str()) || key.starts_with("repeat-") {
        Some(key)
    } else {
        None
    }
}
