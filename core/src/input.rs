//! Splitting raw title/notes input the way Things' quick entry does: the
//! first non-empty line is the title, everything after it is the notes.

/// Percent-encode a single URL query value. Spaces become `%20`.
pub fn url_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

pub fn has_multiple_lines(input: &str) -> bool {
    input.trim_end_matches(['\r', '\n']).contains('\n')
}

/// First non-blank line, trimmed.
pub fn find_title(input: &str) -> String {
    input
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Everything after the title line, with leading blank lines and trailing
/// whitespace removed.
pub fn find_notes(input: &str) -> String {
    let mut lines = input.lines().skip_while(|line| line.trim().is_empty());
    // Skip the title itself.
    lines.next();
    let rest: Vec<&str> = lines.skip_while(|line| line.trim().is_empty()).collect();
    rest.join("\n").trim_end().to_string()
}

/// Title and notes for a raw input. A single line is all title; `notes`
/// is used when the input carries none.
pub fn split_title_notes(raw: &str, notes: &str) -> (String, String) {
    if raw.is_empty() {
        return (String::new(), notes.to_string());
    }
    if has_multiple_lines(raw) {
        let found = find_notes(raw);
        let notes = if found.is_empty() {
            notes.to_string()
        } else {
            found
        };
        (find_title(raw), notes)
    } else {
        (raw.trim().to_string(), notes.to_string())
    }
}

/// Title to use for guards and confirmations, falling back to `fallback`.
pub fn extract_title(raw: &str, fallback: &str) -> String {
    let (title, _) = split_title_notes(raw, "");
    if title.is_empty() {
        fallback.to_string()
    } else {
        title
    }
}

/// Encode each value and join them with an encoded newline, the separator
/// Things expects for `to-dos`, `titles` and `checklist-items`.
pub fn encode_lines<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| url_encode(v.as_ref()))
        .collect::<Vec<_>>()
        .join("%0A")
}
