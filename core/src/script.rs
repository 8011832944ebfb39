//! AppleScript snippets for the operations the URL scheme does not cover:
//! creating areas and deleting items.

use crate::Result;
use crate::ThingsError;
use crate::input::extract_title;

const TELL: &str = "tell application \"Things3\"\n";
const END_TELL: &str = "end tell";

/// Escape a value for use inside an AppleScript string literal.
pub fn escape_applescript(input: &str) -> String {
    input.replace('\\', "\\\\").replace('"', "\\\"")
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", escape_applescript(value))
}

#[derive(Debug, Clone, Default)]
pub struct AddAreaOptions {
    /// Comma-separated tag names.
    pub tags: String,
}

pub fn build_add_area_script(opts: &AddAreaOptions, raw_input: &str) -> Result<String> {
    let title = extract_title(raw_input, "");
    if title.is_empty() {
        return Err(ThingsError::MissingTitle);
    }
    let mut properties = format!("name:{}", quoted(&title));
    let tags = opts.tags.trim();
    if !tags.is_empty() {
        properties.push_str(&format!(", tag names:{}", quoted(tags)));
    }
    Ok(format!(
        "{TELL}  make new area with properties {{{properties}}}\n{END_TELL}"
    ))
}

/// What kind of Things item a delete targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Todo,
    Project,
    Area,
}

impl ItemKind {
    fn applescript_class(self) -> &'static str {
        match self {
            ItemKind::Todo => "to do",
            ItemKind::Project => "project",
            ItemKind::Area => "area",
        }
    }

    fn missing_target(self) -> ThingsError {
        match self {
            ItemKind::Todo => ThingsError::MissingTodoTarget,
            ItemKind::Project => ThingsError::MissingProjectTarget,
            ItemKind::Area => ThingsError::MissingAreaTarget,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Todo => "todo",
            ItemKind::Project => "project",
            ItemKind::Area => "area",
        }
    }
}

/// Delete one item by id, or by title when no id is given.
pub fn build_delete_script(kind: ItemKind, id: &str, raw_input: &str) -> Result<String> {
    let class = kind.applescript_class();
    let id = id.trim();
    let target = if !id.is_empty() {
        format!("{class} id {}", quoted(id))
    } else {
        let title = extract_title(raw_input, "");
        if title.is_empty() {
            return Err(kind.missing_target());
        }
        format!("{class} named {}", quoted(&title))
    };
    Ok(format!("{TELL}  delete {target}\n{END_TELL}"))
}

/// Move several todos to the Trash. Blank ids are skipped; ids that no
/// longer exist are ignored by the script.
pub fn build_trash_script<S: AsRef<str>>(ids: &[S]) -> Result<String> {
    let quoted_ids: Vec<String> = ids
        .iter()
        .map(|id| id.as_ref().trim())
        .filter(|id| !id.is_empty())
        .map(quoted)
        .collect();
    if quoted_ids.is_empty() {
        return Err(ThingsError::NoTrashTargets);
    }

    let mut script = String::from(TELL);
    script.push_str(&format!("  repeat with todoID in {{{}}}\n", quoted_ids.join(", ")));
    script.push_str("    try\n");
    script.push_str("      delete to do id todoID\n");
    script.push_str("    end try\n");
    script.push_str("  end repeat\n");
    script.push_str(END_TELL);
    Ok(script)
}
