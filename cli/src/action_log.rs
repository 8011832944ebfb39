//! Append-only log of updates and trashes, one JSON object per line, so `undo`
//! can replay the most recent one.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use chrono::SecondsFormat;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use things_store::Start;
use things_store::Status;
use things_store::Task;

use crate::app::App;

pub const ACTION_LOG_FILE: &str = "actions.jsonl";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Update,
    Trash,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Update => "update",
            ActionKind::Trash => "trash",
        }
    }
}

/// What a task looked like before it was changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub uuid: String,
    pub title: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub deadline: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub area_id: String,
    #[serde(default)]
    pub heading_title: String,
}

impl ActionItem {
    pub fn status(&self) -> Status {
        Status::parse(&self.status).unwrap_or_default()
    }

    /// The `when` value that puts the task back where it was.
    pub fn when(&self) -> String {
        if !self.start_date.is_empty() {
            return self.start_date.clone();
        }
        match self.start.to_ascii_lowercase().as_str() {
            "inbox" => "inbox".to_string(),
            "anytime" => "anytime".to_string(),
            "someday" => "someday".to_string(),
            _ => String::new(),
        }
    }

    /// Project wins over area, matching how Things files a todo.
    pub fn list_id(&self) -> &str {
        if self.project_id.is_empty() {
            &self.area_id
        } else {
            &self.project_id
        }
    }
}

impl From<&Task> for ActionItem {
    fn from(task: &Task) -> Self {
        Self {
            uuid: task.uuid.clone(),
            title: task.title.clone(),
            notes: task.notes.clone(),
            tags: task.tags.clone(),
            status: task.status.label().to_string(),
            start: task.start.label().to_string(),
            start_date: task.start_date.clone(),
            deadline: task.deadline.clone(),
            project_id: task.project_id.clone(),
            area_id: task.area_id.clone(),
            heading_title: task.heading_title.clone(),
        }
    }
}

impl From<&ActionItem> for Task {
    fn from(item: &ActionItem) -> Self {
        let mut task = Task::new(item.uuid.clone(), item.title.clone());
        task.status = item.status();
        task.start = match item.start.to_ascii_lowercase().as_str() {
            "anytime" => Start::Anytime,
            "someday" => Start::Someday,
            _ => Start::Inbox,
        };
        task.start_date = item.start_date.clone();
        task.deadline = item.deadline.clone();
        task.tags = item.tags.clone();
        task
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub timestamp: String,
    pub items: Vec<ActionItem>,
}

impl ActionEntry {
    pub fn new(kind: ActionKind, tasks: &[Task]) -> Self {
        Self {
            kind,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            items: tasks.iter().map(ActionItem::from).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActionLog {
    path: PathBuf,
}

impl ActionLog {
    /// The log inside the things home directory.
    pub fn in_home(home: &Path) -> Self {
        Self {
            path: home.join(ACTION_LOG_FILE),
        }
    }

    pub fn append(&self, entry: &ActionEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    fn lines(&self) -> Result<Vec<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string)
                .collect()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => {
                Err(err).with_context(|| format!("failed to read {}", self.path.display()))
            }
        }
    }

    /// The most recent entry, if any.
    pub fn last(&self) -> Result<Option<ActionEntry>> {
        match self.lines()?.last() {
            Some(line) => {
                let entry = serde_json::from_str(line)
                    .with_context(|| format!("corrupt entry in {}", self.path.display()))?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    pub fn remove_last(&self) -> Result<()> {
        let mut lines = self.lines()?;
        if lines.pop().is_none() {
            return Ok(());
        }
        let mut contents = lines.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        std::fs::write(&self.path, contents)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

/// Snapshot `tasks` so `undo` can restore them. A failed write only warns.
pub fn record(app: &mut App, kind: ActionKind, tasks: &[Task]) {
    let log = ActionLog::in_home(&app.home);
    if let Err(err) = log.append(&ActionEntry::new(kind, tasks)) {
        app.warn(format!("failed to write action log: {err:#}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn task(uuid: &str) -> Task {
        let mut task = Task::new(uuid, format!("title {uuid}"));
        task.tags = vec!["home".to_string()];
        task.start = Start::Someday;
        task
    }

    #[test]
    fn missing_log_is_empty() {
        let dir = TempDir::new().unwrap();
        let log = ActionLog::in_home(&dir.path().join("nested"));
        assert_eq!(log.last().unwrap(), None);
        log.remove_last().unwrap();
    }

    #[test]
    fn append_last_and_remove() {
        let dir = TempDir::new().unwrap();
        let log = ActionLog::in_home(&dir.path().join("nested"));
        log.append(&ActionEntry::new(ActionKind::Update, &[task("A")])).unwrap();
        log.append(&ActionEntry::new(ActionKind::Trash, &[task("B"), task("C")])).unwrap();

        let last = log.last().unwrap().unwrap();
        assert_eq!(last.kind, ActionKind::Trash);
        assert_eq!(last.items.len(), 2);
        assert_eq!(last.items[0].uuid, "B");
        assert_eq!(last.items[0].start, "Someday");

        log.remove_last().unwrap();
        assert_eq!(log.last().unwrap().unwrap().kind, ActionKind::Update);
        log.remove_last().unwrap();
        assert_eq!(log.last().unwrap(), None);
    }

    #[test]
    fn entry_serializes_with_type_key() {
        let entry = ActionEntry::new(ActionKind::Update, &[task("A")]);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "update");
        assert_eq!(json["items"][0]["tags"][0], "home");
    }

    #[test]
    fn when_prefers_start_date() {
        let mut item = ActionItem::from(&task("A"));
        assert_eq!(item.when(), "someday");
        item.start_date = "2026-01-02".to_string();
        assert_eq!(item.when(), "2026-01-02");
        item.area_id = "A1".to_string();
        assert_eq!(item.list_id(), "A1");
        item.project_id = "P1".to_string();
        assert_eq!(item.list_id(), "P1");
    }
}
