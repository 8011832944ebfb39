use std::fmt;

use serde::Serialize;

/// `TMTask.type`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Todo,
    Project,
    Heading,
}

impl TaskType {
    pub fn code(self) -> i64 {
        match self {
            TaskType::Todo => 0,
            TaskType::Project => 1,
            TaskType::Heading => 2,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            1 => TaskType::Project,
            2 => TaskType::Heading,
            _ => TaskType::Todo,
        }
    }
}

/// `TMTask.status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Incomplete,
    Canceled,
    Completed,
}

impl Status {
    pub fn code(self) -> i64 {
        match self {
            Status::Incomplete => 0,
            Status::Canceled => 2,
            Status::Completed => 3,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            2 => Status::Canceled,
            3 => Status::Completed,
            _ => Status::Incomplete,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Incomplete => "incomplete",
            Status::Canceled => "canceled",
            Status::Completed => "completed",
        }
    }

    /// Parse a user-facing status name. `cancelled` is accepted too.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "incomplete" | "open" => Some(Status::Incomplete),
            "canceled" | "cancelled" => Some(Status::Canceled),
            "completed" | "done" => Some(Status::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `TMTask.start`: which list an unscheduled task lives in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Start {
    #[default]
    Inbox,
    Anytime,
    Someday,
}

impl Start {
    pub fn code(self) -> i64 {
        match self {
            Start::Inbox => 0,
            Start::Anytime => 1,
            Start::Someday => 2,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Start::Anytime,
            2 => Start::Someday,
            _ => Start::Inbox,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Start::Inbox => "Inbox",
            Start::Anytime => "Anytime",
            Start::Someday => "Someday",
        }
    }
}

impl fmt::Display for Start {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistItem {
    pub uuid: String,
    pub title: String,
    pub status: Status,
}

/// A row of `TMTask` joined with its project, area, heading and tags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub uuid: String,
    pub title: String,
    pub notes: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub status: Status,
    pub start: Start,
    /// `YYYY-MM-DD`, empty when unscheduled.
    pub start_date: String,
    pub deadline: String,
    /// RFC3339 timestamps, empty when unknown.
    pub created: String,
    pub modified: String,
    pub completed: String,
    pub project_id: String,
    pub project_title: String,
    pub area_id: String,
    pub area_title: String,
    pub heading_id: String,
    pub heading_title: String,
    pub tags: Vec<String>,
    pub index: i64,
    pub today_index: Option<i64>,
    pub repeating: bool,
    pub trashed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checklist: Option<Vec<ChecklistItem>>,
}

impl Task {
    /// A task with only an id and title; everything else empty.
    pub fn new(uuid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            title: title.into(),
            notes: String::new(),
            task_type: TaskType::Todo,
            status: Status::Incomplete,
            start: Start::Inbox,
            start_date: String::new(),
            deadline: String::new(),
            created: String::new(),
            modified: String::new(),
            completed: String::new(),
            project_id: String::new(),
            project_title: String::new(),
            area_id: String::new(),
            area_title: String::new(),
            heading_id: String::new(),
            heading_title: String::new(),
            tags: Vec::new(),
            index: 0,
            today_index: None,
            repeating: false,
            trashed: false,
            checklist: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    pub uuid: String,
    pub title: String,
    pub area_id: String,
    pub area_title: String,
    pub status: Status,
    pub trashed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub uuid: String,
    pub title: String,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub uuid: String,
    pub title: String,
    pub shortcut: String,
    pub parent: String,
}
