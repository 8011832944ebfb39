use anyhow::Result;
use clap::Args;
use things_core::guard::guard_unsafe_title;
use things_core::input::extract_title;
use things_core::script::AddAreaOptions;
use things_core::script::build_add_area_script;
use things_core::url::AddOptions;
use things_core::url::AddProjectOptions;
use things_core::url::build_add_project_url;
use things_core::url::build_add_url;
use things_core::when::validate_when;

use crate::app::App;

#[derive(Debug, Args)]
pub struct AddCommand {
    /// Todo title; `-` reads title and notes from stdin.
    #[arg(value_name = "TITLE")]
    title: Vec<String>,

    /// Notes for the todo.
    #[arg(long)]
    notes: Option<String>,

    /// When to schedule the todo (today, tomorrow, evening, someday,
    /// anytime, YYYY-MM-DD, YYYY-MM-DD@HH:MM).
    #[arg(long)]
    when: Option<String>,

    /// Schedule for This Evening.
    #[arg(long)]
    later: bool,

    /// Deadline (YYYY-MM-DD).
    #[arg(long)]
    deadline: Option<String>,

    /// Comma-separated tags.
    #[arg(long)]
    tags: Option<String>,

    /// Checklist item (repeatable).
    #[arg(long = "checklist-item", value_name = "ITEM")]
    checklist_items: Vec<String>,

    /// Project or area to add to.
    #[arg(long)]
    list: Option<String>,

    /// Project or area ID to add to.
    #[arg(long)]
    list_id: Option<String>,

    /// Heading within the project.
    #[arg(long)]
    heading: Option<String>,

    /// Heading ID within the project.
    #[arg(long)]
    heading_id: Option<String>,

    /// Create the todo already completed.
    #[arg(long)]
    completed: bool,

    /// Create the todo already canceled.
    #[arg(long, visible_alias = "cancelled")]
    canceled: bool,

    /// Navigate to the new todo.
    #[arg(long)]
    reveal: bool,

    /// Creation date (ISO8601).
    #[arg(long)]
    creation_date: Option<String>,

    /// Completion date (ISO8601).
    #[arg(long)]
    completion_date: Option<String>,

    /// Several todos at once, one title per line.
    #[arg(long, value_name = "TITLES")]
    titles: Option<String>,

    /// Allow titles that look like flag assignments.
    #[arg(long)]
    allow_unsafe_title: bool,
}

impl AddCommand {
    pub fn run(self, app: &mut App) -> Result<()> {
        let raw = app.read_input(&self.title)?;
        guard_unsafe_title(&extract_title(&raw, ""), self.allow_unsafe_title)?;
        let titles: Vec<String> = self
            .titles
            .unwrap_or_default()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        for title in &titles {
            guard_unsafe_title(title, self.allow_unsafe_title)?;
        }
        let when = self.when.unwrap_or_default();
        validate_when(&when)?;

        let opts = AddOptions {
            notes: self.notes.unwrap_or_default(),
            when,
            later: self.later,
            deadline: self.deadline.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            checklist_items: self.checklist_items,
            list: self.list.unwrap_or_default(),
            list_id: self.list_id.unwrap_or_default(),
            heading: self.heading.unwrap_or_default(),
            heading_id: self.heading_id.unwrap_or_default(),
            completed: self.completed,
            canceled: self.canceled,
            reveal: self.reveal,
            creation_date: self.creation_date.unwrap_or_default(),
            completion_date: self.completion_date.unwrap_or_default(),
            titles,
        };
        let url = build_add_url(&opts, &raw);
        app.open_url(&url)
    }
}

#[derive(Debug, Args)]
pub struct AddProjectCommand {
    /// Project title; `-` reads title and notes from stdin.
    #[arg(value_name = "TITLE")]
    title: Vec<String>,

    /// Notes for the project.
    #[arg(long)]
    notes: Option<String>,

    /// When to schedule the project.
    #[arg(long)]
    when: Option<String>,

    /// Deadline (YYYY-MM-DD).
    #[arg(long)]
    deadline: Option<String>,

    /// Comma-separated tags.
    #[arg(long)]
    tags: Option<String>,

    /// Area to add the project to.
    #[arg(long)]
    area: Option<String>,

    /// Area ID to add the project to.
    #[arg(long)]
    area_id: Option<String>,

    /// Todo to create inside the project (repeatable).
    #[arg(long = "todo", value_name = "TITLE")]
    todos: Vec<String>,

    /// Create the project already completed.
    #[arg(long)]
    completed: bool,

    /// Create the project already canceled.
    #[arg(long, visible_alias = "cancelled")]
    canceled: bool,

    /// Navigate to the new project.
    #[arg(long)]
    reveal: bool,

    /// Creation date (ISO8601).
    #[arg(long)]
    creation_date: Option<String>,

    /// Completion date (ISO8601).
    #[arg(long)]
    completion_date: Option<String>,

    /// Allow titles that look like flag assignments.
    #[arg(long)]
    allow_unsafe_title: bool,
}

impl AddProjectCommand {
    pub fn run(self, app: &mut App) -> Result<()> {
        let raw = app.read_input(&self.title)?;
        guard_unsafe_title(&extract_title(&raw, ""), self.allow_unsafe_title)?;
        let when = self.when.unwrap_or_default();
        validate_when(&when)?;

        let opts = AddProjectOptions {
            notes: self.notes.unwrap_or_default(),
            when,
            deadline: self.deadline.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            area: self.area.unwrap_or_default(),
            area_id: self.area_id.unwrap_or_default(),
            todos: self.todos,
            completed: self.completed,
            canceled: self.canceled,
            reveal: self.reveal,
            creation_date: self.creation_date.unwrap_or_default(),
            completion_date: self.completion_date.unwrap_or_default(),
        };
        let url = build_add_project_url(&opts, &raw)?;
        app.open_url(&url)
    }
}

#[derive(Debug, Args)]
pub struct AddAreaCommand {
    /// Area title; `-` reads it from stdin.
    #[arg(value_name = "TITLE")]
    title: Vec<String>,

    /// Comma-separated tags.
    #[arg(long)]
    tags: Option<String>,

    /// Allow titles that look like flag assignments.
    #[arg(long)]
    allow_unsafe_title: bool,
}

impl AddAreaCommand {
    pub fn run(self, app: &mut App) -> Result<()> {
        let raw = app.read_input(&self.title)?;
        guard_unsafe_title(&extract_title(&raw, ""), self.allow_unsafe_title)?;
        let opts = AddAreaOptions {
            tags: self.tags.unwrap_or_default(),
        };
        let script = build_add_area_script(&opts, &raw)?;
        app.run_script(&script)
    }
}
