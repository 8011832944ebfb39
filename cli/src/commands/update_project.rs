use anyhow::Result;
use clap::Args;
use things_core::auth::resolve_auth_token;
use things_core::guard::guard_unsafe_title;
use things_core::input::extract_title;
use things_core::url::UpdateProjectOptions;
use things_core::url::build_update_project_url;
use things_core::when::validate_when;

use crate::app::App;

#[derive(Debug, Args)]
pub struct UpdateProjectCommand {
    /// New title; `-` reads title and notes from stdin.
    #[arg(value_name = "TITLE")]
    title: Vec<String>,

    /// Things URL-scheme auth token (overrides THINGS_AUTH_TOKEN).
    #[arg(long, value_name = "TOKEN")]
    auth_token: Option<String>,

    /// ID of the project to update.
    #[arg(long)]
    id: Option<String>,

    /// Replace the notes.
    #[arg(long)]
    notes: Option<String>,

    /// Text to add before the existing notes.
    #[arg(long)]
    prepend_notes: Option<String>,

    /// Text to add after the existing notes.
    #[arg(long)]
    append_notes: Option<String>,

    /// When to schedule the project.
    #[arg(long)]
    when: Option<String>,

    /// Deadline (YYYY-MM-DD).
    #[arg(long)]
    deadline: Option<String>,

    /// Replace all tags (comma-separated).
    #[arg(long)]
    tags: Option<String>,

    /// Add tags (comma-separated).
    #[arg(long)]
    add_tags: Option<String>,

    /// Move to this area.
    #[arg(long)]
    area: Option<String>,

    /// Move to this area ID.
    #[arg(long)]
    area_id: Option<String>,

    /// Todo to append to the project (repeatable).
    #[arg(long = "todo", value_name = "TITLE")]
    todos: Vec<String>,

    /// Mark completed.
    #[arg(long)]
    completed: bool,

    /// Mark canceled.
    #[arg(long, visible_alias = "cancelled")]
    canceled: bool,

    /// Navigate to the project.
    #[arg(long)]
    reveal: bool,

    /// Duplicate the project before updating.
    #[arg(long)]
    duplicate: bool,

    /// Completion date (ISO8601).
    #[arg(long)]
    completion_date: Option<String>,

    /// Creation date (ISO8601).
    #[arg(long)]
    creation_date: Option<String>,

    /// Allow titles that look like flag assignments.
    #[arg(long)]
    allow_unsafe_title: bool,
}

impl UpdateProjectCommand {
    pub fn run(self, app: &mut App) -> Result<()> {
        let raw = app.read_input(&self.title)?;
        guard_unsafe_title(&extract_title(&raw, ""), self.allow_unsafe_title)?;
        let when = self.when.unwrap_or_default();
        validate_when(&when)?;
        let (auth_token, _) =
            resolve_auth_token(self.auth_token.as_deref().unwrap_or_default(), &app.config)?;

        let opts = UpdateProjectOptions {
            auth_token,
            id: self.id.unwrap_or_default().trim().to_string(),
            notes: self.notes.unwrap_or_default(),
            prepend_notes: self.prepend_notes.unwrap_or_default(),
            append_notes: self.append_notes.unwrap_or_default(),
            when,
            deadline: self.deadline.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            add_tags: self.add_tags.unwrap_or_default(),
            area_id: self.area_id.unwrap_or_default(),
            area: self.area.unwrap_or_default(),
            completed: self.completed,
            canceled: self.canceled,
            reveal: self.reveal,
            duplicate: self.duplicate,
            completion_date: self.completion_date.unwrap_or_default(),
            creation_date: self.creation_date.unwrap_or_default(),
            todos: self.todos,
        };
        let url = build_update_project_url(&opts, &raw)?;
        app.open_url(&url)
    }
}
