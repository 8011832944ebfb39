use anyhow::Result;
use anyhow::bail;
use clap::Args;
use things_store::Status;

use crate::app::App;
use crate::db::format_db_error;
use crate::db::open_store;
use crate::output::write_areas;
use crate::output::write_projects;
use crate::output::write_tags;
use crate::query::DbArgs;

#[derive(Debug, Args)]
pub struct ProjectsCommand {
    /// Filter by status: incomplete, completed, canceled, any.
    #[arg(long, default_value = "incomplete", value_name = "STATUS")]
    status: String,

    /// Include trashed projects.
    #[arg(long)]
    include_trashed: bool,

    /// Print JSON instead of a table.
    #[arg(long, short = 'j')]
    json: bool,

    /// Omit the table header.
    #[arg(long)]
    no_header: bool,

    #[command(flatten)]
    db: DbArgs,
}

impl ProjectsCommand {
    pub fn run(self, app: &mut App) -> Result<()> {
        let status = match self.status.trim() {
            s if s.eq_ignore_ascii_case("any") => None,
            s => match Status::parse(s) {
                Some(status) => Some(status),
                None => bail!("invalid --status {s:?} (use incomplete, completed, canceled, or any)"),
            },
        };
        let store = open_store(app, self.db.path())?;
        let projects = store
            .projects(status, self.include_trashed)
            .map_err(format_db_error)?;
        write_projects(app.out.as_mut(), &projects, self.json, self.no_header)
    }
}

#[derive(Debug, Args)]
pub struct AreasCommand {
    /// Print JSON instead of a table.
    #[arg(long, short = 'j')]
    json: bool,

    /// Omit the table header.
    #[arg(long)]
    no_header: bool,

    #[command(flatten)]
    db: DbArgs,
}

impl AreasCommand {
    pub fn run(self, app: &mut App) -> Result<()> {
        let store = open_store(app, self.db.path())?;
        let areas = store.areas().map_err(format_db_error)?;
        write_areas(app.out.as_mut(), &areas, self.json, self.no_header)
    }
}

#[derive(Debug, Args)]
pub struct TagsCommand {
    /// Print JSON instead of a table.
    #[arg(long, short = 'j')]
    json: bool,

    /// Omit the table header.
    #[arg(long)]
    no_header: bool,

    #[command(flatten)]
    db: DbArgs,
}

impl TagsCommand {
    pub fn run(self, app: &mut App) -> Result<()> {
        let store = open_store(app, self.db.path())?;
        let tags = store.tags().map_err(format_db_error)?;
        write_tags(app.out.as_mut(), &tags, self.json, self.no_header)
    }
}
