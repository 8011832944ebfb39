//! Command-line interface definition and dispatch.

use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use things_store::List;

use crate::app::App;
use crate::commands::add::AddAreaCommand;
use crate::commands::add::AddCommand;
use crate::commands::add::AddProjectCommand;
use crate::commands::catalog::AreasCommand;
use crate::commands::catalog::ProjectsCommand;
use crate::commands::catalog::TagsCommand;
use crate::commands::completion::CompletionCommand;
use crate::commands::delete::DeleteCommand;
use crate::commands::list::ListCommand;
use crate::commands::list::SearchCommand;
use crate::commands::list::TasksCommand;
use crate::commands::list::Window;
use crate::commands::list::WindowCommand;
use crate::commands::show::ShowCommand;
use crate::commands::undo::UndoCommand;
use crate::commands::update::UpdateCommand;
use crate::commands::update_project::UpdateProjectCommand;
use crate::commands::version::VersionCommand;

/// Command-line client for Things 3.
#[derive(Debug, Parser)]
#[command(
    name = "things",
    version = things_version::THINGS_VERSION,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Print URLs and scripts instead of running them.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Verbose logging to stderr.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Bring Things to the foreground when opening URLs.
    #[arg(long, global = true)]
    pub foreground: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a new todo.
    Add(AddCommand),

    /// Add a new project.
    #[clap(visible_alias = "create-project")]
    AddProject(AddProjectCommand),

    /// Add a new area.
    #[clap(visible_alias = "create-area")]
    AddArea(AddAreaCommand),

    /// Update an existing todo, or every todo matching a query.
    Update(UpdateCommand),

    /// Update an existing project.
    UpdateProject(UpdateProjectCommand),

    /// Delete a todo, project or area; or trash todos matching a query.
    Delete(DeleteCommand),

    /// Show a list or item in Things.
    Show(ShowCommand),

    /// Search todos in the Things database.
    Search(SearchCommand),

    /// List todos from the Things database.
    #[clap(visible_alias = "todos")]
    Tasks(TasksCommand),

    /// List the Inbox.
    Inbox(ListCommand),

    /// List Today.
    Today(ListCommand),

    /// List Upcoming.
    Upcoming(ListCommand),

    /// List Anytime.
    Anytime(ListCommand),

    /// List Someday.
    Someday(ListCommand),

    /// List the Logbook.
    Logbook(ListCommand),

    /// List the Trash.
    Trash(ListCommand),

    /// List projects.
    Projects(ProjectsCommand),

    /// List areas.
    Areas(AreasCommand),

    /// List tags.
    Tags(TagsCommand),

    /// List todos created in the last 24 hours.
    Createdtoday(WindowCommand),

    /// List todos completed today.
    Logtoday(WindowCommand),

    /// Undo the last bulk update or delete.
    Undo(UndoCommand),

    /// Print version information.
    Version(VersionCommand),

    /// Generate shell completion scripts.
    Completion(CompletionCommand),
}

impl Cli {
    pub fn run(self, app: &mut App) -> Result<()> {
        app.dry_run |= self.dry_run;
        app.debug |= self.debug;
        app.foreground |= self.foreground;

        match self.command {
            Command::Add(cmd) => cmd.run(app),
            Command::AddProject(cmd) => cmd.run(app),
            Command::AddArea(cmd) => cmd.run(app),
            Command::Update(cmd) => cmd.run(app),
            Command::UpdateProject(cmd) => cmd.run(app),
            Command::Delete(cmd) => cmd.run(app),
            Command::Show(cmd) => cmd.run(app),
            Command::Search(cmd) => cmd.run(app),
            Command::Tasks(cmd) => cmd.run(app),
            Command::Inbox(cmd) => cmd.run(app, List::Inbox),
            Command::Today(cmd) => cmd.run(app, List::Today),
            Command::Upcoming(cmd) => cmd.run(app, List::Upcoming),
            Command::Anytime(cmd) => cmd.run(app, List::Anytime),
            Command::Someday(cmd) => cmd.run(app, List::Someday),
            Command::Logbook(cmd) => cmd.run(app, List::Logbook),
            Command::Trash(cmd) => cmd.run(app, List::Trash),
            Command::Projects(cmd) => cmd.run(app),
            Command::Areas(cmd) => cmd.run(app),
            Command::Tags(cmd) => cmd.run(app),
            Command::Createdtoday(cmd) => cmd.run(app, Window::CreatedToday),
            Command::Logtoday(cmd) => cmd.run(app, Window::CompletedToday),
            Command::Undo(cmd) => cmd.run(app),
            Command::Version(cmd) => cmd.run(app),
            Command::Completion(cmd) => cmd.run(app),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["things", "add", "x", "--dry-run", "--debug"]).unwrap();
        assert!(cli.dry_run);
        assert!(cli.debug);
    }

    #[test]
    fn version_flag_exits_early() {
        let err = Cli::try_parse_from(["things", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        assert!(err.to_string().starts_with("things "), "{err}");
    }

    #[test]
    fn unknown_flag_is_a_usage_error() {
        let err = Cli::try_parse_from(["things", "--bogus"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
