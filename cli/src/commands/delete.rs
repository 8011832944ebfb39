use anyhow::Result;
use anyhow::bail;
use clap::Args;
use clap::ValueEnum;
use things_core::input::extract_title;
use things_core::script::ItemKind;
use things_core::script::build_delete_script;
use things_core::script::build_trash_script;
use things_store::TaskType;

use crate::action_log::ActionKind;
use crate::action_log::record;
use crate::app::App;
use crate::db::open_store;
use crate::output::preview_tasks;
use crate::query::DbArgs;
use crate::query::TaskQueryArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    Todo,
    Project,
    Area,
}

impl From<Kind> for ItemKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Todo => ItemKind::Todo,
            Kind::Project => ItemKind::Project,
            Kind::Area => ItemKind::Area,
        }
    }
}

#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Title of the item to delete; `-` reads it from stdin.
    #[arg(value_name = "TITLE")]
    title: Vec<String>,

    /// ID of the item to delete.
    #[arg(long)]
    id: Option<String>,

    /// What to delete.
    #[arg(long, value_enum, default_value_t = Kind::Todo)]
    kind: Kind,

    /// Repeat the ID or title to confirm a single delete.
    #[arg(long, value_name = "ID_OR_TITLE")]
    confirm: Option<String>,

    /// Trash every matching todo without asking.
    #[arg(long, short = 'y')]
    yes: bool,

    #[command(flatten)]
    db: DbArgs,

    #[command(flatten)]
    query: TaskQueryArgs,
}

impl DeleteCommand {
    pub fn run(self, app: &mut App) -> Result<()> {
        let raw = app.read_input(&self.title)?;
        let id = self.id.as_deref().map(str::trim).unwrap_or_default();

        if self.query.has_selector() {
            if !id.is_empty() || !raw.trim().is_empty() {
                bail!("use either --id or query filters");
            }
            if self.kind != Kind::Todo {
                bail!("query filters only select todos");
            }
            return self.trash_matching(app);
        }
        if id.is_empty() && raw.trim().is_empty() {
            bail!("refusing to delete without a selector (use --id, a title, --query, --search, --tag, etc.)");
        }

        let kind = ItemKind::from(self.kind);
        let script = build_delete_script(kind, id, &raw)?;
        if !app.dry_run {
            let title = extract_title(&raw, "");
            confirm_delete(kind, id, &title, self.confirm.as_deref())?;
        }
        app.run_script(&script)
    }

    fn trash_matching(&self, app: &mut App) -> Result<()> {
        let query = self.query.resolve("incomplete", 0)?;
        let store = open_store(app, self.db.path())?;
        let tasks = query.fetch(&store, &[TaskType::Todo], |filter| store.tasks(filter))?;
        if tasks.is_empty() {
            bail!("no tasks matched");
        }
        if app.dry_run {
            return preview_tasks(app.out.as_mut(), &tasks);
        }
        if tasks.len() > 1 && !self.yes {
            bail!(
                "refusing to delete {} tasks without --yes (use --dry-run to preview)",
                tasks.len()
            );
        }
        let ids: Vec<&str> = tasks.iter().map(|task| task.uuid.as_str()).collect();
        let script = build_trash_script(&ids)?;
        record(app, ActionKind::Trash, &tasks);
        app.run_script(&script)
    }
}

/// A single delete goes through only when `--confirm` repeats the target.
fn confirm_delete(kind: ItemKind, id: &str, title: &str, confirm: Option<&str>) -> Result<()> {
    let target = if id.is_empty() { title } else { id };
    let confirm = confirm.map(str::trim).unwrap_or_default();
    if confirm.is_empty() {
        bail!(
            "refusing to delete {} {target:?} without --confirm={target}",
            kind.label()
        );
    }
    if confirm != id && confirm != title {
        bail!(
            "--confirm {confirm:?} does not match the {} id or title",
            kind.label()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use things_store::fixture::Fixture;
    use things_store::fixture::TaskRow;

    use super::*;
    use crate::action_log::ActionLog;
    use crate::app::testing::Harness;

    fn seed(fixture: &Fixture) {
        for (uuid, title) in [("T1", "Old draft"), ("T2", "Old notes"), ("T3", "Keep me")] {
            fixture
                .task(&TaskRow {
                    uuid: uuid.to_string(),
                    title: title.to_string(),
                    ..Default::default()
                })
                .unwrap();
        }
    }

    #[test]
    fn confirm_must_match() {
        assert!(confirm_delete(ItemKind::Todo, "X1", "", None).is_err());
        assert!(confirm_delete(ItemKind::Todo, "X1", "", Some("X2")).is_err());
        confirm_delete(ItemKind::Todo, "X1", "", Some("X1")).unwrap();
        confirm_delete(ItemKind::Area, "", "Home", Some(" Home ")).unwrap();
    }

    #[test]
    fn delete_requires_a_target() {
        let h = Harness::new();
        let err = h.run(&["delete"]).unwrap_err();
        assert!(err.to_string().starts_with("refusing to delete without a selector"), "{err}");
    }

    #[test]
    fn delete_by_id_needs_confirmation() {
        let h = Harness::new();
        let err = h.run(&["delete", "--id", "X1"]).unwrap_err();
        assert!(err.to_string().contains("--confirm=X1"), "{err}");
        assert!(h.scripts().is_empty());

        h.run(&["delete", "--id", "X1", "--confirm", "X1"]).unwrap();
        assert_eq!(
            h.scripts(),
            vec!["tell application \"Things3\"\n  delete to do id \"X1\"\nend tell".to_string()]
        );
    }

    #[test]
    fn delete_project_by_title() {
        let h = Harness::new();
        h.run(&["delete", "--kind", "project", "Launch", "--confirm", "Launch"])
            .unwrap();
        assert!(h.scripts()[0].contains("delete project named \"Launch\""));
    }

    #[test]
    fn query_filters_only_select_todos() {
        let h = Harness::new();
        let err = h
            .run(&["delete", "--kind", "area", "--search", "x"])
            .unwrap_err();
        assert_eq!(err.to_string(), "query filters only select todos");
    }

    #[test]
    fn bulk_delete_previews_then_trashes_with_yes() {
        let h = Harness::new().with_fixture(seed);
        h.run(&["--dry-run", "delete", "--search", "old"]).unwrap();
        assert!(h.out.contents().starts_with("Matches: 2\n"));
        assert!(h.scripts().is_empty());

        let err = h.run(&["delete", "--search", "old"]).unwrap_err();
        assert!(err.to_string().contains("--yes"), "{err}");

        h.run(&["delete", "--search", "old", "--yes"]).unwrap();
        let scripts = h.scripts();
        assert_eq!(scripts.len(), 1);
        assert!(scripts[0].contains("{\"T1\", \"T2\"}"), "{}", scripts[0]);

        let entry = ActionLog::in_home(h.home.path()).last().unwrap().unwrap();
        assert_eq!(entry.kind, ActionKind::Trash);
        assert_eq!(entry.items.len(), 2);
    }
}
