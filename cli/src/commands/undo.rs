use std::io::Write;

use anyhow::Result;
use anyhow::bail;
use clap::Args;
use things_core::auth::resolve_auth_token;
use things_core::url::AddOptions;
use things_core::url::UpdateOptions;
use things_core::url::build_add_url;
use things_core::url::build_update_url;
use things_store::Status;
use things_store::Task;

use crate::action_log::ActionEntry;
use crate::action_log::ActionItem;
use crate::action_log::ActionKind;
use crate::action_log::ActionLog;
use crate::app::App;
use crate::output::preview_tasks;

#[derive(Debug, Args)]
pub struct UndoCommand {
    /// Things URL-scheme auth token (overrides THINGS_AUTH_TOKEN).
    #[arg(long, value_name = "TOKEN")]
    auth_token: Option<String>,

    /// Restore more than one task without asking.
    #[arg(long, short = 'y')]
    yes: bool,
}

impl UndoCommand {
    pub fn run(self, app: &mut App) -> Result<()> {
        let log = ActionLog::in_home(&app.home);
        let Some(entry) = log.last()? else {
            bail!("nothing to undo");
        };
        if entry.items.is_empty() {
            bail!("last {} entry has no tasks to restore", entry.kind.as_str());
        }

        if app.dry_run {
            writeln!(
                app.out,
                "Would undo {} for {} tasks",
                entry.kind.as_str(),
                entry.items.len()
            )?;
            let tasks: Vec<Task> = entry.items.iter().map(Task::from).collect();
            return preview_tasks(app.out.as_mut(), &tasks);
        }
        if entry.items.len() > 1 && !self.yes {
            bail!(
                "refusing to undo {} for {} tasks without --yes (use --dry-run to preview)",
                entry.kind.as_str(),
                entry.items.len()
            );
        }

        match entry.kind {
            ActionKind::Update => self.restore_updates(app, &entry)?,
            ActionKind::Trash => restore_trashed(app, &entry)?,
        }
        if let Err(err) = log.remove_last() {
            app.warn(format!("failed to update action log: {err:#}"));
        }
        Ok(())
    }

    fn restore_updates(&self, app: &mut App, entry: &ActionEntry) -> Result<()> {
        let (auth_token, _) =
            resolve_auth_token(self.auth_token.as_deref().unwrap_or_default(), &app.config)?;
        for item in &entry.items {
            let url = build_update_url(&restore_update(item, &auth_token), &item.title)?;
            app.open_url(&url)?;
        }
        if entry.items.iter().any(|item| item.status() == Status::Incomplete) {
            app.warn(
                "tasks completed or canceled by the update stay that way; reopen them in Things if needed",
            );
        }
        Ok(())
    }
}

/// Put a task's schedule, deadline, tags, placement and closed status back.
fn restore_update(item: &ActionItem, auth_token: &str) -> UpdateOptions {
    UpdateOptions {
        auth_token: auth_token.to_string(),
        id: item.uuid.clone(),
        notes: item.notes.clone(),
        when: item.when(),
        deadline: item.deadline.clone(),
        tags: item.tags.join(","),
        list_id: item.list_id().to_string(),
        heading: item.heading_title.clone(),
        completed: item.status() == Status::Completed,
        canceled: item.status() == Status::Canceled,
        ..Default::default()
    }
}

/// Trashed todos cannot be pulled back through the URL scheme, so they are
/// added again from the snapshot.
fn restore_trashed(app: &mut App, entry: &ActionEntry) -> Result<()> {
    for item in &entry.items {
        let opts = AddOptions {
            notes: item.notes.clone(),
            when: item.when(),
            deadline: item.deadline.clone(),
            tags: item.tags.join(","),
            list_id: item.list_id().to_string(),
            heading: item.heading_title.clone(),
            completed: item.status() == Status::Completed,
            canceled: item.status() == Status::Canceled,
            ..Default::default()
        };
        let url = build_add_url(&opts, &item.title);
        app.open_url(&url)?;
    }
    app.warn("restored tasks are new items with new IDs; the originals stay in the Trash");
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use things_store::Start;
    use things_store::fixture::TaskRow;

    use super::*;
    use crate::app::testing::Harness;

    fn snapshot(uuid: &str, title: &str) -> Task {
        let mut task = Task::new(uuid, title);
        task.start = Start::Someday;
        task.tags = vec!["home".to_string()];
        task
    }

    fn seed_log(h: &Harness, kind: ActionKind, tasks: &[Task]) {
        ActionLog::in_home(h.home.path())
            .append(&ActionEntry::new(kind, tasks))
            .unwrap();
    }

    #[test]
    fn empty_log_has_nothing_to_undo() {
        let h = Harness::new();
        let err = h.run(&["undo"]).unwrap_err();
        assert_eq!(err.to_string(), "nothing to undo");
    }

    #[test]
    fn dry_run_previews_without_touching_log() {
        let h = Harness::new();
        seed_log(&h, ActionKind::Trash, &[snapshot("A", "Alpha"), snapshot("B", "Beta")]);
        h.run(&["--dry-run", "undo"]).unwrap();
        let out = h.out.contents();
        assert!(out.starts_with("Would undo trash for 2 tasks\nMatches: 2\n"), "{out}");
        assert!(ActionLog::in_home(h.home.path()).last().unwrap().is_some());
    }

    #[test]
    fn undo_trash_re_adds_and_pops_entry() {
        let h = Harness::new();
        seed_log(&h, ActionKind::Trash, &[snapshot("A", "Alpha")]);
        h.run(&["undo"]).unwrap();
        assert_eq!(
            h.only_url(),
            "things:///add?title=Alpha&when=someday&tags=home"
        );
        assert!(h.err.contents().contains("new items"));
        assert!(ActionLog::in_home(h.home.path()).last().unwrap().is_none());
    }

    #[test]
    fn undo_update_restores_snapshot_with_token() {
        let h = Harness::new().with_token("secret");
        let mut task = snapshot("A", "Alpha");
        task.project_id = "P1".to_string();
        seed_log(&h, ActionKind::Update, &[task]);
        h.run(&["undo"]).unwrap();
        assert_eq!(
            h.only_url(),
            "things:///update?auth-token=secret&id=A&title=Alpha&when=someday&tags=home&list-id=P1"
        );
    }

    #[test]
    fn several_items_need_yes() {
        let h = Harness::new();
        seed_log(&h, ActionKind::Trash, &[snapshot("A", "Alpha"), snapshot("B", "Beta")]);
        let err = h.run(&["undo"]).unwrap_err();
        assert!(err.to_string().contains("--yes"), "{err}");
        h.run(&["undo", "--yes"]).unwrap();
        assert_eq!(h.urls().len(), 2);
    }

    #[test]
    fn undo_reapplies_closed_status_from_snapshot() {
        let h = Harness::new().with_token("secret").with_fixture(|f| {
            for uuid in ["C1", "C2"] {
                f.task(&TaskRow {
                    uuid: uuid.to_string(),
                    title: format!("Done {uuid}"),
                    status: Status::Completed,
                    ..Default::default()
                })
                .unwrap();
            }
        });
        h.run(&["update", "--status", "completed", "--search", "done", "--canceled", "--yes"])
            .unwrap();
        h.run(&["undo", "--yes"]).unwrap();

        let urls = h.urls();
        assert_eq!(urls.len(), 4);
        for url in &urls[..2] {
            assert!(url.ends_with("&canceled=true"), "{url}");
        }
        for url in &urls[2..] {
            assert!(url.contains("&completed=true"), "{url}");
            assert!(!url.contains("canceled"), "{url}");
        }
        assert!(h.err.contents().is_empty(), "{}", h.err.contents());
    }

    #[test]
    fn undo_of_open_tasks_warns_they_stay_closed() {
        let h = Harness::new().with_token("secret");
        let mut task = snapshot("A", "Alpha");
        task.status = Status::Incomplete;
        seed_log(&h, ActionKind::Update, &[task]);
        h.run(&["undo"]).unwrap();
        assert!(!h.only_url().contains("completed"));
        assert!(h.err.contents().contains("stay that way"));
    }
}
