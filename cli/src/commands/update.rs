use anyhow::Result;
use anyhow::bail;
use clap::Args;
use things_core::auth::resolve_auth_token;
use things_core::guard::guard_unsafe_title;
use things_core::input::extract_title;
use things_core::url::UpdateOptions;
use things_core::url::build_update_url;
use things_core::when::resolve_when;
use things_core::when::validate_when;
use things_store::StoreError;
use things_store::Task;
use things_store::TaskType;
use tracing::debug;

use crate::action_log::ActionKind;
use crate::action_log::record;
use crate::app::App;
use crate::db::open_store;
use crate::db::open_store_optional;
use crate::output::preview_tasks;
use crate::query::DbArgs;
use crate::query::TaskQueryArgs;
use crate::verify::VERIFY_POLL;
use crate::verify::VERIFY_TIMEOUT;
use crate::verify::guard_evening;
use crate::verify::repeating_error;
use crate::verify::verify_when_applied;

#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// New title; `-` reads title and notes from stdin.
    #[arg(value_name = "TITLE")]
    title: Vec<String>,

    /// Things URL-scheme auth token (overrides THINGS_AUTH_TOKEN).
    #[arg(long, value_name = "TOKEN")]
    auth_token: Option<String>,

    /// ID of the todo to update.
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

    /// When to schedule the todo.
    #[arg(long)]
    when: Option<String>,

    /// Move to This Evening.
    #[arg(long)]
    later: bool,

    /// Deadline (YYYY-MM-DD).
    #[arg(long)]
    deadline: Option<String>,

    /// Replace all tags (comma-separated).
    #[arg(long)]
    tags: Option<String>,

    /// Add tags (comma-separated).
    #[arg(long)]
    add_tags: Option<String>,

    /// Mark completed.
    #[arg(long)]
    completed: bool,

    /// Mark canceled.
    #[arg(long, visible_alias = "cancelled")]
    canceled: bool,

    /// Navigate to the todo.
    #[arg(long)]
    reveal: bool,

    /// Duplicate the todo before updating.
    #[arg(long)]
    duplicate: bool,

    /// Completion date (ISO8601).
    #[arg(long)]
    completion_date: Option<String>,

    /// Creation date (ISO8601).
    #[arg(long)]
    creation_date: Option<String>,

    /// Move under this heading.
    #[arg(long)]
    heading: Option<String>,

    /// Move to this project or area.
    #[arg(long)]
    list: Option<String>,

    /// Move to this project or area ID.
    #[arg(long)]
    list_id: Option<String>,

    /// Replace the checklist (repeatable).
    #[arg(long = "checklist-item", value_name = "ITEM")]
    checklist_items: Vec<String>,

    /// Checklist item to add at the top (repeatable).
    #[arg(long = "prepend-checklist-item", value_name = "ITEM")]
    prepend_checklist_items: Vec<String>,

    /// Checklist item to add at the bottom (repeatable).
    #[arg(long = "append-checklist-item", value_name = "ITEM")]
    append_checklist_items: Vec<String>,

    /// Update every matching todo without asking.
    #[arg(long, short = 'y')]
    yes: bool,

    /// Skip checking the database after a `when` change.
    #[arg(long)]
    no_verify: bool,

    /// Allow moving todos scheduled for another day to This Evening.
    #[arg(long)]
    allow_non_today: bool,

    /// Allow titles that look like flag assignments.
    #[arg(long)]
    allow_unsafe_title: bool,

    #[command(flatten)]
    db: DbArgs,

    #[command(flatten)]
    query: TaskQueryArgs,
}

/// Settings shared by the single and bulk paths once input is validated.
struct Plan {
    raw: String,
    options: UpdateOptions,
    /// Resolved `when` value; empty when the schedule is untouched.
    when: String,
    verify: bool,
    guard_evening: bool,
}

impl UpdateCommand {
    pub fn run(self, app: &mut App) -> Result<()> {
        let raw = app.read_input(&self.title)?;
        guard_unsafe_title(&extract_title(&raw, ""), self.allow_unsafe_title)?;
        let when_raw = self.when.clone().unwrap_or_default();
        validate_when(&when_raw)?;
        let when = resolve_when(&when_raw, self.later);

        let id = self.id.as_deref().map(str::trim).unwrap_or_default().to_string();
        let bulk = self.query.has_selector();
        if bulk && !id.is_empty() {
            bail!("use either --id or query filters");
        }
        if !bulk && id.is_empty() {
            bail!("Must specify --id=id or query filters (e.g. --query, --search, --tag)");
        }

        let plan = Plan {
            options: self.options(),
            verify: !when.is_empty() && !self.no_verify && !app.dry_run,
            guard_evening: when.eq_ignore_ascii_case("evening") && !self.allow_non_today,
            when,
            raw,
        };
        if bulk {
            self.run_bulk(app, plan)
        } else {
            self.run_single(app, plan, &id)
        }
    }

    fn options(&self) -> UpdateOptions {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        UpdateOptions {
            auth_token: String::new(),
            id: String::new(),
            notes: text(&self.notes),
            prepend_notes: text(&self.prepend_notes),
            append_notes: text(&self.append_notes),
            when: text(&self.when),
            later: self.later,
            deadline: text(&self.deadline),
            tags: text(&self.tags),
            add_tags: text(&self.add_tags),
            completed: self.completed,
            canceled: self.canceled,
            reveal: self.reveal,
            duplicate: self.duplicate,
            completion_date: text(&self.completion_date),
            creation_date: text(&self.creation_date),
            heading: text(&self.heading),
            list: text(&self.list),
            list_id: text(&self.list_id),
            checklist_items: self.checklist_items.clone(),
            prepend_checklist_items: self.prepend_checklist_items.clone(),
            append_checklist_items: self.append_checklist_items.clone(),
        }
    }

    fn auth_token(&self, app: &App) -> Result<String> {
        let (token, _) =
            resolve_auth_token(self.auth_token.as_deref().unwrap_or_default(), &app.config)?;
        Ok(token)
    }

    fn run_single(&self, app: &mut App, mut plan: Plan, id: &str) -> Result<()> {
        plan.options.id = id.to_string();
        plan.options.auth_token = self.auth_token(app)?;

        // Schedule changes are checked against the current task; any other
        // change only needs the database for the undo snapshot.
        let store = if !plan.when.is_empty() {
            open_store_optional(app, self.db.path(), "check the schedule change")
        } else if app.dry_run {
            None
        } else {
            open_store(app, self.db.path())
                .inspect_err(|err| debug!("no undo snapshot for {id}: {err:#}"))
                .ok()
        };
        let current = match &store {
            Some(store) => match store.task_by_id(id) {
                Ok(task) => Some(task),
                Err(StoreError::TaskNotFound { .. }) => {
                    debug!(id, "task not in database; skipping checks and snapshot");
                    None
                }
                Err(err) => {
                    app.warn(format!("could not read task {id}: {err}"));
                    None
                }
            },
            None => None,
        };
        match &current {
            Some(task) if !plan.when.is_empty() => check_schedulable(task, &plan, app)?,
            _ => {}
        }

        let url = build_update_url(&plan.options, &plan.raw)?;
        match &current {
            Some(task) if !app.dry_run => {
                record(app, ActionKind::Update, std::slice::from_ref(task));
            }
            _ => {}
        }
        app.open_url(&url)?;
        match &store {
            Some(store) if plan.verify => {
                verify_when_applied(store, id, &plan.when, app.today(), VERIFY_TIMEOUT, VERIFY_POLL)
            }
            _ => Ok(()),
        }
    }

    fn run_bulk(&self, app: &mut App, mut plan: Plan) -> Result<()> {
        let query = self.query.resolve("incomplete", 0)?;
        let store = open_store(app, self.db.path())?;
        let tasks = query.fetch(&store, &[TaskType::Todo], |filter| store.tasks(filter))?;
        if tasks.is_empty() {
            bail!("no tasks matched");
        }
        if tasks.len() > 1 && !plan.raw.trim().is_empty() {
            bail!("bulk update does not accept input (use --id or refine the query)");
        }
        if app.dry_run {
            return preview_tasks(app.out.as_mut(), &tasks);
        }
        if !plan.when.is_empty() {
            for task in &tasks {
                check_schedulable(task, &plan, app)?;
            }
        }
        if tasks.len() > 1 && !self.yes {
            bail!(
                "refusing to update {} tasks without --yes (use --dry-run to preview)",
                tasks.len()
            );
        }
        plan.options.auth_token = self.auth_token(app)?;

        record(app, ActionKind::Update, &tasks);
        for task in &tasks {
            plan.options.id = task.uuid.clone();
            let url = build_update_url(&plan.options, &plan.raw)?;
            app.open_url(&url)?;
            if plan.verify {
                verify_when_applied(
                    &store,
                    &task.uuid,
                    &plan.when,
                    app.today(),
                    VERIFY_TIMEOUT,
                    VERIFY_POLL,
                )?;
            }
        }
        Ok(())
    }
}

fn check_schedulable(task: &Task, plan: &Plan, app: &App) -> Result<()> {
    if task.repeating {
        return Err(repeating_error(&task.uuid));
    }
    if plan.guard_evening {
        guard_evening(task, app.today())?;
    }
    Ok(())
}
