//! Read-only listings: `tasks`, the built-in lists, `search`, and the
//! created/completed-today windows.

use anyhow::Result;
use anyhow::bail;
use chrono::Days;
use chrono::Duration;
use chrono::Local;
use clap::Args;
use things_core::url::build_search_url;
use things_core::when::local_midnight;
use things_store::List;
use things_store::TaskType;

use crate::app::App;
use crate::db::open_store;
use crate::output::OutputArgs;
use crate::output::write_tasks;
use crate::query::DbArgs;
use crate::query::TaskQueryArgs;

const TODOS: &[TaskType] = &[TaskType::Todo];

#[derive(Debug, Args)]
pub struct TasksCommand {
    #[command(flatten)]
    db: DbArgs,

    #[command(flatten)]
    query: TaskQueryArgs,

    #[command(flatten)]
    output: OutputArgs,
}

impl TasksCommand {
    pub fn run(self, app: &mut App) -> Result<()> {
        let output = self.output.resolve()?;
        let query = self.query.resolve("incomplete", app.config.default_limit)?;
        let store = open_store(app, self.db.path())?;
        let tasks = query.fetch(&store, TODOS, |filter| store.tasks(filter))?;
        write_tasks(app.out.as_mut(), &tasks, &output)
    }
}

#[derive(Debug, Args)]
pub struct ListCommand {
    #[command(flatten)]
    db: DbArgs,

    #[command(flatten)]
    query: TaskQueryArgs,

    #[command(flatten)]
    output: OutputArgs,
}

impl ListCommand {
    pub fn run(self, app: &mut App, list: List) -> Result<()> {
        let output = self.output.resolve()?;
        let default_status = match list {
            List::Logbook | List::Trash => "any",
            _ => "incomplete",
        };
        let query = self.query.resolve(default_status, app.config.default_limit)?;
        let store = open_store(app, self.db.path())?;
        let today = app.today();
        let tasks = query.fetch(&store, TODOS, |filter| store.list(list, today, filter))?;
        write_tasks(app.out.as_mut(), &tasks, &output)
    }
}

#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Words to look for in titles and notes.
    #[arg(value_name = "TERMS", conflicts_with = "search")]
    terms: Vec<String>,

    /// Open the search in Things instead of printing results.
    #[arg(long, conflicts_with_all = ["query", "search"])]
    open: bool,

    #[command(flatten)]
    db: DbArgs,

    #[command(flatten)]
    query: TaskQueryArgs,

    #[command(flatten)]
    output: OutputArgs,
}

impl SearchCommand {
    pub fn run(mut self, app: &mut App) -> Result<()> {
        let terms = self.terms.join(" ").trim().to_string();
        if self.open {
            return app.open_url(&build_search_url(&terms));
        }
        if !terms.is_empty() {
            self.query.search = Some(terms);
        }
        if !self.query.has_selector() {
            bail!("Must specify search terms or filters");
        }
        let output = self.output.resolve()?;
        let query = self.query.resolve("incomplete", app.config.default_limit)?;
        let store = open_store(app, self.db.path())?;
        let tasks = query.fetch(&store, TODOS, |filter| store.tasks(filter))?;
        write_tasks(app.out.as_mut(), &tasks, &output)
    }
}

/// Time windows for `createdtoday` and `logtoday`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// The last 24 hours.
    CreatedToday,
    /// Local midnight to midnight.
    CompletedToday,
}

#[derive(Debug, Args)]
pub struct WindowCommand {
    #[command(flatten)]
    db: DbArgs,

    #[command(flatten)]
    query: TaskQueryArgs,

    #[command(flatten)]
    output: OutputArgs,
}

impl WindowCommand {
    pub fn run(self, app: &mut App, window: Window) -> Result<()> {
        let output = self.output.resolve()?;
        let query = self.query.resolve("any", app.config.default_limit)?;
        let store = open_store(app, self.db.path())?;
        let tasks = match window {
            Window::CreatedToday => {
                let now = Local::now();
                let start = now - Duration::hours(24);
                query.fetch(&store, TODOS, |filter| {
                    store.tasks_created_between(start, now, filter)
                })?
            }
            Window::CompletedToday => {
                let today = app.today();
                let start = local_midnight(today);
                let end = today
                    .checked_add_days(Days::new(1))
                    .map(local_midnight)
                    .unwrap_or_else(|| start + Duration::hours(24));
                query.fetch(&store, TODOS, |filter| {
                    store.tasks_completed_between(start, end, filter)
                })?
            }
        };
        write_tasks(app.out.as_mut(), &tasks, &output)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use things_store::Start;
    use things_store::Status;
    use things_store::fixture::Fixture;
    use things_store::fixture::TaskRow;

    use crate::app::testing::Harness;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seed(fixture: &Fixture) {
        fixture.area("A1", "Work").unwrap();
        fixture.project("P1", "Launch", Some("A1")).unwrap();
        fixture.tag("G1", "errand").unwrap();
        let rows = [
            TaskRow {
                uuid: "T1".to_string(),
                title: "Buy milk".to_string(),
                notes: "see https://shop.example".to_string(),
                start: Start::Anytime,
                tags: vec!["G1".to_string()],
                deadline: Some(day(2026, 3, 1)),
                index: 2,
                ..Default::default()
            },
            TaskRow {
                uuid: "T2".to_string(),
                title: "Write plan".to_string(),
                project: Some("P1".to_string()),
                start: Start::Anytime,
                index: 1,
                ..Default::default()
            },
            TaskRow {
                uuid: "T3".to_string(),
                title: "Inbox thought".to_string(),
                index: 3,
                ..Default::default()
            },
            TaskRow {
                uuid: "T4".to_string(),
                title: "Filed taxes".to_string(),
                status: Status::Completed,
                stopped: Some(Local::now().timestamp() as f64),
                ..Default::default()
            },
            TaskRow {
                uuid: "T5".to_string(),
                title: "Binned".to_string(),
                trashed: true,
                ..Default::default()
            },
        ];
        for row in &rows {
            fixture.task(row).unwrap();
        }
    }

    fn harness() -> Harness {
        Harness::new().with_fixture(seed)
    }

    fn uuids(h: &Harness, args: &[&str]) -> Vec<String> {
        let mut full = args.to_vec();
        full.extend(["--format", "csv", "--select", "uuid", "--no-header"]);
        h.run(&full).unwrap();
        let out = h.out.contents();
        out.lines().map(str::to_string).collect()
    }

    #[test]
    fn tasks_defaults_to_open_todos() {
        let h = harness();
        assert_eq!(uuids(&h, &["tasks"]), vec!["T2", "T1", "T3"]);
    }

    #[test]
    fn tasks_csv_with_header() {
        let h = harness();
        h.run(&["tasks", "--format", "csv", "--select", "uuid,title,status", "--limit", "1"])
            .unwrap();
        assert_eq!(h.out.contents(), "UUID,TITLE,STATUS\nT2,Write plan,incomplete\n");
    }

    #[test]
    fn area_filter_reaches_through_project() {
        let h = harness();
        assert_eq!(uuids(&h, &["tasks", "--filter-area", "work"]), vec!["T2"]);
    }

    #[test]
    fn rich_query_and_sort() {
        let h = harness();
        assert_eq!(
            uuids(&h, &["tasks", "--query", "tag:errand OR project:launch", "--sort", "-title"]),
            vec!["T2", "T1"]
        );
    }

    #[test]
    fn has_url_post_filter() {
        let h = harness();
        assert_eq!(uuids(&h, &["todos", "--has-url"]), vec!["T1"]);
    }

    #[test]
    fn builtin_lists() {
        let h = harness();
        assert_eq!(uuids(&h, &["inbox"]), vec!["T3"]);
        let h = harness();
        assert_eq!(uuids(&h, &["logbook"]), vec!["T4"]);
        let h = harness();
        assert_eq!(uuids(&h, &["trash"]), vec!["T5"]);
    }

    #[test]
    fn logtoday_lists_completions_since_midnight() {
        let h = harness();
        assert_eq!(uuids(&h, &["logtoday"]), vec!["T4"]);
    }

    #[test]
    fn search_terms_match_title_or_notes() {
        let h = harness();
        assert_eq!(uuids(&h, &["search", "shop.example"]), vec!["T1"]);
    }

    #[test]
    fn search_requires_something() {
        let h = harness();
        let err = h.run(&["search"]).unwrap_err();
        assert_eq!(err.to_string(), "Must specify search terms or filters");
    }

    #[test]
    fn search_open_launches_things() {
        let h = Harness::new();
        h.run(&["search", "--open", "milk", "run"]).unwrap();
        assert_eq!(h.only_url(), "things:///search?query=milk%20run");
    }

    #[test]
    fn json_output_includes_checklists_when_recursive() {
        let h = harness();
        h.run(&["tasks", "--json", "--search", "plan", "-r"]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&h.out.contents()).unwrap();
        assert_eq!(parsed[0]["uuid"], "T2");
        assert!(parsed[0]["checklist"].is_array());
    }

    #[test]
    fn json_conflicts_with_other_format() {
        let h = harness();
        let err = h.run(&["tasks", "--json", "--format", "csv"]).unwrap_err();
        assert!(err.to_string().contains("--json conflicts"), "{err}");
    }
}
