//! Shared task selection: the query flags every listing, bulk update and
//! bulk delete accepts, and the pipeline that turns them into tasks.

use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::Result;
use anyhow::bail;
use chrono::DateTime;
use chrono::Local;
use chrono::NaiveDate;
use clap::Args;
use regex_lite::Regex;
use things_core::when::parse_date_or_time;
use things_core::when::parse_day;
use things_store::Status;
use things_store::Store;
use things_store::Task;
use things_store::TaskFilter;
use things_store::TaskType;
use tracing::debug;

use crate::db::format_db_error;
use crate::query_lang::Expr;
use crate::sort::SortKey;
use crate::sort::parse_sort;
use crate::sort::sort_tasks;

static URL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[A-Za-z][A-Za-z0-9+.-]*://[^\s<>()\[\]]+").ok());

/// URLs mentioned in `text`, in order of appearance.
pub fn urls_in(text: &str) -> Vec<&str> {
    match URL_RE.as_ref() {
        Some(re) => re.find_iter(text).map(|m| m.as_str()).collect(),
        None => Vec::new(),
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct DbArgs {
    /// Path to the Things database (overrides THINGSDB).
    #[arg(long = "db", short = 'd', visible_alias = "database", value_name = "PATH")]
    pub db: Option<PathBuf>,
}

impl DbArgs {
    pub fn path(&self) -> Option<&std::path::Path> {
        self.db.as_deref()
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct TaskQueryArgs {
    /// Filter by status: incomplete, completed, canceled, any.
    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,

    /// Filter by project title or ID.
    #[arg(long = "filter-project", short = 'p', visible_alias = "project", value_name = "PROJECT")]
    pub project: Option<String>,

    /// Filter by area title or ID.
    #[arg(long = "filter-area", short = 'a', visible_alias = "area", value_name = "AREA")]
    pub area: Option<String>,

    /// Filter by tag title or ID.
    #[arg(long = "filter-tag", short = 't', visible_alias = "tag", value_name = "TAG")]
    pub tag: Option<String>,

    /// Search title or notes (case-insensitive substring).
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Rich query, e.g. `title:/regex/ AND tag:reading`.
    #[arg(long, value_name = "QUERY")]
    pub query: Option<String>,

    /// Limit number of results (0 = no limit).
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Offset results for pagination.
    #[arg(long, default_value_t = 0, value_name = "N")]
    pub offset: usize,

    /// Include trashed tasks.
    #[arg(long)]
    pub include_trashed: bool,

    /// Include completed, canceled and trashed tasks.
    #[arg(long)]
    pub all: bool,

    /// Include checklist items in JSON output.
    #[arg(long, short = 'r')]
    pub recursive: bool,

    /// Tasks created before (YYYY-MM-DD or RFC3339).
    #[arg(long, value_name = "DATE")]
    pub created_before: Option<String>,

    /// Tasks created after (YYYY-MM-DD or RFC3339).
    #[arg(long, value_name = "DATE")]
    pub created_after: Option<String>,

    /// Tasks modified before (YYYY-MM-DD or RFC3339).
    #[arg(long, value_name = "DATE")]
    pub modified_before: Option<String>,

    /// Tasks modified after (YYYY-MM-DD or RFC3339).
    #[arg(long, value_name = "DATE")]
    pub modified_after: Option<String>,

    /// Tasks due before (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub due_before: Option<String>,

    /// Tasks starting before (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub start_before: Option<String>,

    /// Only tasks with URLs in their notes.
    #[arg(long)]
    pub has_url: bool,

    /// Sort by fields, e.g. `created,-deadline,title`.
    #[arg(long, value_name = "FIELDS", allow_hyphen_values = true)]
    pub sort: Option<String>,
}

fn set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn text(value: &Option<String>) -> String {
    value.as_deref().unwrap_or_default().trim().to_string()
}

impl TaskQueryArgs {
    /// Whether the user narrowed the selection at all. Bulk operations
    /// refuse to run without one.
    pub fn has_selector(&self) -> bool {
        set(&self.status)
            || set(&self.project)
            || set(&self.area)
            || set(&self.tag)
            || set(&self.search)
            || set(&self.query)
            || set(&self.created_before)
            || set(&self.created_after)
            || set(&self.modified_before)
            || set(&self.modified_after)
            || set(&self.due_before)
            || set(&self.start_before)
            || self.has_url
            || self.all
            || self.include_trashed
    }

    /// Resolve the flags against a command's default status and limit.
    pub fn resolve(&self, default_status: &str, default_limit: usize) -> Result<TaskQuery> {
        let status_raw = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(default_status);
        let status = if self.all || status_raw.eq_ignore_ascii_case("any") {
            None
        } else {
            match Status::parse(status_raw) {
                Some(status) => Some(status),
                None => bail!(
                    "invalid --status {status_raw:?} (use incomplete, completed, canceled, or any)"
                ),
            }
        };

        let query = if set(&self.query) {
            Some(Expr::parse(&text(&self.query))?)
        } else {
            None
        };

        Ok(TaskQuery {
            filter: TaskFilter {
                status,
                include_trashed: self.include_trashed || self.all,
                types: Vec::new(),
                project: text(&self.project),
                area: text(&self.area),
                tag: text(&self.tag),
                search: text(&self.search),
                limit: self.limit.unwrap_or(default_limit),
                offset: self.offset,
            },
            query,
            created_before: parse_instant(&self.created_before)?,
            created_after: parse_instant(&self.created_after)?,
            modified_before: parse_instant(&self.modified_before)?,
            modified_after: parse_instant(&self.modified_after)?,
            due_before: parse_opt_day(&self.due_before)?,
            start_before: parse_opt_day(&self.start_before)?,
            has_url: self.has_url,
            sort: match &self.sort {
                Some(spec) => parse_sort(spec)?,
                None => Vec::new(),
            },
            recursive: self.recursive,
        })
    }
}

fn parse_instant(value: &Option<String>) -> Result<Option<DateTime<Local>>> {
    if !set(value) {
        return Ok(None);
    }
    Ok(Some(parse_date_or_time(&text(value))?.at))
}

fn parse_opt_day(value: &Option<String>) -> Result<Option<NaiveDate>> {
    if !set(value) {
        return Ok(None);
    }
    Ok(Some(parse_day(&text(value))?))
}

/// Validated query flags.
#[derive(Debug)]
pub struct TaskQuery {
    pub filter: TaskFilter,
    query: Option<Expr>,
    created_before: Option<DateTime<Local>>,
    created_after: Option<DateTime<Local>>,
    modified_before: Option<DateTime<Local>>,
    modified_after: Option<DateTime<Local>>,
    due_before: Option<NaiveDate>,
    start_before: Option<NaiveDate>,
    has_url: bool,
    sort: Vec<SortKey>,
    recursive: bool,
}

impl TaskQuery {
    /// Anything that has to run in Rust after the SQL query.
    fn needs_post_filter(&self) -> bool {
        self.query.is_some()
            || self.created_before.is_some()
            || self.created_after.is_some()
            || self.modified_before.is_some()
            || self.modified_after.is_some()
            || self.due_before.is_some()
            || self.start_before.is_some()
            || self.has_url
            || !self.sort.is_empty()
    }

    fn keep(&self, task: &Task) -> bool {
        if self.query.as_ref().is_some_and(|expr| !expr.matches(task)) {
            return false;
        }
        let created = parse_stamp(&task.created);
        let modified = parse_stamp(&task.modified);
        if !within(created, self.created_after, self.created_before) {
            return false;
        }
        if !within(modified, self.modified_after, self.modified_before) {
            return false;
        }
        if !day_before(&task.deadline, self.due_before) {
            return false;
        }
        if !day_before(&task.start_date, self.start_before) {
            return false;
        }
        if self.has_url && urls_in(&task.notes).is_empty() {
            return false;
        }
        true
    }

    /// Run `fetch` with the pushed-down filter, then apply post-filters,
    /// sorting and pagination. When a post-filter is active the database is
    /// queried unpaginated so limit and offset count surviving tasks.
    pub fn fetch<F>(&self, store: &Store, types: &[TaskType], fetch: F) -> Result<Vec<Task>>
    where
        F: FnOnce(&TaskFilter) -> things_store::Result<Vec<Task>>,
    {
        let mut filter = self.filter.clone();
        filter.types = types.to_vec();
        let post = self.needs_post_filter();
        if post {
            filter.limit = 0;
            filter.offset = 0;
        }
        debug!(?filter, post, "fetching tasks");

        let mut tasks = fetch(&filter).map_err(format_db_error)?;
        if post {
            tasks.retain(|task| self.keep(task));
            sort_tasks(&mut tasks, &self.sort);
            tasks = paginate(tasks, self.filter.offset, self.filter.limit);
        }
        if self.recursive {
            store.load_checklists(&mut tasks).map_err(format_db_error)?;
        }
        Ok(tasks)
    }
}

fn paginate(tasks: Vec<Task>, offset: usize, limit: usize) -> Vec<Task> {
    let iter = tasks.into_iter().skip(offset);
    if limit > 0 {
        iter.take(limit).collect()
    } else {
        iter.collect()
    }
}

fn parse_stamp(value: &str) -> Option<DateTime<Local>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|at| at.with_timezone(&Local))
}

/// Tasks without the timestamp never pass an active bound.
fn within(
    value: Option<DateTime<Local>>,
    after: Option<DateTime<Local>>,
    before: Option<DateTime<Local>>,
) -> bool {
    if after.is_none() && before.is_none() {
        return true;
    }
    let Some(value) = value else {
        return false;
    };
    after.is_none_or(|after| value > after) && before.is_none_or(|before| value < before)
}

fn day_before(value: &str, bound: Option<NaiveDate>) -> bool {
    let Some(bound) = bound else {
        return true;
    };
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok_and(|day| day < bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args() -> TaskQueryArgs {
        TaskQueryArgs::default()
    }

    #[derive(Debug, clap::Parser)]
    struct Wrapper {
        #[command(flatten)]
        query: TaskQueryArgs,
    }

    #[test]
    fn sort_accepts_leading_hyphen() {
        use clap::Parser;

        let parsed = Wrapper::try_parse_from(["things", "--sort", "-deadline,title"]).unwrap();
        assert_eq!(parsed.query.sort.as_deref(), Some("-deadline,title"));
        let query = parsed.query.resolve("incomplete", 0).unwrap();
        assert!(query.needs_post_filter());
    }

    #[test]
    fn finds_urls() {
        assert_eq!(
            urls_in("see https://a.example/x and things:///show?id=1."),
            vec!["https://a.example/x", "things:///show?id=1."]
        );
        assert!(urls_in("no links here").is_empty());
    }

    #[test]
    fn selector_detection() {
        assert!(!args().has_selector());
        let mut a = args();
        a.limit = Some(5);
        a.sort = Some("title".to_string());
        assert!(!a.has_selector());
        a.tag = Some("work".to_string());
        assert!(a.has_selector());

        let mut b = args();
        b.status = Some("completed".to_string());
        assert!(b.has_selector());
    }

    #[test]
    fn resolve_applies_defaults() {
        let query = args().resolve("incomplete", 200).unwrap();
        assert_eq!(query.filter.status, Some(Status::Incomplete));
        assert_eq!(query.filter.limit, 200);
        assert!(!query.filter.include_trashed);
        assert!(!query.needs_post_filter());

        let mut all = args();
        all.all = true;
        all.status = Some("completed".to_string());
        let query = all.resolve("incomplete", 200).unwrap();
        assert_eq!(query.filter.status, None);
        assert!(query.filter.include_trashed);
    }

    #[test]
    fn resolve_rejects_bad_values() {
        let mut a = args();
        a.status = Some("later".to_string());
        assert!(a.resolve("incomplete", 0).is_err());

        let mut b = args();
        b.due_before = Some("soon".to_string());
        assert!(b.resolve("incomplete", 0).is_err());

        let mut c = args();
        c.sort = Some("priority".to_string());
        assert!(c.resolve("incomplete", 0).is_err());
    }

    #[test]
    fn post_filters_keep_matching_tasks() {
        let mut a = args();
        a.due_before = Some("2026-02-01".to_string());
        a.has_url = true;
        let query = a.resolve("any", 0).unwrap();
        assert!(query.needs_post_filter());

        let mut task = Task::new("T1", "Pay");
        task.deadline = "2026-01-15".to_string();
        task.notes = "https://bank.example".to_string();
        assert!(query.keep(&task));

        task.deadline = "2026-02-01".to_string();
        assert!(!query.keep(&task));

        task.deadline = String::new();
        assert!(!query.keep(&task));
    }

    #[test]
    fn created_bounds_are_exclusive() {
        let mut a = args();
        a.created_after = Some("2026-01-01".to_string());
        let query = a.resolve("any", 0).unwrap();

        let mut task = Task::new("T1", "x");
        assert!(!query.keep(&task), "missing timestamp never matches");
        task.created = "2030-01-01T00:00:00Z".to_string();
        assert!(query.keep(&task));
        task.created = "2020-01-01T00:00:00Z".to_string();
        assert!(!query.keep(&task));
    }

    #[test]
    fn paginate_skips_then_takes() {
        let tasks: Vec<Task> = ["A", "B", "C", "D"]
            .into_iter()
            .map(|id| Task::new(id, id))
            .collect();
        let page = paginate(tasks.clone(), 1, 2);
        assert_eq!(
            page.iter().map(|t| t.uuid.as_str()).collect::<Vec<_>>(),
            vec!["B", "C"]
        );
        assert_eq!(paginate(tasks, 3, 0).len(), 1);
    }
}
