use std::path::Path;

use chrono::DateTime;
use chrono::Local;
use chrono::NaiveDate;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::Row;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use tracing::debug;

use crate::Result;
use crate::StoreError;
use crate::dates::pack_date;
use crate::dates::packed_to_string;
use crate::dates::timestamp_to_string;
use crate::dates::to_timestamp;
use crate::model::Area;
use crate::model::ChecklistItem;
use crate::model::Project;
use crate::model::Start;
use crate::model::Status;
use crate::model::Tag;
use crate::model::Task;
use crate::model::TaskType;
use crate::path::resolve_database_path;

/// Separator for tag titles inside `group_concat`; never appears in titles.
const TAG_SEPARATOR: char = '\u{1f}';

const TASK_COLUMNS: &str = r#"
    t.uuid, t.title, t.notes, t.type, t.status, t.trashed, t.start,
    t.startDate, t.deadline, t.creationDate, t.userModificationDate, t.stopDate,
    t."index", t.todayIndex,
    (t.rt1_repeatingTemplate IS NOT NULL OR t.rt1_recurrenceRule IS NOT NULL),
    COALESCE(t.project, h.project), p.title,
    COALESCE(t.area, p.area), a.title,
    t.heading, h.title,
    (SELECT group_concat(tg.title, char(31))
       FROM TMTaskTag tt JOIN TMTag tg ON tg.uuid = tt.tags
      WHERE tt.tasks = t.uuid)"#;

const TASK_JOINS: &str = r#"
    FROM TMTask t
    LEFT JOIN TMTask h ON h.uuid = t.heading
    LEFT JOIN TMTask p ON p.uuid = COALESCE(t.project, h.project)
    LEFT JOIN TMArea a ON a.uuid = COALESCE(t.area, p.area)"#;

/// Built-in Things lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum List {
    Inbox,
    Today,
    Upcoming,
    Anytime,
    Someday,
    Logbook,
    Trash,
}

impl List {
    pub fn name(self) -> &'static str {
        match self {
            List::Inbox => "inbox",
            List::Today => "today",
            List::Upcoming => "upcoming",
            List::Anytime => "anytime",
            List::Someday => "someday",
            List::Logbook => "logbook",
            List::Trash => "trash",
        }
    }
}

/// Filters pushed down into SQL.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// `None` matches every status.
    pub status: Option<Status>,
    pub include_trashed: bool,
    /// Empty matches every type.
    pub types: Vec<TaskType>,
    /// Project uuid or title (case-insensitive).
    pub project: String,
    /// Area uuid or title (case-insensitive).
    pub area: String,
    /// Tag uuid or title (case-insensitive).
    pub tag: String,
    /// Case-insensitive substring of title or notes.
    pub search: String,
    /// 0 means no limit.
    pub limit: usize,
    pub offset: usize,
}

enum Scope {
    All,
    List(List, NaiveDate),
    CreatedBetween(f64, f64),
    CompletedBetween(f64, f64),
    Id(String),
}

#[derive(Default)]
struct Query {
    clauses: Vec<String>,
    values: Vec<Value>,
}

impl Query {
    fn push(&mut self, clause: impl Into<String>, values: impl IntoIterator<Item = Value>) {
        self.clauses.push(clause.into());
        self.values.extend(values);
    }

    fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

/// Read-only handle on a Things database.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the database at `path` read-only.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(StoreError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "opened Things database");
        Ok(Self { conn })
    }

    /// Resolve the path (flag, `THINGSDB`, config, default) and open it.
    pub fn open_default(explicit: Option<&Path>, configured: Option<&Path>) -> Result<Self> {
        let path = resolve_database_path(explicit, configured)?;
        Self::open(&path)
    }

    pub fn tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.query_tasks(Scope::All, filter)
    }

    /// Tasks in a built-in list, as of `today`.
    pub fn list(&self, list: List, today: NaiveDate, filter: &TaskFilter) -> Result<Vec<Task>> {
        debug!(list = list.name(), %today, "querying built-in list");
        let mut filter = filter.clone();
        if list == List::Trash {
            filter.include_trashed = true;
        }
        self.query_tasks(Scope::List(list, today), &filter)
    }

    pub fn tasks_created_between(
        &self,
        start: DateTime<Local>,
        end: DateTime<Local>,
        filter: &TaskFilter,
    ) -> Result<Vec<Task>> {
        self.query_tasks(
            Scope::CreatedBetween(to_timestamp(&start), to_timestamp(&end)),
            filter,
        )
    }

    pub fn tasks_completed_between(
        &self,
        start: DateTime<Local>,
        end: DateTime<Local>,
        filter: &TaskFilter,
    ) -> Result<Vec<Task>> {
        self.query_tasks(
            Scope::CompletedBetween(to_timestamp(&start), to_timestamp(&end)),
            filter,
        )
    }

    /// A single task of any type, trashed or not.
    pub fn task_by_id(&self, id: &str) -> Result<Task> {
        let filter = TaskFilter {
            include_trashed: true,
            ..Default::default()
        };
        self.query_tasks(Scope::Id(id.to_string()), &filter)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::TaskNotFound { id: id.to_string() })
    }

    pub fn checklist_items(&self, task_id: &str) -> Result<Vec<ChecklistItem>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT uuid, title, status FROM TMChecklistItem WHERE task = ?1 ORDER BY "index""#,
        )?;
        let items = stmt
            .query_map([task_id], |row| {
                Ok(ChecklistItem {
                    uuid: row.get(0)?,
                    title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    status: Status::from_code(row.get::<_, Option<i64>>(2)?.unwrap_or(0)),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// Attach checklist items to each task.
    pub fn load_checklists(&self, tasks: &mut [Task]) -> Result<()> {
        for task in tasks {
            task.checklist = Some(self.checklist_items(&task.uuid)?);
        }
        Ok(())
    }

    pub fn projects(&self, status: Option<Status>, include_trashed: bool) -> Result<Vec<Project>> {
        let mut query = Query::default();
        query.push("p.type = ?", [Value::Integer(TaskType::Project.code())]);
        if !include_trashed {
            query.push("p.trashed = 0", []);
        }
        if let Some(status) = status {
            query.push("p.status = ?", [Value::Integer(status.code())]);
        }
        let sql = format!(
            r#"SELECT p.uuid, p.title, p.area, a.title, p.status, p.trashed
               FROM TMTask p LEFT JOIN TMArea a ON a.uuid = p.area{} ORDER BY p."index", p.uuid"#,
            query.where_sql()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let projects = stmt
            .query_map(params_from_iter(query.values.iter()), |row| {
                Ok(Project {
                    uuid: row.get(0)?,
                    title: opt_text(row, 1)?,
                    area_id: opt_text(row, 2)?,
                    area_title: opt_text(row, 3)?,
                    status: Status::from_code(opt_int(row, 4)?),
                    trashed: opt_int(row, 5)? != 0,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(projects)
    }

    pub fn areas(&self) -> Result<Vec<Area>> {
        let mut stmt = self
            .conn
            .prepare(r#"SELECT uuid, title, visible FROM TMArea ORDER BY "index", uuid"#)?;
        let areas = stmt
            .query_map([], |row| {
                Ok(Area {
                    uuid: row.get(0)?,
                    title: opt_text(row, 1)?,
                    visible: row.get::<_, Option<i64>>(2)?.unwrap_or(1) != 0,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(areas)
    }

    pub fn tags(&self) -> Result<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT uuid, title, shortcut, parent FROM TMTag ORDER BY "index", uuid"#,
        )?;
        let tags = stmt
            .query_map([], |row| {
                Ok(Tag {
                    uuid: row.get(0)?,
                    title: opt_text(row, 1)?,
                    shortcut: opt_text(row, 2)?,
                    parent: opt_text(row, 3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tags)
    }

    fn query_tasks(&self, scope: Scope, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut query = Query::default();
        let mut order = r#"t."index", t.uuid"#;

        match scope {
            Scope::All => {}
            Scope::Id(id) => query.push("t.uuid = ?", [Value::Text(id)]),
            Scope::CreatedBetween(start, end) => query.push(
                "t.creationDate >= ? AND t.creationDate < ?",
                [Value::Real(start), Value::Real(end)],
            ),
            Scope::CompletedBetween(start, end) => {
                query.push(
                    "t.status = ? AND t.stopDate >= ? AND t.stopDate < ?",
                    [
                        Value::Integer(Status::Completed.code()),
                        Value::Real(start),
                        Value::Real(end),
                    ],
                );
                order = "t.stopDate DESC, t.uuid";
            }
            Scope::List(list, today) => {
                let today = Value::Integer(pack_date(today));
                match list {
                    List::Inbox => {
                        query.push("t.start = ?", [Value::Integer(Start::Inbox.code())]);
                    }
                    List::Today => {
                        query.push(
                            "t.start IN (1, 2) AND t.startDate IS NOT NULL AND t.startDate <= ?",
                            [today],
                        );
                        order = r#"COALESCE(t.todayIndex, 0), t."index", t.uuid"#;
                    }
                    List::Upcoming => {
                        query.push("t.startDate IS NOT NULL AND t.startDate > ?", [today]);
                        order = r#"t.startDate, t."index", t.uuid"#;
                    }
                    List::Anytime => {
                        query.push("t.start = ?", [Value::Integer(Start::Anytime.code())]);
                    }
                    List::Someday => {
                        query.push(
                            "t.start = ? AND t.startDate IS NULL",
                            [Value::Integer(Start::Someday.code())],
                        );
                    }
                    List::Logbook => {
                        query.push("t.status IN (2, 3)", []);
                        order = "t.stopDate DESC, t.uuid";
                    }
                    List::Trash => query.push("t.trashed = 1", []),
                }
            }
        }

        if !filter.types.is_empty() {
            let marks = vec!["?"; filter.types.len()].join(", ");
            query.push(
                format!("t.type IN ({marks})"),
                filter.types.iter().map(|t| Value::Integer(t.code())),
            );
        }
        if let Some(status) = filter.status {
            query.push("t.status = ?", [Value::Integer(status.code())]);
        }
        if !filter.include_trashed {
            query.push("t.trashed = 0", []);
        }
        let project = filter.project.trim();
        if !project.is_empty() {
            query.push(
                "(COALESCE(t.project, h.project) = ? OR lower(p.title) = lower(?))",
                [text(project), text(project)],
            );
        }
        let area = filter.area.trim();
        if !area.is_empty() {
            query.push(
                "(COALESCE(t.area, p.area) = ? OR lower(a.title) = lower(?))",
                [text(area), text(area)],
            );
        }
        let tag = filter.tag.trim();
        if !tag.is_empty() {
            query.push(
                "EXISTS (SELECT 1 FROM TMTaskTag tt JOIN TMTag tg ON tg.uuid = tt.tags \
                 WHERE tt.tasks = t.uuid AND (tg.uuid = ? OR lower(tg.title) = lower(?)))",
                [text(tag), text(tag)],
            );
        }
        let search = filter.search.trim().to_lowercase();
        if !search.is_empty() {
            query.push(
                "(instr(lower(COALESCE(t.title, '')), ?) > 0 OR instr(lower(COALESCE(t.notes, '')), ?) > 0)",
                [text(&search), text(&search)],
            );
        }

        let mut sql = format!(
            "SELECT {TASK_COLUMNS} {TASK_JOINS}{} ORDER BY {order}",
            query.where_sql()
        );
        if filter.limit > 0 || filter.offset > 0 {
            sql.push_str(" LIMIT ? OFFSET ?");
            let limit = if filter.limit > 0 {
                i64::try_from(filter.limit).unwrap_or(i64::MAX)
            } else {
                -1
            };
            query.values.push(Value::Integer(limit));
            query
                .values
                .push(Value::Integer(i64::try_from(filter.offset).unwrap_or(i64::MAX)));
        }

        debug!(%sql, params = query.values.len(), "querying tasks");
        let mut stmt = self.conn.prepare(&sql)?;
        let tasks = stmt
            .query_map(params_from_iter(query.values.iter()), task_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tasks)
    }
}

fn opt_text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

fn opt_int(row: &Row<'_>, idx: usize) -> rusqlite::Result<i64> {
    Ok(row.get::<_, Option<i64>>(idx)?.unwrap_or(0))
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let mut tags: Vec<String> = opt_text(row, 21)?
        .split(TAG_SEPARATOR)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    tags.sort_by_key(|t| t.to_lowercase());

    Ok(Task {
        uuid: row.get(0)?,
        title: opt_text(row, 1)?,
        notes: opt_text(row, 2)?,
        task_type: TaskType::from_code(opt_int(row, 3)?),
        status: Status::from_code(opt_int(row, 4)?),
        trashed: opt_int(row, 5)? != 0,
        start: Start::from_code(opt_int(row, 6)?),
        start_date: packed_to_string(row.get(7)?),
        deadline: packed_to_string(row.get(8)?),
        created: timestamp_to_string(row.get(9)?),
        modified: timestamp_to_string(row.get(10)?),
        completed: timestamp_to_string(row.get(11)?),
        index: opt_int(row, 12)?,
        today_index: row.get(13)?,
        repeating: opt_int(row, 14)? != 0,
        project_id: opt_text(row, 15)?,
        project_title: opt_text(row, 16)?,
        area_id: opt_text(row, 17)?,
        area_title: opt_text(row, 18)?,
        heading_id: opt_text(row, 19)?,
        heading_title: opt_text(row, 20)?,
        tags,
        checklist: None,
    })
}
