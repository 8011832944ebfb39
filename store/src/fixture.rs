//! A writable database with the subset of the Things schema this crate
//! reads. Used by tests here and in the CLI crate.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::Connection;
use rusqlite::params;

use crate::dates::pack_date;
use crate::model::Start;
use crate::model::Status;
use crate::model::TaskType;

const SCHEMA: &str = r#"
CREATE TABLE TMArea (
    uuid TEXT PRIMARY KEY,
    title TEXT,
    visible INTEGER,
    "index" INTEGER
);
CREATE TABLE TMTag (
    uuid TEXT PRIMARY KEY,
    title TEXT,
    shortcut TEXT,
    parent TEXT,
    "index" INTEGER
);
CREATE TABLE TMTask (
    uuid TEXT PRIMARY KEY,
    title TEXT,
    notes TEXT,
    type INTEGER,
    status INTEGER,
    trashed INTEGER,
    start INTEGER,
    startDate INTEGER,
    deadline INTEGER,
    creationDate REAL,
    userModificationDate REAL,
    stopDate REAL,
    "index" INTEGER,
    todayIndex INTEGER,
    project TEXT,
    area TEXT,
    heading TEXT,
    rt1_repeatingTemplate TEXT,
    rt1_recurrenceRule BLOB
);
CREATE TABLE TMTaskTag (
    tasks TEXT,
    tags TEXT
);
CREATE TABLE TMChecklistItem (
    uuid TEXT PRIMARY KEY,
    title TEXT,
    status INTEGER,
    task TEXT,
    "index" INTEGER,
    stopDate REAL
);
"#;

/// One `TMTask` row. Tags are tag uuids.
#[derive(Debug, Clone, Default)]
pub struct TaskRow {
    pub uuid: String,
    pub title: String,
    pub notes: String,
    pub task_type: TaskType,
    pub status: Status,
    pub start: Start,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub created: Option<f64>,
    pub modified: Option<f64>,
    pub stopped: Option<f64>,
    pub project: Option<String>,
    pub area: Option<String>,
    pub heading: Option<String>,
    pub index: i64,
    pub today_index: Option<i64>,
    pub trashed: bool,
    pub repeating: bool,
    pub tags: Vec<String>,
}

pub struct Fixture {
    conn: Connection,
}

impl Fixture {
    pub fn create(path: &Path) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn area(&self, uuid: &str, title: &str) -> rusqlite::Result<()> {
        self.conn.execute(
            r#"INSERT INTO TMArea (uuid, title, visible, "index") VALUES (?1, ?2, 1, 0)"#,
            params![uuid, title],
        )?;
        Ok(())
    }

    pub fn tag(&self, uuid: &str, title: &str) -> rusqlite::Result<()> {
        self.conn.execute(
            r#"INSERT INTO TMTag (uuid, title, "index") VALUES (?1, ?2, 0)"#,
            params![uuid, title],
        )?;
        Ok(())
    }

    pub fn project(&self, uuid: &str, title: &str, area: Option<&str>) -> rusqlite::Result<()> {
        self.task(&TaskRow {
            uuid: uuid.to_string(),
            title: title.to_string(),
            task_type: TaskType::Project,
            start: Start::Anytime,
            area: area.map(str::to_string),
            ..Default::default()
        })
    }

    pub fn heading(&self, uuid: &str, title: &str, project: &str) -> rusqlite::Result<()> {
        self.task(&TaskRow {
            uuid: uuid.to_string(),
            title: title.to_string(),
            task_type: TaskType::Heading,
            start: Start::Anytime,
            project: Some(project.to_string()),
            ..Default::default()
        })
    }

    pub fn task(&self, row: &TaskRow) -> rusqlite::Result<()> {
        self.conn.execute(
            r#"INSERT INTO TMTask (
                uuid, title, notes, type, status, trashed, start, startDate, deadline,
                creationDate, userModificationDate, stopDate, "index", todayIndex,
                project, area, heading, rt1_repeatingTemplate
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"#,
            params![
                row.uuid,
                row.title,
                row.notes,
                row.task_type.code(),
                row.status.code(),
                i64::from(row.trashed),
                row.start.code(),
                row.start_date.map(pack_date),
                row.deadline.map(pack_date),
                row.created,
                row.modified,
                row.stopped,
                row.index,
                row.today_index,
                row.project,
                row.area,
                row.heading,
                row.repeating.then(|| format!("{}-template", row.uuid)),
            ],
        )?;
        for tag in &row.tags {
            self.conn.execute(
                "INSERT INTO TMTaskTag (tasks, tags) VALUES (?1, ?2)",
                params![row.uuid, tag],
            )?;
        }
        Ok(())
    }

    pub fn checklist_item(
        &self,
        uuid: &str,
        title: &str,
        task: &str,
        status: Status,
    ) -> rusqlite::Result<()> {
        self.conn.execute(
            r#"INSERT INTO TMChecklistItem (uuid, title, status, task, "index") VALUES (?1, ?2, ?3, ?4, 0)"#,
            params![uuid, title, status.code(), task],
        )?;
        Ok(())
    }

    /// Overwrite the schedule of an existing task.
    pub fn set_schedule(
        &self,
        uuid: &str,
        start: Start,
        start_date: Option<NaiveDate>,
    ) -> rusqlite::Result<()> {
        self.conn.execute(
            "UPDATE TMTask SET start = ?1, startDate = ?2 WHERE uuid = ?3",
            params![start.code(), start_date.map(pack_date), uuid],
        )?;
        Ok(())
    }
}
