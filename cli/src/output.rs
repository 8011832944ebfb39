use std::io::Write;

use anyhow::Result;
use anyhow::bail;
use clap::Args;
use serde_json::Map;
use serde_json::Value;
use tabwriter::TabWriter;
use things_store::Area;
use things_store::Project;
use things_store::Tag;
use things_store::Task;

/// Columns shown when `--select` is not given.
const DEFAULT_FIELDS: &[&str] = &[
    "uuid",
    "title",
    "status",
    "start",
    "start_date",
    "deadline",
    "project",
    "area",
    "tags",
];

const TASK_FIELDS: &[&str] = &[
    "uuid",
    "title",
    "notes",
    "type",
    "status",
    "start",
    "start_date",
    "deadline",
    "created",
    "modified",
    "completed",
    "project",
    "project_id",
    "area",
    "area_id",
    "heading",
    "heading_id",
    "tags",
    "index",
    "today_index",
    "repeating",
    "trashed",
];

const PREVIEW_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Table,
    Json,
    Jsonl,
    Csv,
}

impl Format {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "table" => Some(Format::Table),
            "json" => Some(Format::Json),
            "jsonl" | "ndjson" => Some(Format::Jsonl),
            "csv" => Some(Format::Csv),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutput {
    pub format: Format,
    /// Empty means the format's default columns.
    pub select: Vec<String>,
    pub no_header: bool,
}

impl Default for TaskOutput {
    fn default() -> Self {
        Self {
            format: Format::Table,
            select: Vec::new(),
            no_header: false,
        }
    }
}

impl TaskOutput {
    /// Combine `--format`, `--json`, `--select` and `--no-header`.
    pub fn resolve(
        format: Option<&str>,
        json: bool,
        select: Option<&str>,
        no_header: bool,
    ) -> Result<Self> {
        let explicit = match format.map(str::trim).filter(|f| !f.is_empty()) {
            Some(raw) => match Format::parse(raw) {
                Some(format) => Some(format),
                None => bail!("invalid --format {raw:?} (use table, json, jsonl, or csv)"),
            },
            None => None,
        };
        let format = match (explicit, json) {
            (Some(format), true) if format != Format::Json => {
                bail!("--json conflicts with --format {}", format_name(format))
            }
            (Some(format), _) => format,
            (None, true) => Format::Json,
            (None, false) => Format::Table,
        };

        let mut fields = Vec::new();
        for field in select.unwrap_or_default().split(',') {
            let field = field.trim().to_ascii_lowercase();
            if field.is_empty() {
                continue;
            }
            if !TASK_FIELDS.contains(&field.as_str()) {
                bail!(
                    "unknown field {field:?} in --select (valid: {})",
                    TASK_FIELDS.join(", ")
                );
            }
            fields.push(field);
        }

        Ok(Self {
            format,
            select: fields,
            no_header,
        })
    }

    fn columns(&self) -> Vec<&str> {
        if self.select.is_empty() {
            DEFAULT_FIELDS.to_vec()
        } else {
            self.select.iter().map(String::as_str).collect()
        }
    }
}

/// Output flags shared by every task listing.
#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    /// Output format: table, json, jsonl, or csv.
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Comma-separated fields to include.
    #[arg(long, value_name = "FIELDS")]
    pub select: Option<String>,

    /// Shorthand for `--format json`.
    #[arg(long, short = 'j')]
    pub json: bool,

    /// Omit the header row in table and csv output.
    #[arg(long)]
    pub no_header: bool,
}

impl OutputArgs {
    pub fn resolve(&self) -> Result<TaskOutput> {
        TaskOutput::resolve(
            self.format.as_deref(),
            self.json,
            self.select.as_deref(),
            self.no_header,
        )
    }
}

fn format_name(format: Format) -> &'static str {
    match format {
        Format::Table => "table",
        Format::Json => "json",
        Format::Jsonl => "jsonl",
        Format::Csv => "csv",
    }
}

/// One field of a task as display text.
fn field_text(task: &Task, field: &str) -> String {
    match field {
        "uuid" => task.uuid.clone(),
        "title" => task.title.clone(),
        "notes" => task.notes.clone(),
        "type" => match task.task_type {
            things_store::TaskType::Todo => "todo",
            things_store::TaskType::Project => "project",
            things_store::TaskType::Heading => "heading",
        }
        .to_string(),
        "status" => task.status.label().to_string(),
        "start" => task.start.label().to_string(),
        "start_date" => task.start_date.clone(),
        "deadline" => task.deadline.clone(),
        "created" => task.created.clone(),
        "modified" => task.modified.clone(),
        "completed" => task.completed.clone(),
        "project" => task.project_title.clone(),
        "project_id" => task.project_id.clone(),
        "area" => task.area_title.clone(),
        "area_id" => task.area_id.clone(),
        "heading" => task.heading_title.clone(),
        "heading_id" => task.heading_id.clone(),
        "tags" => task.tags.join(","),
        "index" => task.index.to_string(),
        "today_index" => task.today_index.map(|i| i.to_string()).unwrap_or_default(),
        "repeating" => task.repeating.to_string(),
        "trashed" => task.trashed.to_string(),
        _ => String::new(),
    }
}

/// One field of a task as JSON, keeping native types.
fn field_json(task: &Task, field: &str) -> Value {
    match field {
        "tags" => Value::from(task.tags.clone()),
        "index" => Value::from(task.index),
        "today_index" => task.today_index.map(Value::from).unwrap_or(Value::Null),
        "repeating" => Value::from(task.repeating),
        "trashed" => Value::from(task.trashed),
        _ => Value::from(field_text(task, field)),
    }
}

fn task_json(task: &Task, opts: &TaskOutput) -> Result<Value> {
    if opts.select.is_empty() {
        return Ok(serde_json::to_value(task)?);
    }
    let mut map = Map::new();
    for field in &opts.select {
        map.insert(field.clone(), field_json(task, field));
    }
    Ok(Value::Object(map))
}

/// Table cells are one line each.
fn cell(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

fn csv_cell(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn header<S: AsRef<str>>(columns: &[S]) -> Vec<String> {
    columns.iter().map(|c| c.as_ref().to_uppercase()).collect()
}

fn table_writer<W: Write>(out: W) -> TabWriter<W> {
    TabWriter::new(out).minwidth(0).padding(2)
}

pub fn write_tasks(out: &mut dyn Write, tasks: &[Task], opts: &TaskOutput) -> Result<()> {
    match opts.format {
        Format::Json => {
            let values = tasks
                .iter()
                .map(|task| task_json(task, opts))
                .collect::<Result<Vec<_>>>()?;
            serde_json::to_writer_pretty(&mut *out, &values)?;
            writeln!(out)?;
        }
        Format::Jsonl => {
            for task in tasks {
                serde_json::to_writer(&mut *out, &task_json(task, opts)?)?;
                writeln!(out)?;
            }
        }
        Format::Csv => {
            let columns = opts.columns();
            if !opts.no_header {
                writeln!(out, "{}", header(&columns).join(","))?;
            }
            for task in tasks {
                let row: Vec<String> = columns
                    .iter()
                    .map(|c| csv_cell(&field_text(task, c)))
                    .collect();
                writeln!(out, "{}", row.join(","))?;
            }
        }
        Format::Table => {
            let columns = opts.columns();
            let mut tw = table_writer(&mut *out);
            if !opts.no_header {
                writeln!(tw, "{}", header(&columns).join("\t"))?;
            }
            for task in tasks {
                let row: Vec<String> = columns.iter().map(|c| cell(&field_text(task, c))).collect();
                writeln!(tw, "{}", row.join("\t"))?;
            }
            tw.flush()?;
        }
    }
    Ok(())
}

/// `Matches: N` followed by a table of at most the first twenty tasks.
pub fn preview_tasks(out: &mut dyn Write, tasks: &[Task]) -> Result<()> {
    writeln!(out, "Matches: {}", tasks.len())?;
    if tasks.is_empty() {
        return Ok(());
    }
    let shown = if tasks.len() > PREVIEW_LIMIT {
        writeln!(out, "Preview (first {PREVIEW_LIMIT}):")?;
        &tasks[..PREVIEW_LIMIT]
    } else {
        writeln!(out, "Preview:")?;
        tasks
    };
    write_tasks(out, shown, &TaskOutput::default())
}

pub fn write_projects(
    out: &mut dyn Write,
    projects: &[Project],
    json: bool,
    no_header: bool,
) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, projects)?;
        writeln!(out)?;
        return Ok(());
    }
    let mut tw = table_writer(&mut *out);
    if !no_header {
        writeln!(tw, "UUID\tTITLE\tAREA\tSTATUS\tTRASHED")?;
    }
    for p in projects {
        writeln!(
            tw,
            "{}\t{}\t{}\t{}\t{}",
            p.uuid,
            cell(&p.title),
            cell(&p.area_title),
            p.status,
            p.trashed
        )?;
    }
    tw.flush()?;
    Ok(())
}

pub fn write_areas(out: &mut dyn Write, areas: &[Area], json: bool, no_header: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, areas)?;
        writeln!(out)?;
        return Ok(());
    }
    let mut tw = table_writer(&mut *out);
    if !no_header {
        writeln!(tw, "UUID\tTITLE\tVISIBLE")?;
    }
    for a in areas {
        writeln!(tw, "{}\t{}\t{}", a.uuid, cell(&a.title), a.visible)?;
    }
    tw.flush()?;
    Ok(())
}

pub fn write_tags(out: &mut dyn Write, tags: &[Tag], json: bool, no_header: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, tags)?;
        writeln!(out)?;
        return Ok(());
    }
    let mut tw = table_writer(&mut *out);
    if !no_header {
        writeln!(tw, "UUID\tTITLE\tSHORTCUT\tPARENT")?;
    }
    for t in tags {
        writeln!(
            tw,
            "{}\t{}\t{}\t{}",
            t.uuid,
            cell(&t.title),
            cell(&t.shortcut),
            t.parent
        )?;
    }
    tw.flush()?;
    Ok(())
}
