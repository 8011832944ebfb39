use std::cmp::Ordering;

use anyhow::Result;
use anyhow::bail;
use things_store::Task;

const SORT_FIELDS: &[&str] = &[
    "created",
    "modified",
    "deadline",
    "start",
    "title",
    "project",
    "area",
    "heading",
    "status",
    "uuid",
    "index",
    "today_idx",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub desc: bool,
}

/// Parse `created,-deadline,title`. A leading `-` sorts descending.
pub fn parse_sort(spec: &str) -> Result<Vec<SortKey>> {
    let mut keys = Vec::new();
    for part in spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (field, desc) = match part.strip_prefix('-') {
            Some(rest) => (rest.trim(), true),
            None => (part.strip_prefix('+').unwrap_or(part).trim(), false),
        };
        let field = field.to_ascii_lowercase();
        if !SORT_FIELDS.contains(&field.as_str()) {
            bail!(
                "unknown sort field {field:?} (valid: {})",
                SORT_FIELDS.join(", ")
            );
        }
        keys.push(SortKey { field, desc });
    }
    Ok(keys)
}

/// Stable sort; ties fall back to uuid.
pub fn sort_tasks(tasks: &mut [Task], keys: &[SortKey]) {
    if keys.is_empty() || tasks.len() < 2 {
        return;
    }
    tasks.sort_by(|left, right| {
        for key in keys {
            let ord = compare_field(left, right, key);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        left.uuid.cmp(&right.uuid)
    });
}

fn compare_field(left: &Task, right: &Task, key: &SortKey) -> Ordering {
    let desc = key.desc;
    let ord = match key.field.as_str() {
        "created" => return empty_last(&left.created, &right.created, desc),
        "modified" => return empty_last(&left.modified, &right.modified, desc),
        "deadline" => return empty_last(&left.deadline, &right.deadline, desc),
        "start" => return empty_last(&left.start_date, &right.start_date, desc),
        "title" => return empty_last_ci(&left.title, &right.title, desc),
        "project" => return empty_last_ci(&left.project_title, &right.project_title, desc),
        "area" => return empty_last_ci(&left.area_title, &right.area_title, desc),
        "heading" => return empty_last_ci(&left.heading_title, &right.heading_title, desc),
        "status" => left.status.code().cmp(&right.status.code()),
        "uuid" => left.uuid.cmp(&right.uuid),
        "index" => left.index.cmp(&right.index),
        "today_idx" => left
            .today_index
            .unwrap_or(0)
            .cmp(&right.today_index.unwrap_or(0)),
        _ => Ordering::Equal,
    };
    if desc { ord.reverse() } else { ord }
}

/// Empty strings sort after everything, in both directions.
fn empty_last(left: &str, right: &str, desc: bool) -> Ordering {
    match (left.is_empty(), right.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) if desc => right.cmp(left),
        (false, false) => left.cmp(right),
    }
}

fn empty_last_ci(left: &str, right: &str, desc: bool) -> Ordering {
    empty_last(&left.to_lowercase(), &right.to_lowercase(), desc)
}
