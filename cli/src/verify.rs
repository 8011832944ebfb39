//! Checking that Things actually applied a `when` change.
//!
//! The URL scheme is fire-and-forget: a wrong auth token or a repeating
//! todo makes Things ignore the update silently. After opening the URL we
//! poll the database until the task's schedule matches.

use std::thread;
use std::time::Duration;
use std::time::Instant;

use anyhow::Result;
use anyhow::anyhow;
use anyhow::bail;
use chrono::Days;
use chrono::NaiveDate;
use things_core::when::parse_date_or_time;
use things_store::Start;
use things_store::Store;
use things_store::StoreError;
use things_store::Task;
use tracing::debug;

pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(4);
pub const VERIFY_POLL: Duration = Duration::from_millis(200);

/// Whether the task's schedule agrees with the requested `when` value.
pub fn when_matches(task: &Task, expected: &str, today: NaiveDate) -> bool {
    let expected = expected.trim();
    if expected.is_empty() {
        return true;
    }
    let day = |date: NaiveDate| date.format("%Y-%m-%d").to_string();
    match expected.to_ascii_lowercase().as_str() {
        "inbox" => task.start == Start::Inbox,
        "anytime" => task.start == Start::Anytime && task.start_date.is_empty(),
        "someday" => task.start == Start::Someday && task.start_date.is_empty(),
        "today" | "evening" => task.start_date == day(today),
        "tomorrow" => today
            .checked_add_days(Days::new(1))
            .is_some_and(|tomorrow| task.start_date == day(tomorrow)),
        _ => match parse_date_or_time(expected) {
            Ok(parsed) => task.start_date == day(parsed.date()),
            // Nothing to compare against; accept.
            Err(_) => true,
        },
    }
}

pub fn repeating_error(id: &str) -> anyhow::Error {
    anyhow!("cannot update when for repeating todos (id {id})")
}

/// Refuse to move a task scheduled for another day into This Evening.
pub fn guard_evening(task: &Task, today: NaiveDate) -> Result<()> {
    if task.start_date.is_empty() {
        return Ok(());
    }
    let today = today.format("%Y-%m-%d").to_string();
    if task.start_date != today {
        bail!(
            "refusing to move task {} to This Evening because it is scheduled for {} (use --allow-non-today to override)",
            task.uuid,
            task.start_date
        );
    }
    Ok(())
}

/// Poll `store` until task `id` matches `expected` or `timeout` passes.
pub fn verify_when_applied(
    store: &Store,
    id: &str,
    expected: &str,
    today: NaiveDate,
    timeout: Duration,
    poll: Duration,
) -> Result<()> {
    let expected = expected.trim();
    if expected.is_empty() {
        return Ok(());
    }
    let deadline = Instant::now() + timeout;
    let last = loop {
        match store.task_by_id(id) {
            Ok(task) => {
                if when_matches(&task, expected, today) {
                    debug!(id, expected, "when update verified");
                    return Ok(());
                }
                if Instant::now() >= deadline {
                    break task;
                }
            }
            // Deleted or never synced; nothing left to verify.
            Err(StoreError::TaskNotFound { .. }) => return Ok(()),
            Err(err) => return Err(err.into()),
        }
        thread::sleep(poll);
    };

    if last.repeating {
        return Err(repeating_error(id));
    }
    bail!(
        "update did not apply (expected when={expected}, got start={:?} start_date={:?}). Check THINGS_AUTH_TOKEN and Things permissions.",
        last.start.label(),
        last.start_date
    )
}
