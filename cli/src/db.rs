use std::path::Path;

use anyhow::Result;
use anyhow::anyhow;
use things_store::Store;
use things_store::StoreError;

use crate::app::App;

/// Open the Things database for a command, preferring `--db`.
pub fn open_store(app: &App, explicit: Option<&Path>) -> Result<Store> {
    Store::open_default(explicit, app.config.database.as_deref()).map_err(format_db_error)
}

/// Like [`open_store`], but a missing database only warns that `purpose`
/// was skipped.
pub fn open_store_optional(
    app: &mut App,
    explicit: Option<&Path>,
    purpose: &str,
) -> Option<Store> {
    match open_store(app, explicit) {
        Ok(store) => Some(store),
        Err(err) => {
            app.warn(format!("could not {purpose} (Things database unavailable): {err}"));
            None
        }
    }
}

pub fn format_db_error(err: StoreError) -> anyhow::Error {
    if err.is_unavailable() {
        anyhow!(
            "{err}. Pass --db PATH or set THINGSDB to the Things main.sqlite (the terminal may need Full Disk Access)."
        )
    } else {
        anyhow::Error::new(err)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::app::testing::Harness;

    #[test]
    fn optional_store_warns_with_purpose() {
        let h = Harness::new();
        let missing = h.home.path().join("nope.sqlite");
        let mut app = h.app();
        assert!(open_store_optional(&mut app, Some(&missing), "check the schedule").is_none());
        drop(app);
        let err = h.err.contents();
        assert!(err.contains("could not check the schedule"), "{err}");
        assert!(err.contains("nope.sqlite"), "{err}");
    }

    #[test]
    fn unavailable_database_mentions_overrides() {
        let err = format_db_error(StoreError::NotFound {
            path: PathBuf::from("/nope/main.sqlite"),
        });
        let message = err.to_string();
        assert!(message.contains("/nope/main.sqlite"), "{message}");
        assert!(message.contains("--db"), "{message}");
        assert!(message.contains("THINGSDB"), "{message}");
    }

    #[test]
    fn other_errors_pass_through() {
        let err = format_db_error(StoreError::TaskNotFound {
            id: "X".to_string(),
        });
        assert_eq!(err.to_string(), "no task with id X");
    }
}
