use std::path::Path;
use std::path::PathBuf;

use crate::Result;
use crate::StoreError;

pub const THINGSDB_ENV_VAR: &str = "THINGSDB";

const GROUP_CONTAINER: &str =
    "Library/Group Containers/JLMPQHK86H.com.culturedcode.ThingsMac";
const DATABASE_SUFFIX: &str = "Things Database.thingsdatabase/main.sqlite";

/// Pick the database path: explicit flag, then `THINGSDB`, then the config
/// value, then the default location under the user's home.
pub fn resolve_database_path(
    explicit: Option<&Path>,
    configured: Option<&Path>,
) -> Result<PathBuf> {
    if let Some(path) = explicit.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path.to_path_buf());
    }
    match std::env::var(THINGSDB_ENV_VAR) {
        Ok(val) if !val.trim().is_empty() => return Ok(PathBuf::from(val.trim())),
        _ => {}
    }
    if let Some(path) = configured.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path.to_path_buf());
    }
    default_database_path()
}

/// `~/Library/Group Containers/<team>.com.culturedcode.ThingsMac/ThingsData-*/...`,
/// falling back to the pre-3.15 location without the `ThingsData-*` level.
pub fn default_database_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(StoreError::NoHomeDir)?;
    Ok(find_in_container(&home.join(GROUP_CONTAINER)))
}

fn find_in_container(container: &Path) -> PathBuf {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(container)
        .into_iter()
        .flatten()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("ThingsData-"))
        .map(|entry| entry.path().join(DATABASE_SUFFIX))
        .filter(|path| path.exists())
        .collect();
    candidates.sort();
    candidates
        .into_iter()
        .next()
        .unwrap_or_else(|| container.join(DATABASE_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn explicit_path_wins() {
        let path = resolve_database_path(Some(Path::new("/tmp/x.sqlite")), None).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/x.sqlite"));
    }

    #[test]
    fn finds_things_data_directory() {
        let dir = TempDir::new().unwrap();
        let db = dir
            .path()
            .join("ThingsData-ABCDE")
            .join("Things Database.thingsdatabase");
        std::fs::create_dir_all(&db).unwrap();
        std::fs::write(db.join("main.sqlite"), b"").unwrap();
        assert_eq!(find_in_container(dir.path()), db.join("main.sqlite"));
    }

    #[test]
    fn falls_back_to_legacy_location() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            find_in_container(dir.path()),
            dir.path().join(DATABASE_SUFFIX)
        );
    }
}
