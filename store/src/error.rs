use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Things database not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to open Things database at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("no task with id {id}")]
    TaskNotFound { id: String },

    #[error("could not resolve home directory")]
    NoHomeDir,

    #[error("database query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

impl StoreError {
    /// Whether the database itself could not be located or opened, as
    /// opposed to a failing query.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound { .. } | StoreError::Open { .. } | StoreError::NoHomeDir
        )
    }
}
