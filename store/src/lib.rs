//! Read-only access to the Things 3 SQLite database.
//!
//! Things keeps everything in one `main.sqlite`: todos, projects and
//! headings share `TMTask` (distinguished by `type`), with areas, tags and
//! checklist items in their own tables.

mod dates;
mod error;
#[cfg(any(test, feature = "fixture"))]
pub mod fixture;
mod model;
mod path;
mod store;

pub use error::Result;
pub use error::StoreError;
pub use model::Area;
pub use model::ChecklistItem;
pub use model::Project;
pub use model::Start;
pub use model::Status;
pub use model::Tag;
pub use model::Task;
pub use model::TaskType;
pub use store::List;
pub use store::Store;
pub use store::TaskFilter;
