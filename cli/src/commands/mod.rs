//! One module per subcommand group. Each command is a clap `Args` struct
//! with a `run` method taking the shared [`crate::app::App`].

pub mod add;
pub mod catalog;
pub mod completion;
pub mod delete;
pub mod list;
pub mod show;
pub mod undo;
pub mod update;
pub mod update_project;
pub mod version;

