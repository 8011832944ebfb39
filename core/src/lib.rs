//! Building blocks for talking to Things 3: `things:///` URLs, AppleScript
//! snippets, and the input validation the CLI applies before either.

pub mod auth;
pub mod config;
mod error;
pub mod guard;
pub mod input;
pub mod script;
pub mod url;
pub mod when;

pub use error::Result;
pub use error::ThingsError;

/// Bundle identifier used to launch Things in the background.
pub const THINGS_BUNDLE_ID: &str = "com.culturedcode.ThingsMac";
