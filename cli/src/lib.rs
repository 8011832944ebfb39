//! The `things` command-line client: clap command tree, launcher seam,
//! database-backed listings and the bulk-change action log.

pub mod action_log;
pub mod app;
pub mod cli;
pub mod commands;
pub mod db;
pub mod launcher;
pub mod logging;
pub mod output;
pub mod query;
pub mod query_lang;
pub mod sort;
pub mod verify;

use std::io::Write;

use anyhow::Result;
use things_core::config::Config;
use things_core::config::things_home;

pub use crate::app::App;
pub use crate::cli::Cli;
use crate::launcher::SystemLauncher;

/// Wire the real environment around `cli` and run it.
pub fn run_main(cli: Cli) -> Result<()> {
    logging::init(cli.debug);
    let home = things_home()?;
    let config = Config::load_from(&home.join("config.toml"))?;
    tracing::debug!(home = %home.display(), "loaded configuration");

    let mut app = App {
        input: Box::new(std::io::stdin()),
        out: Box::new(std::io::stdout()),
        err: Box::new(std::io::stderr()),
        launcher: Box::new(SystemLauncher),
        foreground: config.foreground,
        config,
        home,
        dry_run: false,
        debug: false,
    };
    let result = cli.run(&mut app);
    app.out.flush()?;
    result
}
