use std::io::Read;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use chrono::Local;
use chrono::NaiveDate;
use things_core::THINGS_BUNDLE_ID;
use things_core::config::Config;
use tracing::debug;

use crate::launcher::Launcher;

/// Everything a command needs from its environment. `main` wires the real
/// stdio and launcher; tests substitute buffers and a recorder.
pub struct App {
    pub input: Box<dyn Read>,
    pub out: Box<dyn Write>,
    pub err: Box<dyn Write>,
    pub launcher: Box<dyn Launcher>,
    pub config: Config,
    /// Directory holding `config.toml` and the action log.
    pub home: PathBuf,
    pub dry_run: bool,
    pub debug: bool,
    pub foreground: bool,
}

impl App {
    /// Titles come from positional args joined by spaces, or from stdin
    /// when the only argument is `-`.
    pub fn read_input(&mut self, args: &[String]) -> Result<String> {
        if args.len() == 1 && args[0] == "-" {
            let mut buf = String::new();
            self.input
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            return Ok(buf);
        }
        Ok(args.join(" "))
    }

    pub fn open_url(&mut self, url: &str) -> Result<()> {
        if self.dry_run {
            writeln!(self.out, "{url}")?;
            return Ok(());
        }
        if self.foreground {
            self.launcher.open(&[url])
        } else {
            self.launcher.open(&["-g", url])
        }
    }

    pub fn run_script(&mut self, script: &str) -> Result<()> {
        if self.dry_run {
            writeln!(self.out, "{script}")?;
            return Ok(());
        }
        self.ensure_things_launched();
        self.launcher.run_script(script)
    }

    /// AppleScript fails when Things is not running, so start it in the
    /// background first. Failure here is not fatal.
    fn ensure_things_launched(&mut self) {
        if let Err(err) = self.launcher.open(&["-g", "-b", THINGS_BUNDLE_ID]) {
            debug!("unable to launch Things in background: {err:#}");
            if self.debug {
                let _ = writeln!(
                    self.err,
                    "Note: unable to launch Things in background ({err:#})"
                );
            }
        }
    }

    pub fn warn(&mut self, message: impl std::fmt::Display) {
        let _ = writeln!(self.err, "Warning: {message}");
    }

    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::rc::Rc;

    use clap::Parser;
    use tempfile::TempDir;
    use things_store::fixture::Fixture;

    use super::*;
    use crate::cli::Cli;
    use crate::launcher::recording::RecordingLauncher;

    /// A `Write` whose contents stay readable after the `App` takes it.
    #[derive(Clone, Default)]
    pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl SharedBuf {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    pub struct Harness {
        pub out: SharedBuf,
        pub err: SharedBuf,
        pub launcher: RecordingLauncher,
        pub home: TempDir,
        stdin: String,
        config: Config,
    }

    impl Harness {
        pub fn new() -> Self {
            Self {
                out: SharedBuf::default(),
                err: SharedBuf::default(),
                launcher: RecordingLauncher::default(),
                home: TempDir::new().unwrap(),
                stdin: String::new(),
                config: Config::default(),
            }
        }

        pub fn with_stdin(mut self, stdin: &str) -> Self {
            self.stdin = stdin.to_string();
            self
        }

        pub fn with_config(mut self, config: Config) -> Self {
            self.config = config;
            self
        }

        /// Build a Things database in the temp home and point the config
        /// at it.
        pub fn with_fixture(mut self, build: impl FnOnce(&Fixture)) -> Self {
            let path = self.home.path().join("main.sqlite");
            let fixture = Fixture::create(&path).unwrap();
            build(&fixture);
            drop(fixture);
            self.config.database = Some(path);
            self
        }

        /// Configure `token` as the URL-scheme auth token.
        pub fn with_token(mut self, token: &str) -> Self {
            self.config.auth_token = Some(token.to_string());
            self
        }

        /// Parse `args` (without the binary name) and run the command.
        pub fn run(&self, args: &[&str]) -> Result<()> {
            let cli = Cli::try_parse_from(std::iter::once("things").chain(args.iter().copied()))?;
            cli.run(&mut self.app())
        }

        /// An `App` wired to this harness's buffers, launcher and home.
        pub fn app(&self) -> App {
            App {
                input: Box::new(Cursor::new(self.stdin.clone().into_bytes())),
                out: Box::new(self.out.clone()),
                err: Box::new(self.err.clone()),
                launcher: Box::new(self.launcher.clone()),
                config: self.config.clone(),
                home: self.home.path().to_path_buf(),
                dry_run: false,
                debug: false,
                foreground: false,
            }
        }

        pub fn urls(&self) -> Vec<String> {
            self.launcher.urls()
        }

        pub fn scripts(&self) -> Vec<String> {
            self.launcher.scripts.borrow().clone()
        }

        pub fn only_url(&self) -> String {
            let urls = self.urls();
            assert_eq!(urls.len(), 1, "expected one url, got {urls:?}");
            urls[0].clone()
        }
    }
}
