//! The only place the CLI touches the outside world on macOS: `open` for
//! URLs and `osascript` for AppleScript.

use std::process::Command;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use tracing::debug;

pub trait Launcher {
    /// Run `open` with the given arguments.
    fn open(&mut self, args: &[&str]) -> Result<()>;

    /// Run an AppleScript program through `osascript`.
    fn run_script(&mut self, script: &str) -> Result<()>;
}

/// Shells out to the real macOS tools.
#[derive(Debug, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn open(&mut self, args: &[&str]) -> Result<()> {
        debug!(?args, "open");
        run("open", args)
    }

    fn run_script(&mut self, script: &str) -> Result<()> {
        debug!(%script, "osascript");
        run("osascript", &["-e", script])
    }
}

fn run(program: &str, args: &[&str]) -> Result<()> {
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to run {program}"))?;
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        bail!("{program} exited with {}", output.status);
    }
    bail!("{program} exited with {}: {stderr}", output.status);
}

#[cfg(test)]
pub(crate) mod recording {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Records every invocation instead of running anything.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingLauncher {
        pub opened: Rc<RefCell<Vec<Vec<String>>>>,
        pub scripts: Rc<RefCell<Vec<String>>>,
    }

    impl RecordingLauncher {
        /// URLs passed to `open`, skipping the `-b` app launches.
        pub fn urls(&self) -> Vec<String> {
            self.opened
                .borrow()
                .iter()
                .filter(|args| !args.iter().any(|a| a == "-b"))
                .filter_map(|args| args.last().cloned())
                .collect()
        }
    }

    impl Launcher for RecordingLauncher {
        fn open(&mut self, args: &[&str]) -> Result<()> {
            self.opened
                .borrow_mut()
                .push(args.iter().map(|a| a.to_string()).collect());
            Ok(())
        }

        fn run_script(&mut self, script: &str) -> Result<()> {
            self.scripts.borrow_mut().push(script.to_string());
            Ok(())
        }
    }
}
