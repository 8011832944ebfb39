use std::io::Write;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use things_version::version;
use things_version::version_line;
use things_version::version_source;
use tracing::debug;

use crate::app::App;

const BIN_NAME: &str = "things";

#[derive(Debug, Args)]
pub struct VersionCommand {
    /// Print `{"name":..,"version":..}` instead of a line of text.
    #[arg(long, short = 'j')]
    json: bool,
}

#[derive(Serialize)]
struct VersionInfo<'a> {
    name: &'a str,
    version: &'a str,
}

impl VersionCommand {
    pub fn run(self, app: &mut App) -> Result<()> {
        debug!(source = %version_source(), "build identifier {}", version());
        if self.json {
            let info = VersionInfo {
                name: BIN_NAME,
                version: version(),
            };
            serde_json::to_writer(&mut app.out, &info)?;
            writeln!(app.out)?;
        } else {
            writeln!(app.out, "{}", version_line(BIN_NAME))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::app::testing::Harness;

    #[test]
    fn matches_version_flag() {
        let h = Harness::new();
        h.run(&["version"]).unwrap();
        assert_eq!(
            h.out.contents(),
            format!("things {}\n", things_version::THINGS_VERSION)
        );
    }

    #[test]
    fn json_has_name_and_version() {
        let h = Harness::new();
        h.run(&["version", "--json"]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&h.out.contents()).unwrap();
        assert_eq!(parsed["name"], "things");
        assert_eq!(parsed["version"], things_version::THINGS_VERSION);
    }
}
