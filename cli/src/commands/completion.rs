use anyhow::Result;
use clap::Args;
use clap::CommandFactory;
use clap_complete::Shell;
use clap_complete::generate;

use crate::app::App;
use crate::cli::Cli;

#[derive(Debug, Args)]
pub struct CompletionCommand {
    /// Shell to generate completions for
    #[clap(value_enum, default_value_t = Shell::Bash)]
    shell: Shell,
}

impl CompletionCommand {
    pub fn run(self, app: &mut App) -> Result<()> {
        let mut cmd = Cli::command();
        generate(self.shell, &mut cmd, "things", app.out.as_mut());
        Ok(())
    }
}
