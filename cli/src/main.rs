use clap::Parser;
use things_cli::Cli;
use things_cli::run_main;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run_main(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
