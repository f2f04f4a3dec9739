use clap::Parser;
use demandboard::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
