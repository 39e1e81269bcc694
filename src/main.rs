use clap::Parser;
use power_position::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
