use clap::Parser;

use elevation_shadow::{cli, logger};

fn main() -> std::process::ExitCode {
    // Session log (overwrites the previous session's log).
    logger::init();

    let args = cli::CliArgs::parse();
    cli::run(args)
}
