use clap::Parser;
use std::process::ExitCode;

use anansys_backend::cli::{run, Cli};

fn main() -> ExitCode {
    run(Cli::parse())
}
