//! repack - archive conversion front end
//!
//! Detects source types, infers the operation, and drives the system's
//! archive tools. Errors exit with a stable per-kind status code.

use std::process;

use clap::Parser;

mod opts;

use opts::RepackOpts;

use repack_cli::{run, run_interactive, Console, SystemRunner};
use repack_core::conflict::Prompt;

fn main() {
    let opts = RepackOpts::parse();
    let runner = SystemRunner::new();
    let mut console = Console::new();

    if let Err(err) = execute(&opts, &runner, &mut console) {
        eprintln!("Error: {err}");
        process::exit(err.code());
    }
}

fn execute(
    opts: &RepackOpts,
    runner: &SystemRunner,
    console: &mut Console,
) -> repack_core::Result<()> {
    let (mut config, prompt_password) = opts.config()?;
    if prompt_password {
        config.password = Some(console.read_line("Enter password: ")?);
    }

    if opts.interactive {
        run_interactive(opts.paths.first().cloned(), &config, runner, console)
    } else {
        run(&opts.paths, &config, runner, console)
    }
}
