//! Command-line front end for the repack archive converter.
//!
//! This crate wires the pure planning logic from `repack-core` to the real
//! world: a terminal console for prompts and messages, a subprocess runner
//! that locates and executes the external archive tools, and the two entry
//! flows (direct path-based invocation and guided interactive mode). The
//! binary under `bin/repack` only parses arguments and dispatches here.

mod config;
mod console;
mod interactive;
mod operations;
mod process;
mod run;

#[cfg(test)]
mod tests;

pub use config::CliConfig;
pub use console::Console;
pub use interactive::run_interactive;
pub use process::SystemRunner;
pub use run::run;
