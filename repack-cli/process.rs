//! Subprocess runner backed by the system search path.

use std::io;
use std::process::Command;

use repack_core::command::{ToolCommand, ToolRunner};

/// Runs external archive tools as child processes.
///
/// Tool availability is checked through the search path; execution inherits
/// the parent's standard streams so tool output and password prompts reach
/// the user directly.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    /// Creates a runner using the current process environment.
    pub fn new() -> Self {
        Self
    }
}

impl ToolRunner for SystemRunner {
    fn is_available(&self, tool: &str) -> bool {
        which::which(tool).is_ok()
    }

    fn run(&self, command: &ToolCommand) -> io::Result<i32> {
        let mut child = Command::new(command.tool);
        child.args(&command.args);
        if let Some(dir) = &command.working_dir {
            child.current_dir(dir);
        }
        let status = child.status()?;
        // A missing code means the child died from a signal.
        Ok(status.code().unwrap_or(-1))
    }
}
