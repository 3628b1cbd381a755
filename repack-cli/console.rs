//! Terminal implementation of the prompt and notify capabilities.

use std::io::{self, BufRead, Write};

use repack_core::conflict::{Notify, Prompt};
use repack_core::{Error, Result};

/// Interactive console bound to the process's standard streams.
///
/// Prompts go to stdout without a trailing newline so the cursor stays on
/// the question line; informational output goes to stdout and errors to
/// stderr.
#[derive(Debug, Default)]
pub struct Console;

impl Console {
    /// Creates a console bound to stdin/stdout/stderr.
    pub fn new() -> Self {
        Self
    }
}

impl Prompt for Console {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        print!("{prompt}");
        io::stdout().flush().map_err(|err| Error::Unknown {
            message: format!("cannot write to stdout: {err}"),
        })?;

        let mut line = String::new();
        let bytes = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|err| Error::Unknown {
                message: format!("cannot read from stdin: {err}"),
            })?;
        if bytes == 0 {
            return Err(Error::InputClosed);
        }
        Ok(line.trim().to_string())
    }
}

impl Notify for Console {
    fn info(&mut self, message: &str) {
        println!("{message}");
    }

    fn error(&mut self, message: &str) {
        eprintln!("{message}");
    }
}
