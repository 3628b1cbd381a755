//! Target-path conflict resolution.
//!
//! A small interactive state machine: while the candidate target exists, ask
//! the user to overwrite, cancel, or rename, and loop until the candidate is
//! free. Input and output go through the [`Prompt`] and [`Notify`]
//! capabilities so the same machine runs against a real terminal or scripted
//! test input without internal changes.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::format::COMPOUND_SUFFIXES;

/// Capability to ask a question and receive one line of text.
pub trait Prompt {
    /// Displays `prompt` and reads one trimmed line.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InputClosed`] when the input stream reaches
    /// EOF while an answer is still required.
    fn read_line(&mut self, prompt: &str) -> Result<String>;
}

/// Capability to emit a line of text to the user.
pub trait Notify {
    /// Emits an informational message.
    fn info(&mut self, message: &str);
    /// Emits an error or warning message.
    fn error(&mut self, message: &str);
}

/// Decision requested from the user for an existing target path.
///
/// Requested fresh each time the resolver observes an existing entry at the
/// current candidate; an invalid rename re-enters the dialog without
/// consuming a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDecision {
    /// Replace the existing entry
    Overwrite,
    /// Abort the whole operation
    Cancel,
    /// Choose a different target path
    Rename,
}

/// Resolves an existing target path to a usable one.
///
/// Returns `Ok(Some(path))` with the final free path, or `Ok(None)` when the
/// user cancelled (the caller must abort without touching the filesystem).
///
/// Overwriting a directory never deletes it; the resolver warns that the
/// subsequent tool invocation may overwrite files underneath it. Overwriting
/// a file removes it, and a removal failure re-presents the dialog instead
/// of escalating. A renamed candidate re-enters the existence check, so it
/// can itself collide and restart the cycle.
///
/// # Errors
///
/// Propagates [`crate::Error::InputClosed`] from the prompt capability.
pub fn resolve_existing_target(
    target: &Path,
    io: &mut (impl Prompt + Notify),
) -> Result<Option<PathBuf>> {
    let mut current = target.to_path_buf();
    let mut rename_base = current.clone();
    let mut suffix_counter: u32 = 1;

    while current.exists() {
        let is_dir = current.is_dir();
        match ask_decision(io, &current, is_dir)? {
            ConflictDecision::Overwrite => {
                if is_dir {
                    io.info(
                        "Proceeding without deleting the existing directory. \
                         Existing files may be overwritten.",
                    );
                    break;
                }
                if let Err(err) = std::fs::remove_file(&current) {
                    io.error(&format!(
                        "Failed to remove existing target '{}': {err}",
                        current.display()
                    ));
                    continue;
                }
                break;
            }
            ConflictDecision::Cancel => return Ok(None),
            ConflictDecision::Rename => loop {
                let default_candidate = sequential_candidate(&rename_base, suffix_counter);
                let entered = io.read_line(&format!(
                    "Enter a new target path (default: {}): ",
                    default_candidate.display()
                ))?;
                let entered = entered.trim();
                let candidate = if entered.is_empty() {
                    default_candidate.clone()
                } else {
                    PathBuf::from(entered)
                };

                if candidate == current {
                    io.error(
                        "New target path matches the current path. \
                         Please choose a different value.",
                    );
                    if candidate == default_candidate {
                        suffix_counter += 1;
                    }
                    continue;
                }

                if candidate.exists() {
                    io.error(&format!(
                        "Path '{}' already exists. You may overwrite it or choose a different name.",
                        candidate.display()
                    ));
                    if candidate == default_candidate {
                        suffix_counter += 1;
                    } else {
                        rename_base = candidate;
                        suffix_counter = 1;
                    }
                    continue;
                }

                current = candidate.clone();
                if candidate == default_candidate {
                    suffix_counter += 1;
                } else {
                    rename_base = candidate;
                    suffix_counter = 1;
                }
                break;
            },
        }
    }

    Ok(Some(current))
}

/// Asks for one overwrite/cancel/rename decision, re-asking on invalid input.
fn ask_decision(
    io: &mut (impl Prompt + Notify),
    target: &Path,
    is_dir: bool,
) -> Result<ConflictDecision> {
    let kind = if is_dir { "directory" } else { "file" };
    io.info(&format!(
        "Target {kind} '{}' already exists.",
        target.display()
    ));
    io.info("Choose action: [O]verwrite / [C]ancel / [R]ename");
    loop {
        let input = io.read_line("Choice (o/c/r): ")?;
        match input.trim().to_ascii_lowercase().as_str() {
            "o" => return Ok(ConflictDecision::Overwrite),
            "c" => return Ok(ConflictDecision::Cancel),
            "r" => return Ok(ConflictDecision::Rename),
            _ => io.error("Invalid choice, please enter o, c, or r."),
        }
    }
}

/// Derives the `<stem>_<index><extension>` rename suggestion.
///
/// Compound suffixes (`.tar.gz` and friends) are kept together as the
/// extension; otherwise the filename splits on its last dot. An empty or
/// `"."`/`".."` stem is replaced with a literal placeholder.
pub fn sequential_candidate(base: &Path, index: u32) -> PathBuf {
    let parent = base.parent().unwrap_or_else(|| Path::new(""));
    let filename = base
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut stem = String::new();
    let mut extension = String::new();

    for suffix in COMPOUND_SUFFIXES {
        if filename.len() > suffix.len() && filename.ends_with(suffix) {
            stem = filename[..filename.len() - suffix.len()].to_string();
            extension = suffix.to_string();
            break;
        }
    }

    if stem.is_empty() {
        match filename.rfind('.') {
            None | Some(0) => stem = filename.clone(),
            Some(pos) => {
                stem = filename[..pos].to_string();
                extension = filename[pos..].to_string();
            }
        }
    }

    if stem.is_empty() || stem == "." || stem == ".." {
        stem = "target".to_string();
    }

    parent.join(format!("{stem}_{index}{extension}"))
}
