//! Guided interactive mode.
//!
//! Walks the user through source selection, operation choice, target format,
//! password entry, and optional source deletion, then dispatches to the same
//! operations as the direct flow. All input and output goes through the
//! prompt/notify capabilities, so the whole dialog is scriptable in tests.

use std::path::{Path, PathBuf};

use repack_core::command::ToolRunner;
use repack_core::conflict::{resolve_existing_target, Notify, Prompt};
use repack_core::layout::CompressionSource;
use repack_core::resolve::{resolve, Operation};
use repack_core::{FormatTag, Result};

use crate::config::CliConfig;
use crate::operations;

/// Selectable target formats, in menu order.
const FORMAT_MENU: [(FormatTag, &str); 9] = [
    (FormatTag::TarGz, "tar.gz"),
    (FormatTag::Zip, "zip"),
    (FormatTag::SevenZip, "7z"),
    (FormatTag::Tar, "tar"),
    (FormatTag::TarBz2, "tar.bz2"),
    (FormatTag::TarXz, "tar.xz"),
    (FormatTag::Lz4, "lz4"),
    (FormatTag::Zstd, "zst"),
    (FormatTag::Xar, "xar"),
];

/// Runs the guided flow, optionally seeded with a source path from the
/// command line.
///
/// # Errors
///
/// Propagates [`repack_core::Error::InputClosed`] when stdin ends mid-dialog
/// and every execution error from the dispatched operation.
pub fn run_interactive<R: ToolRunner, C: Prompt + Notify>(
    initial_source: Option<String>,
    config: &CliConfig,
    runner: &R,
    console: &mut C,
) -> Result<()> {
    console.info("Interactive mode started");

    let (source, source_tag) = ask_source(console, initial_source)?;
    console.info(&format!("Detected source type: {}", source_tag.describe()));

    let mut operation = match source_tag {
        FormatTag::Directory | FormatTag::RegularFile => Operation::Compress,
        _ => Operation::Decompress,
    };
    let described = match operation {
        Operation::Compress => "compress",
        _ => "decompress",
    };
    console.info(&format!("Detected operation: {described}"));
    if confirm(console, "Change the operation? (y/n): ")? {
        operation = ask_operation(console)?;
    }

    let prepared = match operation {
        Operation::Compress => prepare_compress(config, console)?,
        Operation::Decompress | Operation::Undetermined => {
            prepare_decompress(source_tag, config, console)?
        }
    };
    let Some(prepared) = prepared else {
        console.info("Operation canceled");
        return Ok(());
    };

    // Asked before dispatch; the deletion itself only happens on success.
    let delete_requested = confirm(console, "Delete the source after the operation? (y/n): ")?;

    match &prepared {
        Prepared::Compress { target, format, config } => {
            let sources = [CompressionSource::new(&source)];
            operations::compress(&sources, target, *format, config, runner, console)?;
        }
        Prepared::Decompress { target, config } => {
            operations::decompress(&source, source_tag, target, config, runner, console)?;
        }
    }

    if delete_requested {
        delete_source(&source, console);
    }

    Ok(())
}

/// A fully gathered operation, ready to dispatch.
enum Prepared {
    Compress {
        target: PathBuf,
        format: FormatTag,
        config: CliConfig,
    },
    Decompress {
        target: PathBuf,
        config: CliConfig,
    },
}

/// Asks for an existing source path, re-asking until one resolves.
fn ask_source(
    console: &mut (impl Prompt + Notify),
    initial: Option<String>,
) -> Result<(PathBuf, FormatTag)> {
    let mut pending = initial;
    loop {
        let raw = match pending.take() {
            Some(raw) => raw,
            None => console.read_line("Enter the source path: ")?,
        };
        let raw = raw.trim();
        if raw.is_empty() {
            console.error("Path cannot be empty.");
            continue;
        }
        let path = PathBuf::from(raw);
        match resolve(&path) {
            Ok(tag) => return Ok((path, tag)),
            Err(err) => console.error(&err.to_string()),
        }
    }
}

/// Asks for an explicit compress/decompress choice.
fn ask_operation(console: &mut (impl Prompt + Notify)) -> Result<Operation> {
    console.info("1. Compress");
    console.info("2. Decompress");
    loop {
        let choice = console.read_line("Enter choice (1/2): ")?;
        match choice.trim() {
            "1" => return Ok(Operation::Compress),
            "2" => return Ok(Operation::Decompress),
            _ => console.error("Invalid choice, please enter 1 or 2."),
        }
    }
}

/// Compression branch of the dialog.
///
/// Returns `Ok(None)` when the user cancelled at the conflict dialog.
fn prepare_compress(
    config: &CliConfig,
    console: &mut (impl Prompt + Notify),
) -> Result<Option<Prepared>> {
    let format = ask_format(console)?;

    let target = loop {
        let raw = console.read_line("Enter the target archive path: ")?;
        let raw = raw.trim();
        if raw.is_empty() {
            console.error("Path cannot be empty.");
            continue;
        }
        break PathBuf::from(raw);
    };

    let mut config = config.clone();
    if config.password.is_none() && format.supports_password() {
        config.password = ask_new_password(console)?;
    }

    let Some(target) = resolve_existing_target(&target, console)? else {
        return Ok(None);
    };

    Ok(Some(Prepared::Compress {
        target,
        format,
        config,
    }))
}

/// Decompression branch of the dialog.
///
/// An existing target directory goes through the same conflict dialog as a
/// compression target; overwriting it merges the extracted files into it.
fn prepare_decompress(
    source_tag: FormatTag,
    config: &CliConfig,
    console: &mut (impl Prompt + Notify),
) -> Result<Option<Prepared>> {
    let raw = console.read_line("Enter the target directory (default: .): ")?;
    let raw = raw.trim();
    let target = if raw.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(raw)
    };

    let mut config = config.clone();
    if config.password.is_none()
        && source_tag.supports_password()
        && confirm(console, "Is the archive password protected? (y/n): ")?
    {
        config.password = Some(console.read_line("Enter password: ")?);
    }

    let Some(target) = resolve_existing_target(&target, console)? else {
        return Ok(None);
    };

    Ok(Some(Prepared::Decompress { target, config }))
}

/// Asks for the target archive format from the fixed menu.
fn ask_format(console: &mut (impl Prompt + Notify)) -> Result<FormatTag> {
    console.info("Select the target format:");
    for (index, (tag, name)) in FORMAT_MENU.iter().enumerate() {
        let password = if tag.supports_password() {
            " (supports password)"
        } else {
            ""
        };
        console.info(&format!("{}. {name}{password}", index + 1));
    }
    loop {
        let choice = console.read_line("Enter choice (1-9): ")?;
        if let Ok(index) = choice.trim().parse::<usize>() {
            if (1..=FORMAT_MENU.len()).contains(&index) {
                return Ok(FORMAT_MENU[index - 1].0);
            }
        }
        console.error("Invalid choice, please enter a number between 1 and 9.");
    }
}

/// Offers password protection, asking twice until both entries match.
fn ask_new_password(console: &mut (impl Prompt + Notify)) -> Result<Option<String>> {
    if !confirm(console, "Set a password? (y/n): ")? {
        return Ok(None);
    }
    loop {
        let password = console.read_line("Enter password: ")?;
        let confirmation = console.read_line("Confirm password: ")?;
        if password == confirmation {
            return Ok(Some(password));
        }
        console.error("Passwords do not match. Please try again.");
    }
}

/// Best-effort source removal after a successful operation.
fn delete_source(source: &Path, console: &mut impl Notify) {
    let removed = if source.is_dir() {
        std::fs::remove_dir_all(source)
    } else {
        std::fs::remove_file(source)
    };
    match removed {
        Ok(()) => console.info("Source deleted."),
        Err(err) => console.error(&format!(
            "Warning: failed to delete source '{}': {err}",
            source.display()
        )),
    }
}

/// Asks a yes/no question, re-asking on anything else.
fn confirm(console: &mut (impl Prompt + Notify), question: &str) -> Result<bool> {
    loop {
        let answer = console.read_line(question)?;
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => console.error("Invalid choice, please try again (y/n)."),
        }
    }
}
