//! Direct (non-interactive) invocation flow.
//!
//! The last positional argument is the target; everything before it is a
//! source. One source means the operation is inferred from its type; several
//! sources always mean compression into one archive.

use std::path::{Path, PathBuf};

use repack_core::command::ToolRunner;
use repack_core::conflict::{resolve_existing_target, Notify, Prompt};
use repack_core::format::classify_extension;
use repack_core::layout::CompressionSource;
use repack_core::resolve::{recognize, Operation};
use repack_core::{Error, FormatTag, Result};

use crate::config::CliConfig;
use crate::operations;

/// Runs one direct invocation over positional `paths`.
///
/// # Errors
///
/// Returns [`Error::MissingArguments`] for fewer than two paths and
/// [`Error::SamePath`] when any source resolves to the same filesystem entry
/// as the target; everything else propagates from recognition, planning, and
/// execution.
pub fn run<R: ToolRunner, C: Prompt + Notify>(
    paths: &[String],
    config: &CliConfig,
    runner: &R,
    console: &mut C,
) -> Result<()> {
    if paths.len() < 2 {
        return Err(Error::MissingArguments {
            detail: "Usage: repack [OPTIONS] <SOURCE>... <TARGET>".into(),
        });
    }

    let (source_args, target_arg) = paths.split_at(paths.len() - 1);
    let target = Path::new(&target_arg[0]);

    if source_args.len() > 1 {
        return run_multi_source(source_args, target, config, runner, console);
    }
    run_single_source(&source_args[0], target, config, runner, console)
}

/// Several sources: always compression into one archive named by the target.
fn run_multi_source<R: ToolRunner, C: Prompt + Notify>(
    source_args: &[String],
    target: &Path,
    config: &CliConfig,
    runner: &R,
    console: &mut C,
) -> Result<()> {
    for source in source_args {
        if same_entity(Path::new(source), target) {
            return Err(Error::SamePath);
        }
    }

    let mut format = classify_extension(target);
    if let Some(forced) = config.force_format {
        format = forced;
    }
    if !format.is_archive() {
        return Err(Error::UnknownFormat {
            detail: format!(
                "Cannot determine the archive format for target '{}'. \
                 Use a recognized extension or --format.",
                target.display()
            ),
        });
    }

    let Some(target) = resolve_existing_target(target, console)? else {
        console.info("Operation canceled");
        return Ok(());
    };

    let sources: Vec<_> = source_args
        .iter()
        .map(|raw| CompressionSource::new(PathBuf::from(raw)))
        .collect();
    operations::compress(&sources, &target, format, config, runner, console)
}

/// One source: infer compression or extraction from its resolved type.
fn run_single_source<R: ToolRunner, C: Prompt + Notify>(
    source_arg: &str,
    target: &Path,
    config: &CliConfig,
    runner: &R,
    console: &mut C,
) -> Result<()> {
    let source = Path::new(source_arg);
    if same_entity(source, target) {
        return Err(Error::SamePath);
    }

    let mut recognition = recognize(source, target)?;
    if let Some(forced) = config.force_format {
        recognition.apply_forced(forced);
    }

    match recognition.operation {
        Operation::Compress => {
            if recognition.target_hint == FormatTag::Unknown {
                return Err(Error::UnknownFormat {
                    detail: format!(
                        "Cannot determine the archive format for target '{}'. \
                         Use a recognized extension or --format.",
                        target.display()
                    ),
                });
            }
            let Some(target) = resolve_existing_target(target, console)? else {
                console.info("Operation canceled");
                return Ok(());
            };
            let sources = [CompressionSource::from_raw(source_arg)];
            operations::compress(
                &sources,
                &target,
                recognition.target_hint,
                config,
                runner,
                console,
            )
        }
        // Recognition already rejected existing non-directory targets; the
        // dialog handles an existing directory (overwrite merges into it).
        Operation::Decompress => {
            let Some(target) = resolve_existing_target(target, console)? else {
                console.info("Operation canceled");
                return Ok(());
            };
            operations::decompress(
                source,
                recognition.source,
                &target,
                config,
                runner,
                console,
            )
        }
        Operation::Undetermined => Err(Error::UnknownFormat {
            detail: "Cannot determine the operation for the given paths.".into(),
        }),
    }
}

/// Checks whether two paths name the same filesystem entry.
fn same_entity(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
