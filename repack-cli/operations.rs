//! Execution of planned compress, decompress, and verify operations.
//!
//! Everything here takes a [`ToolRunner`] and a [`Notify`] sink instead of
//! touching the process environment directly, so the flows run unchanged
//! against the real system or test doubles.

use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;

use repack_core::command::{
    build_compress, build_extract, build_verify, CommandNote, CommandPlan, ToolCommand,
    ToolRequest, ToolRunner,
};
use repack_core::conflict::Notify;
use repack_core::filter::filter_items;
use repack_core::layout::{plan, CompressionSource};
use repack_core::stats::{directory_size, sources_size, OperationStats};
use repack_core::{Error, FormatTag, Result};

use crate::config::CliConfig;

/// Compresses the sources into `target` using the external tool for `format`.
///
/// # Errors
///
/// Propagates planning errors, reports [`Error::ToolNotFound`] for an absent
/// tool, and [`Error::OperationFailed`] when the tool exits nonzero.
pub fn compress<R: ToolRunner>(
    sources: &[CompressionSource],
    target: &Path,
    format: FormatTag,
    config: &CliConfig,
    runner: &R,
    notify: &mut impl Notify,
) -> Result<()> {
    let mut layout = plan(sources)?;

    if !config.include.is_empty() || !config.exclude.is_empty() {
        let summary = filter_items(&layout.items, &config.include, &config.exclude);
        if config.verbose {
            notify.info(&format!(
                "Filtering files: included {}, excluded {}",
                summary.included.len(),
                summary.excluded
            ));
        }
        if summary.included.is_empty() {
            return Err(Error::MissingArguments {
                detail: "All sources were excluded by the active filters.".into(),
            });
        }
        layout.items = summary.included;
    }

    let started = Instant::now();
    let original_size = if config.benchmark {
        let paths: Vec<_> = sources.iter().map(|source| source.path.clone()).collect();
        sources_size(&paths)
    } else {
        0
    };

    let request = ToolRequest {
        password: config.password.clone(),
        level: config.level,
        threads: config.threads,
    };
    let plan = build_compress(&layout, target, format, &request)?;
    surface_notes(&plan, config, notify);
    ensure_available(runner, &plan, notify)?;

    notify.info("Compressing...");
    run_checked(runner, &plan.command)?;

    if config.verify {
        verify_archive(target, format, runner, notify)?;
    }

    notify.info("Operation complete");

    if config.benchmark {
        let stats = OperationStats {
            original_size,
            compressed_size: target.metadata().map(|m| m.len()).unwrap_or(0),
            elapsed: started.elapsed(),
            thread_count: config.threads.unwrap_or(1),
        };
        report_stats(&stats, notify);
    }

    Ok(())
}

/// Extracts `source` into `target_dir`, creating the directory first.
///
/// # Errors
///
/// Maps directory-creation failures to [`Error::PermissionDenied`] or
/// [`Error::NotEnoughSpace`] where the kind is known; otherwise reports the
/// target as invalid. Tool failures surface as with [`compress`].
pub fn decompress<R: ToolRunner>(
    source: &Path,
    format: FormatTag,
    target_dir: &Path,
    config: &CliConfig,
    runner: &R,
    notify: &mut impl Notify,
) -> Result<()> {
    std::fs::create_dir_all(target_dir).map_err(|err| match err.kind() {
        ErrorKind::PermissionDenied => Error::PermissionDenied {
            path: target_dir.to_path_buf(),
        },
        ErrorKind::StorageFull => Error::NotEnoughSpace,
        _ => Error::InvalidTarget {
            path: target_dir.to_path_buf(),
            reason: format!("cannot create target directory: {err}"),
        },
    })?;

    let started = Instant::now();
    let plan = build_extract(source, format, target_dir, config.password.as_deref())?;
    surface_notes(&plan, config, notify);
    ensure_available(runner, &plan, notify)?;

    notify.info("Decompressing...");
    run_checked(runner, &plan.command)?;
    notify.info("Operation complete");

    if config.benchmark {
        let stats = OperationStats {
            original_size: directory_size(target_dir),
            compressed_size: source.metadata().map(|m| m.len()).unwrap_or(0),
            elapsed: started.elapsed(),
            thread_count: config.threads.unwrap_or(1),
        };
        report_stats(&stats, notify);
    }

    Ok(())
}

/// Runs the tool's integrity test against a finished archive.
///
/// The outcome is reported through the notify sink and never fails the
/// enclosing operation: a nonzero test exit, a missing test tool, and a
/// format without a test mode all leave the overall result untouched.
///
/// # Errors
///
/// Fails only when the archive path cannot be made absolute.
pub fn verify_archive<R: ToolRunner>(
    archive: &Path,
    format: FormatTag,
    runner: &R,
    notify: &mut impl Notify,
) -> Result<()> {
    notify.info("Verifying archive integrity...");
    let Some(command) = build_verify(archive, format)? else {
        notify.info("Verification is not supported for this format; skipping.");
        return Ok(());
    };
    if !runner.is_available(command.tool) {
        notify.error(&format!(
            "Verification skipped: required tool not found: {}.",
            command.tool
        ));
        return Ok(());
    }
    match runner.run(&command) {
        Ok(0) => notify.info("Archive verification successful."),
        Ok(_) => notify.error("Archive verification failed."),
        Err(err) => notify.error(&format!(
            "Archive verification failed: cannot execute '{}': {err}",
            command.command_line()
        )),
    }
    Ok(())
}

/// Prints the non-fatal notes attached to a command plan.
fn surface_notes(plan: &CommandPlan, config: &CliConfig, notify: &mut impl Notify) {
    for note in &plan.notes {
        match note {
            CommandNote::TarPasswordIgnored => notify.error(
                "Warning: Password protection is not supported for tar formats. \
                 The password will be ignored.",
            ),
            CommandNote::SplitZipExtraction => {
                if config.verbose {
                    notify.info("Split ZIP archive detected, using 7z for extraction.");
                }
            }
        }
    }
}

/// Fails early when the planned tool is not installed.
fn ensure_available<R: ToolRunner>(
    runner: &R,
    plan: &CommandPlan,
    notify: &mut impl Notify,
) -> Result<()> {
    if runner.is_available(plan.command.tool) {
        return Ok(());
    }
    if plan.notes.contains(&CommandNote::SplitZipExtraction) {
        notify.error("Split ZIP archives require '7z' (p7zip) to be installed.");
    }
    Err(Error::ToolNotFound {
        tool: plan.command.tool.to_string(),
    })
}

/// Runs one command and turns a nonzero exit status into an error.
fn run_checked<R: ToolRunner>(runner: &R, command: &ToolCommand) -> Result<()> {
    let status = runner.run(command).map_err(|err| Error::Unknown {
        message: format!("failed to execute '{}': {err}", command.command_line()),
    })?;
    if status != 0 {
        return Err(Error::OperationFailed {
            command: command.command_line(),
            exit_code: status,
        });
    }
    Ok(())
}

/// Prints the benchmark summary.
fn report_stats(stats: &OperationStats, notify: &mut impl Notify) {
    notify.info(&format!("Original size: {} bytes", stats.original_size));
    notify.info(&format!("Compressed size: {} bytes", stats.compressed_size));
    notify.info(&format!(
        "Compression ratio: {:.2}%",
        stats.compression_ratio()
    ));
    notify.info(&format!("Space saved: {} bytes", stats.saved_bytes()));
    notify.info(&format!(
        "Elapsed time: {:.2}s",
        stats.elapsed.as_secs_f64()
    ));
    notify.info(&format!("Threads: {}", stats.thread_count));
}
