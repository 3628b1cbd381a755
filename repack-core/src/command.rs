//! Translation of (operation, format, options) into external tool commands.
//!
//! The per-format mapping is a static table. Two cases carry real logic:
//! split-ZIP archives must route through 7z even though plain ZIP uses
//! zip/unzip, and tar-family formats silently ignore a supplied password (a
//! documented limitation surfaced to the caller as a note, not an error).

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::format::{self, FormatTag};
use crate::layout::ArchiveLayout;

/// One external command, ready for the subprocess collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    /// Name of the tool to look up on the search path
    pub tool: &'static str,
    /// Ordered argument vector
    pub args: Vec<String>,
    /// Working directory, used only for layout-planned compression
    pub working_dir: Option<PathBuf>,
}

impl ToolCommand {
    /// Renders the command for error messages.
    pub fn command_line(&self) -> String {
        let mut line = self.tool.to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Non-fatal conditions the caller must surface to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandNote {
    /// A password was supplied for a tar-family format and will be ignored
    TarPasswordIgnored,
    /// The source is a split ZIP archive and extraction routes through 7z
    SplitZipExtraction,
}

/// A built command plus its notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlan {
    /// The command to execute
    pub command: ToolCommand,
    /// Warnings and notices to surface before execution
    pub notes: Vec<CommandNote>,
}

/// Options forwarded to the external tool where it supports them.
#[derive(Debug, Clone, Default)]
pub struct ToolRequest {
    /// Archive password, where the format supports one
    pub password: Option<String>,
    /// Compression level (1-9)
    pub level: Option<u32>,
    /// Thread count, forwarded only to tools with a thread flag
    pub threads: Option<usize>,
}

/// Boundary with the subprocess collaborator.
///
/// The collaborator exposes tool availability and blocking execution
/// returning an integer exit status; nothing else is parsed from the tool.
pub trait ToolRunner {
    /// Reports whether `tool` is present on the search path.
    fn is_available(&self, tool: &str) -> bool;

    /// Runs the command to completion and returns its exit status.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] when the process cannot be spawned.
    fn run(&self, command: &ToolCommand) -> io::Result<i32>;
}

/// Checks whether a path names a split-ZIP continuation part (`.z01`..`.z99`).
pub fn is_split_zip_part(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| format::is_split_zip_suffix(&ext.to_ascii_lowercase()))
}

/// Checks whether a path belongs to a split ZIP archive.
///
/// Any `.zNN` part is split by definition. A `.zip` path is split when a
/// `.z01` sibling exists next to it; no sibling check is performed for
/// parts beyond the first.
pub fn is_split_zip(path: &Path) -> bool {
    if is_split_zip_part(path) {
        return true;
    }
    let is_zip = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    is_zip && path.with_extension("z01").exists()
}

/// Locates the main `.zip` file for a split archive given any part.
pub fn find_split_zip_main(part: &Path) -> Option<PathBuf> {
    let main = part.with_extension("zip");
    main.exists().then_some(main)
}

/// Builds the compression command for one planned layout.
///
/// The command's working directory is the layout's base directory so that
/// the archive's internal paths match the planned relative items.
///
/// # Errors
///
/// Returns [`Error::UnknownFormat`] for formats that cannot be compression
/// targets, and for lz4/zstd with more than one item (those tools take a
/// single input).
pub fn build_compress(
    layout: &ArchiveLayout,
    target: &Path,
    format: FormatTag,
    request: &ToolRequest,
) -> Result<CommandPlan> {
    let target_arg = absolute_arg(target)?;
    let mut notes = Vec::new();
    let mut args: Vec<String> = Vec::new();

    let tool = match format {
        FormatTag::Tar | FormatTag::TarGz | FormatTag::TarBz2 | FormatTag::TarXz => {
            if request.password.is_some() {
                notes.push(CommandNote::TarPasswordIgnored);
            }
            let flags = match format {
                FormatTag::Tar => "-cf",
                FormatTag::TarGz => "-czf",
                FormatTag::TarBz2 => "-cjf",
                _ => "-cJf",
            };
            args.push(flags.into());
            args.push(target_arg);
            args.extend(layout.items.iter().cloned());
            "tar"
        }
        FormatTag::Zip => {
            if let Some(password) = &request.password {
                args.push("-P".into());
                args.push(password.clone());
            }
            if let Some(level) = request.level {
                args.push(format!("-{level}"));
            }
            args.push("-r".into());
            args.push(target_arg);
            args.extend(layout.items.iter().cloned());
            "zip"
        }
        FormatTag::SevenZip => {
            args.push("a".into());
            if let Some(password) = &request.password {
                args.push(format!("-p{password}"));
            }
            if let Some(level) = request.level {
                args.push(format!("-mx={level}"));
            }
            if let Some(threads) = request.threads {
                args.push(format!("-mmt={threads}"));
            }
            args.push(target_arg);
            args.extend(layout.items.iter().cloned());
            "7z"
        }
        FormatTag::Lz4 => {
            if let Some(level) = request.level {
                args.push(format!("-{level}"));
            }
            args.push("-r".into());
            args.push(single_item(layout, "lz4")?);
            args.push(target_arg);
            "lz4"
        }
        FormatTag::Zstd => {
            if let Some(level) = request.level {
                args.push(format!("-{level}"));
            }
            if let Some(threads) = request.threads {
                args.push(format!("-T{threads}"));
            }
            args.push("-r".into());
            args.push(single_item(layout, "zstd")?);
            args.push("-o".into());
            args.push(target_arg);
            "zstd"
        }
        FormatTag::Xar => {
            args.push("-cf".into());
            args.push(target_arg);
            args.extend(layout.items.iter().cloned());
            "xar"
        }
        FormatTag::SplitZip => {
            return Err(Error::UnknownFormat {
                detail: "split ZIP archives cannot be created, only extracted".into(),
            })
        }
        FormatTag::Rar => {
            // Creation requires the proprietary rar tool; only extraction is wrapped.
            return Err(Error::UnknownFormat {
                detail: "RAR archives cannot be created, only extracted".into(),
            })
        }
        FormatTag::RegularFile | FormatTag::Directory | FormatTag::Unknown => {
            return Err(Error::UnknownFormat {
                detail: "unsupported target format for compression".into(),
            })
        }
    };

    Ok(CommandPlan {
        command: ToolCommand {
            tool,
            args,
            working_dir: Some(layout.base_directory.clone()),
        },
        notes,
    })
}

/// Builds the extraction command for one archive source.
///
/// A `Zip` source is upgraded to `SplitZip` when the split convention is
/// detected on disk. When the caller pointed at a `.zNN` part directly, the
/// corresponding `.zip` file is located first.
///
/// # Errors
///
/// Returns [`Error::InvalidSource`] when the main `.zip` of a split archive
/// is absent, and [`Error::UnknownFormat`] for non-archive tags.
pub fn build_extract(
    source: &Path,
    format: FormatTag,
    target_dir: &Path,
    password: Option<&str>,
) -> Result<CommandPlan> {
    let format = if format == FormatTag::Zip && is_split_zip(source) {
        FormatTag::SplitZip
    } else {
        format
    };

    let mut notes = Vec::new();
    let mut args: Vec<String> = Vec::new();

    let tool = match format {
        FormatTag::Tar | FormatTag::TarGz | FormatTag::TarBz2 | FormatTag::TarXz => {
            if password.is_some() {
                notes.push(CommandNote::TarPasswordIgnored);
            }
            let flags = match format {
                FormatTag::Tar => "-xf",
                FormatTag::TarGz => "-xzf",
                FormatTag::TarBz2 => "-xjf",
                _ => "-xJf",
            };
            args.push(flags.into());
            args.push(absolute_arg(source)?);
            args.push("-C".into());
            args.push(absolute_arg(target_dir)?);
            "tar"
        }
        FormatTag::Zip => {
            if let Some(password) = password {
                args.push("-P".into());
                args.push(password.to_string());
            }
            args.push("-o".into());
            args.push(absolute_arg(source)?);
            args.push("-d".into());
            args.push(absolute_arg(target_dir)?);
            "unzip"
        }
        FormatTag::SplitZip => {
            let actual_source = if is_split_zip_part(source) {
                find_split_zip_main(source).ok_or_else(|| Error::InvalidSource {
                    path: source.with_extension("zip"),
                    reason: "main ZIP file not found for split archive".into(),
                })?
            } else {
                source.to_path_buf()
            };
            notes.push(CommandNote::SplitZipExtraction);
            seven_zip_extract_args(&mut args, &actual_source, target_dir, password)?;
            "7z"
        }
        FormatTag::Rar => {
            args.push("x".into());
            if let Some(password) = password {
                args.push(format!("-p{password}"));
            }
            // -o+: overwrite existing files
            args.push("-o+".into());
            args.push(absolute_arg(source)?);
            args.push(absolute_arg(target_dir)?);
            "unrar"
        }
        FormatTag::SevenZip => {
            seven_zip_extract_args(&mut args, source, target_dir, password)?;
            "7z"
        }
        FormatTag::Lz4 => {
            args.push("-d".into());
            args.push(absolute_arg(source)?);
            args.push(absolute_arg(target_dir)?);
            "lz4"
        }
        FormatTag::Zstd => {
            args.push("-d".into());
            args.push(absolute_arg(source)?);
            args.push("-o".into());
            args.push(absolute_arg(target_dir)?);
            "zstd"
        }
        FormatTag::Xar => {
            args.push("-xf".into());
            args.push(absolute_arg(source)?);
            args.push("-C".into());
            args.push(absolute_arg(target_dir)?);
            "xar"
        }
        FormatTag::RegularFile | FormatTag::Directory | FormatTag::Unknown => {
            return Err(Error::UnknownFormat {
                detail: "unsupported source format for decompression".into(),
            })
        }
    };

    Ok(CommandPlan {
        command: ToolCommand {
            tool,
            args,
            working_dir: None,
        },
        notes,
    })
}

/// Builds the archive-integrity test command, or `None` for formats whose
/// tools offer no test mode (verification is skipped for those).
///
/// # Errors
///
/// Fails only when the archive path cannot be made absolute.
pub fn build_verify(archive: &Path, format: FormatTag) -> Result<Option<ToolCommand>> {
    let archive_arg = absolute_arg(archive)?;
    let command = match format {
        FormatTag::Tar | FormatTag::TarGz | FormatTag::TarBz2 | FormatTag::TarXz => {
            Some(ToolCommand {
                tool: "tar",
                args: vec!["-tf".into(), archive_arg],
                working_dir: None,
            })
        }
        FormatTag::Zip => Some(ToolCommand {
            tool: "unzip",
            args: vec!["-t".into(), archive_arg],
            working_dir: None,
        }),
        FormatTag::SevenZip | FormatTag::SplitZip => Some(ToolCommand {
            tool: "7z",
            args: vec!["t".into(), archive_arg],
            working_dir: None,
        }),
        FormatTag::RegularFile
        | FormatTag::Directory
        | FormatTag::Rar
        | FormatTag::Lz4
        | FormatTag::Zstd
        | FormatTag::Xar
        | FormatTag::Unknown => None,
    };
    Ok(command)
}

/// 7z extraction arguments, shared between the 7z format and split ZIP.
fn seven_zip_extract_args(
    args: &mut Vec<String>,
    source: &Path,
    target_dir: &Path,
    password: Option<&str>,
) -> Result<()> {
    args.push("x".into());
    if let Some(password) = password {
        args.push(format!("-p{password}"));
    }
    args.push(absolute_arg(source)?);
    args.push(format!("-o{}", absolute_arg(target_dir)?));
    args.push("-y".into());
    Ok(())
}

/// The layout's single item, for tools that accept exactly one input.
fn single_item(layout: &ArchiveLayout, tool: &str) -> Result<String> {
    if layout.items.len() != 1 {
        return Err(Error::UnknownFormat {
            detail: format!("Multiple sources are not supported for {tool} compression."),
        });
    }
    Ok(layout.items[0].clone())
}

/// Renders a path as an absolute argument string.
fn absolute_arg(path: &Path) -> Result<String> {
    let absolute = std::path::absolute(path).map_err(|err| Error::Unknown {
        message: format!("cannot resolve '{}': {err}", path.display()),
    })?;
    Ok(absolute.to_string_lossy().into_owned())
}
