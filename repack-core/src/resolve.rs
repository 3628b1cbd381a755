//! Filesystem entry classification and operation inference.
//!
//! [`resolve`] composes signature sniffing and extension classification with
//! a fixed precedence (signature wins), and [`recognize`] turns the resolved
//! source type plus the target path's extension hint into the intended
//! operation.

use std::path::Path;

use crate::error::{Error, Result};
use crate::format::{self, FormatTag};
use crate::sniff;

/// The operation inferred for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    /// Create an archive from the source(s)
    Compress,
    /// Extract the source archive into the target directory
    Decompress,
    /// Not yet decided (interactive mode before the user confirms)
    #[default]
    Undetermined,
}

/// Outcome of recognizing a (source, target) pair.
///
/// Immutable after creation except for an explicit user-forced format, which
/// is a trusted override applied through [`Recognition::apply_forced`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recognition {
    /// Resolved type of the source path
    pub source: FormatTag,
    /// Archive format hinted by the target path's suffix
    pub target_hint: FormatTag,
    /// Inferred operation
    pub operation: Operation,
}

impl Recognition {
    /// Applies an explicitly forced format.
    ///
    /// For compression the forced format replaces the target hint; for
    /// decompression it replaces the detected source type. The override is
    /// trusted without re-validation against the filesystem.
    pub fn apply_forced(&mut self, forced: FormatTag) {
        match self.operation {
            Operation::Compress | Operation::Undetermined => self.target_hint = forced,
            Operation::Decompress => self.source = forced,
        }
    }
}

/// Classifies a filesystem entry.
///
/// Directories classify as [`FormatTag::Directory`] unconditionally. Regular
/// files are sniffed first; extension classification is the fallback; a file
/// matching neither is a plain [`FormatTag::RegularFile`], which is a valid
/// compression source rather than an error.
///
/// # Errors
///
/// Returns [`Error::InvalidSource`] if the path does not exist or is neither
/// a regular file nor a directory.
pub fn resolve(path: &Path) -> Result<FormatTag> {
    if !path.exists() {
        return Err(Error::InvalidSource {
            path: path.to_path_buf(),
            reason: "path does not exist".into(),
        });
    }
    if path.is_dir() {
        return Ok(FormatTag::Directory);
    }
    if path.is_file() {
        let mut tag = sniff::sniff(path);
        if tag == FormatTag::Unknown {
            tag = format::classify_extension(path);
        }
        return Ok(if tag == FormatTag::Unknown {
            FormatTag::RegularFile
        } else {
            tag
        });
    }
    Err(Error::InvalidSource {
        path: path.to_path_buf(),
        reason: "not a regular file or directory".into(),
    })
}

/// Infers the operation for a (source, target) pair.
///
/// A file or directory source always means compression; the target hint is
/// whatever the extension classifier says about the target path, collapsed
/// to [`FormatTag::Unknown`] when it is not an archive tag (the caller must
/// then supply a forced format — this is reported, never silently
/// defaulted). An archive source means decompression.
///
/// # Errors
///
/// Returns [`Error::InvalidSource`] when the source cannot be resolved, and
/// [`Error::InvalidTarget`] when decompressing toward an existing path that
/// is not a directory.
pub fn recognize(source: &Path, target: &Path) -> Result<Recognition> {
    let source_tag = resolve(source)?;

    let mut target_hint = if target.as_os_str().is_empty() {
        FormatTag::Unknown
    } else {
        format::classify_extension(target)
    };

    match source_tag {
        FormatTag::Directory | FormatTag::RegularFile => {
            if !target_hint.is_archive() {
                target_hint = FormatTag::Unknown;
            }
            Ok(Recognition {
                source: source_tag,
                target_hint,
                operation: Operation::Compress,
            })
        }
        _ => {
            if target.exists() && !target.is_dir() {
                return Err(Error::InvalidTarget {
                    path: target.to_path_buf(),
                    reason: "target for decompression must be a directory".into(),
                });
            }
            Ok(Recognition {
                source: source_tag,
                target_hint,
                operation: Operation::Decompress,
            })
        }
    }
}
