//! Archive layout planning for compression.
//!
//! External archivers operate relative to a working directory, so the
//! internal paths of the resulting archive depend entirely on the base
//! directory and per-item relative paths computed here being consistent for
//! every source in one invocation.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// One compression input as written by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionSource {
    /// Path to the file or directory to archive
    pub path: PathBuf,
    /// Archive the directory's contents without the directory itself.
    /// Set only when the caller wrote a trailing directory separator.
    pub include_contents: bool,
}

impl CompressionSource {
    /// Wraps a path with contents-mode disabled.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            include_contents: false,
        }
    }

    /// Builds a source from the raw command-line string, deriving the
    /// contents-only flag from a trailing separator.
    pub fn from_raw(raw: &str) -> Self {
        let include_contents = raw.ends_with('/') || raw.ends_with('\\');
        Self {
            path: PathBuf::from(raw),
            include_contents,
        }
    }
}

/// Working directory and relative item paths for one tool invocation.
///
/// Every item, resolved against `base_directory`, stays inside it: items are
/// produced by prefix-stripping canonical paths and can never contain
/// parent-directory segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
    /// Directory the external tool runs in
    pub base_directory: PathBuf,
    /// Paths handed to the tool, relative to `base_directory`
    pub items: Vec<String>,
}

/// Plans the archive layout for one or more compression sources.
///
/// A single directory source flagged contents-only yields the
/// single-contents layout: the base directory is the source itself and the
/// item list is exactly `["."]`, so archive entries have no enclosing
/// directory. Otherwise the base is the common ancestor of all canonical
/// sources, found by walking upward from the first source's parent, with the
/// first source's filesystem root as the last resort. A source that equals
/// the base directory falls back to its bare name as the item.
///
/// # Errors
///
/// Returns [`Error::MissingArguments`] for an empty source list and
/// [`Error::InvalidSource`] when any source path cannot be canonicalized.
pub fn plan(sources: &[CompressionSource]) -> Result<ArchiveLayout> {
    if sources.is_empty() {
        return Err(Error::MissingArguments {
            detail: "No sources provided for compression".into(),
        });
    }

    let mut canonical = Vec::with_capacity(sources.len());
    for source in sources {
        let path = std::fs::canonicalize(&source.path).map_err(|_| Error::InvalidSource {
            path: source.path.clone(),
            reason: "path does not exist".into(),
        })?;
        canonical.push(path);
    }

    let contents_mode =
        sources.len() == 1 && sources[0].include_contents && canonical[0].is_dir();
    if contents_mode {
        return Ok(ArchiveLayout {
            base_directory: canonical.into_iter().next().unwrap_or_default(),
            items: vec![".".into()],
        });
    }

    let base = common_base(&canonical);
    let mut items = Vec::with_capacity(canonical.len());
    for path in &canonical {
        let relative = path.strip_prefix(&base).unwrap_or(path);
        let item = if relative.as_os_str().is_empty() || relative == Path::new(".") {
            // The source is the base directory itself; archive it by name.
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned())
        } else {
            relative.to_string_lossy().into_owned()
        };
        items.push(item);
    }

    Ok(ArchiveLayout {
        base_directory: base,
        items,
    })
}

/// Nearest directory that is an ancestor-or-self of every canonical path.
fn common_base(paths: &[PathBuf]) -> PathBuf {
    let first = &paths[0];
    let mut base = first
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| first.clone());

    loop {
        if paths.iter().all(|path| path.starts_with(&base)) {
            return base;
        }
        match base.parent() {
            Some(parent) => base = parent.to_path_buf(),
            None => break,
        }
    }

    first
        .ancestors()
        .last()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/"))
}
