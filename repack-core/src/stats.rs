//! Benchmark bookkeeping: byte counts and durations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use walkdir::WalkDir;

/// Measurements collected around one tool invocation.
#[derive(Debug, Clone, Default)]
pub struct OperationStats {
    /// Total size of the inputs, in bytes
    pub original_size: u64,
    /// Size of the produced archive, in bytes
    pub compressed_size: u64,
    /// Wall-clock duration of the operation
    pub elapsed: Duration,
    /// Thread count forwarded to (or assumed for) the tool
    pub thread_count: usize,
}

impl OperationStats {
    /// Space saving as a percentage of the original size.
    pub fn compression_ratio(&self) -> f64 {
        if self.original_size > 0 {
            (1.0 - self.compressed_size as f64 / self.original_size as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Bytes saved, clamped at zero when the archive grew.
    pub fn saved_bytes(&self) -> u64 {
        self.original_size.saturating_sub(self.compressed_size)
    }
}

/// Recursive size of all regular files under `path`.
///
/// Unreadable entries are skipped rather than failing the measurement.
pub fn directory_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}

/// Combined size of a set of source paths, recursing into directories.
pub fn sources_size(paths: &[PathBuf]) -> u64 {
    paths
        .iter()
        .map(|path| {
            if path.is_dir() {
                directory_size(path)
            } else {
                path.metadata().map(|metadata| metadata.len()).unwrap_or(0)
            }
        })
        .sum()
}
