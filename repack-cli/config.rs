//! Runtime configuration shared by the CLI flows.

use repack_core::FormatTag;

/// Options resolved from the command line, identical for both the direct and
/// interactive flows.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Archive password, where the target format supports one
    pub password: Option<String>,
    /// Compression level (1-9)
    pub level: Option<u32>,
    /// Thread count for tools with a thread flag
    pub threads: Option<usize>,
    /// Emit progress detail beyond the standard status lines
    pub verbose: bool,
    /// Measure and report sizes, ratio, and elapsed time
    pub benchmark: bool,
    /// Run the tool's integrity test after compression
    pub verify: bool,
    /// Exclude patterns applied to planned archive items
    pub exclude: Vec<String>,
    /// Include patterns applied to planned archive items
    pub include: Vec<String>,
    /// Format forced with `--format`, overriding detection
    pub force_format: Option<FormatTag>,
}
