//! Command line argument parsing for the repack utility

use clap::Parser;

use repack_cli::CliConfig;
use repack_core::format::parse_forced_format;
use repack_core::{Error, Result};

/// Archive conversion front end
///
/// Infers the operation from the paths it is given: an archive source is
/// extracted, anything else is compressed into the archive named by the
/// target. The actual work is delegated to the system's archive tools.
#[derive(Parser, Debug)]
#[command(
    name = "repack",
    version,
    about = "Convert files and directories between archive formats",
    long_about = "repack is a format-aware front end for the system's archive tools. \
                 It detects what its source paths are, infers whether to compress or \
                 extract, and builds the right tar/zip/7z/unrar/lz4/zstd/xar invocation."
)]
pub struct RepackOpts {
    /// Source path(s) followed by the target path
    #[arg(value_name = "PATH")]
    pub paths: Vec<String>,

    /// Start the guided interactive mode
    #[arg(short = 'i', long = "interactive")]
    pub interactive: bool,

    /// Protect or open the archive with a password; bare -p prompts for one
    #[arg(
        short = 'p',
        long = "password",
        value_name = "PASSWORD",
        num_args = 0..=1,
        require_equals = true
    )]
    pub password: Option<Option<String>>,

    /// Compression level; bare -l selects the default level 6
    #[arg(
        short = 'l',
        long = "level",
        value_name = "LEVEL",
        num_args = 0..=1,
        require_equals = true,
        value_parser = clap::value_parser!(u32).range(1..=9)
    )]
    pub level: Option<Option<u32>>,

    /// Thread count for multithreaded tools; bare -t uses all cores
    #[arg(
        short = 't',
        long = "threads",
        value_name = "COUNT",
        num_args = 0..=1,
        require_equals = true,
        value_parser = clap::value_parser!(u64).range(1..=1024)
    )]
    pub threads: Option<Option<u64>>,

    /// Print progress detail
    #[arg(long = "verbose")]
    pub verbose: bool,

    /// Measure and report sizes, ratio, and elapsed time
    #[arg(long = "benchmark")]
    pub benchmark: bool,

    /// Test archive integrity after compression
    #[arg(long = "verify")]
    pub verify: bool,

    /// Exclude files matching a pattern (regex, or substring for invalid regex)
    #[arg(long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Only include files matching a pattern
    #[arg(long = "include", value_name = "PATTERN", action = clap::ArgAction::Append)]
    pub include: Vec<String>,

    /// Force the archive format instead of detecting it
    #[arg(long = "format", value_name = "TYPE")]
    pub format: Option<String>,
}

impl RepackOpts {
    /// Builds the runtime configuration.
    ///
    /// The second value reports whether a bare `-p` asked for an interactive
    /// password prompt, which the caller must run before dispatching.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFormat`] for an unrecognized `--format` value.
    pub fn config(&self) -> Result<(CliConfig, bool)> {
        let (password, prompt_password) = match &self.password {
            None => (None, false),
            Some(Some(password)) => (Some(password.clone()), false),
            Some(None) => (None, true),
        };

        let level = self.level.map(|level| level.unwrap_or(6));

        let threads = self.threads.map(|threads| match threads {
            Some(count) => count as usize,
            None => std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1),
        });

        let force_format = match &self.format {
            None => None,
            Some(value) => Some(parse_forced_format(value).ok_or_else(|| {
                Error::UnknownFormat {
                    detail: format!("invalid format specified: {value}"),
                }
            })?),
        };

        Ok((
            CliConfig {
                password,
                level,
                threads,
                verbose: self.verbose,
                benchmark: self.benchmark,
                verify: self.verify,
                exclude: self.exclude.clone(),
                include: self.include.clone(),
                force_format,
            },
            prompt_password,
        ))
    }
}
