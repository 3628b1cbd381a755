//! Error types for repack operations.
//!
//! Every fallible function in this crate returns exactly one of these kinds.
//! Each kind carries a stable numeric code that doubles as the process exit
//! status, so scripts can branch on the failure class without parsing text.

use std::path::PathBuf;

use thiserror::Error;

/// Specialized `Result` type for repack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for repack operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Required command-line arguments are absent or malformed
    #[error("Missing arguments. {detail}")]
    MissingArguments {
        /// Explanation of what is missing
        detail: String,
    },

    /// Source path does not exist or cannot be operated on
    #[error("Source path '{}' does not exist or is invalid. {reason}", path.display())]
    InvalidSource {
        /// The offending source path
        path: PathBuf,
        /// Why the source was rejected
        reason: String,
    },

    /// Target path has the wrong shape for the inferred operation
    #[error("Invalid target path '{}'. {reason}", path.display())]
    InvalidTarget {
        /// The offending target path
        path: PathBuf,
        /// Why the target was rejected
        reason: String,
    },

    /// Source and target resolve to the same filesystem entity
    #[error("Source and target paths cannot be the same")]
    SamePath,

    /// Format could not be inferred and none was forced
    #[error("Unrecognized file format or ambiguous operation. {detail}")]
    UnknownFormat {
        /// Explanation of the ambiguity
        detail: String,
    },

    /// Required external tool is absent from the search path
    #[error("Required tool not found: {tool}. Please ensure it is installed and in your PATH.")]
    ToolNotFound {
        /// Name of the missing tool
        tool: String,
    },

    /// External tool exited with a nonzero status
    #[error(
        "Operation failed (command: {command}, exit code: {exit_code}). \
         Might be due to a wrong password."
    )]
    OperationFailed {
        /// The command line that was executed
        command: String,
        /// Exit status reported by the tool
        exit_code: i32,
    },

    /// Filesystem denied access
    #[error("Permission denied: {}", path.display())]
    PermissionDenied {
        /// Path that could not be accessed
        path: PathBuf,
    },

    /// Filesystem reported insufficient space
    #[error("Not enough disk space")]
    NotEnoughSpace,

    /// Standard input reached EOF while a dialog was waiting for an answer
    #[error("Input stream closed. Operation canceled.")]
    InputClosed,

    /// Catch-all for failures outside the closed set above
    #[error("Unexpected error: {message}")]
    Unknown {
        /// Description of the failure
        message: String,
    },
}

impl Error {
    /// Returns the machine-checkable code for this error kind.
    ///
    /// The code is stable across releases and is used verbatim as the
    /// process exit status.
    pub fn code(&self) -> i32 {
        match self {
            Error::MissingArguments { .. } => 1,
            Error::InvalidSource { .. } => 2,
            Error::InvalidTarget { .. } => 3,
            Error::SamePath => 4,
            Error::UnknownFormat { .. } => 5,
            Error::ToolNotFound { .. } => 6,
            Error::OperationFailed { .. } => 7,
            Error::PermissionDenied { .. } => 8,
            Error::NotEnoughSpace => 9,
            Error::InputClosed | Error::Unknown { .. } => 99,
        }
    }
}
