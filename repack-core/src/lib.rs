//! # repack-core
//!
//! Format detection and command planning for the `repack` archive front end.
//!
//! This crate contains everything that can be decided without touching an
//! external tool: classifying sources by binary signature and filename,
//! inferring the compress/decompress operation from a (source, target) pair,
//! planning archive layouts for multi-source compression, resolving target
//! path conflicts through an interactive dialog, and translating the result
//! into concrete external tool invocations. Actually spawning the tools is
//! delegated to a [`command::ToolRunner`] implementation supplied by the
//! binary crate.

pub mod command;
pub mod conflict;
pub mod error;
pub mod filter;
pub mod format;
pub mod layout;
pub mod resolve;
pub mod sniff;
pub mod stats;


pub use error::{Error, Result};
pub use format::FormatTag;
