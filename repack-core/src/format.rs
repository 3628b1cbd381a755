//! Archive format tags and the extension classifier.
//!
//! [`FormatTag`] is the closed enumeration every other module dispatches on.
//! Classification by filename is the fallback path; binary signature
//! sniffing (see [`crate::sniff`]) always takes precedence.

use std::ffi::OsStr;
use std::path::Path;

/// Result of classifying a filesystem entry.
///
/// `SplitZip` is a logical refinement of `Zip`, not a distinct wire format:
/// the extension classifier reports split parts (`.z01` .. `.z99`) as `Zip`,
/// and the command builder upgrades a `Zip` source to `SplitZip` when the
/// split convention is detected on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTag {
    /// An ordinary file with no recognized archive format
    RegularFile,
    /// A directory
    Directory,
    /// Uncompressed tar archive
    Tar,
    /// Gzip-compressed tar archive (also used for bare gzip streams)
    TarGz,
    /// Bzip2-compressed tar archive
    TarBz2,
    /// Xz-compressed tar archive
    TarXz,
    /// ZIP archive
    Zip,
    /// ZIP archive stored as a main file plus numbered continuation parts
    SplitZip,
    /// RAR archive
    Rar,
    /// 7-Zip archive
    SevenZip,
    /// LZ4 frame
    Lz4,
    /// Zstandard frame
    Zstd,
    /// XAR archive
    Xar,
    /// Nothing recognized
    Unknown,
}

impl FormatTag {
    /// Returns `true` for tags that name a supported archive container.
    pub fn is_archive(self) -> bool {
        !matches!(
            self,
            FormatTag::RegularFile | FormatTag::Directory | FormatTag::Unknown
        )
    }

    /// Returns `true` when the underlying tool accepts a password for this format.
    pub fn supports_password(self) -> bool {
        matches!(
            self,
            FormatTag::Zip | FormatTag::SplitZip | FormatTag::SevenZip | FormatTag::Rar
        )
    }

    /// Human-readable description used in interactive prompts.
    pub fn describe(self) -> &'static str {
        match self {
            FormatTag::RegularFile => "regular file",
            FormatTag::Directory => "directory",
            FormatTag::Tar => "TAR archive",
            FormatTag::TarGz => "TAR.GZ archive",
            FormatTag::TarBz2 => "TAR.BZ2 archive",
            FormatTag::TarXz => "TAR.XZ archive",
            FormatTag::Zip => "ZIP archive",
            FormatTag::SplitZip => "split ZIP archive",
            FormatTag::Rar => "RAR archive",
            FormatTag::SevenZip => "7Z archive",
            FormatTag::Lz4 => "LZ4 archive",
            FormatTag::Zstd => "ZSTD archive",
            FormatTag::Xar => "XAR archive",
            FormatTag::Unknown => "unknown type",
        }
    }
}

/// Compound suffixes treated as a unit when splitting a filename into
/// stem and extension (rename suggestions keep `.tar.gz` together).
pub const COMPOUND_SUFFIXES: [&str; 5] =
    [".tar.gz", ".tar.bz2", ".tar.xz", ".tar.zst", ".tar.lz4"];

/// Checks whether a lower-cased extension (without the leading dot) names a
/// split-ZIP part: `z` followed by exactly two ASCII digits.
pub(crate) fn is_split_zip_suffix(ext: &str) -> bool {
    let bytes = ext.as_bytes();
    bytes.len() == 3
        && bytes[0] == b'z'
        && bytes[1].is_ascii_digit()
        && bytes[2].is_ascii_digit()
}

/// Classifies a path purely by its suffix.
///
/// The suffix is lower-cased before comparison. Split-ZIP parts (`.z01` ..
/// `.z99`) classify as [`FormatTag::Zip`]. Compound suffixes of the form
/// `<name>.tar.{gz,bz2,xz}` are recognized by inspecting the second-to-last
/// suffix. Paths without a recognizable suffix yield [`FormatTag::Unknown`].
pub fn classify_extension(path: &Path) -> FormatTag {
    let Some(ext) = path.extension().and_then(OsStr::to_str) else {
        return FormatTag::Unknown;
    };
    let ext = ext.to_ascii_lowercase();

    match ext.as_str() {
        "tar" => FormatTag::Tar,
        "zip" => FormatTag::Zip,
        "rar" => FormatTag::Rar,
        "7z" => FormatTag::SevenZip,
        "lz4" => FormatTag::Lz4,
        "zst" | "zstd" => FormatTag::Zstd,
        "xar" => FormatTag::Xar,
        "tgz" => FormatTag::TarGz,
        "tbz2" | "tbz" => FormatTag::TarBz2,
        "txz" => FormatTag::TarXz,
        _ => {
            if is_split_zip_suffix(&ext) {
                return FormatTag::Zip;
            }
            // Double extensions like ".tar.gz": look at the stem's suffix.
            let stem_is_tar = path
                .file_stem()
                .map(Path::new)
                .and_then(|stem| stem.extension())
                .and_then(OsStr::to_str)
                .is_some_and(|inner| inner.eq_ignore_ascii_case("tar"));
            if stem_is_tar {
                return match ext.as_str() {
                    "gz" => FormatTag::TarGz,
                    "bz2" => FormatTag::TarBz2,
                    "xz" => FormatTag::TarXz,
                    _ => FormatTag::Unknown,
                };
            }
            FormatTag::Unknown
        }
    }
}

/// Parses an explicitly forced format name (`--format=TYPE`).
///
/// Returns `None` for unrecognized names; the caller reports that as an
/// unknown-format error rather than guessing.
pub fn parse_forced_format(value: &str) -> Option<FormatTag> {
    match value.to_ascii_lowercase().as_str() {
        "zip" => Some(FormatTag::Zip),
        "7z" => Some(FormatTag::SevenZip),
        "tar" => Some(FormatTag::Tar),
        "tar.gz" | "tgz" => Some(FormatTag::TarGz),
        "tar.bz2" | "tbz2" => Some(FormatTag::TarBz2),
        "tar.xz" | "txz" => Some(FormatTag::TarXz),
        "rar" => Some(FormatTag::Rar),
        "lz4" => Some(FormatTag::Lz4),
        "zstd" | "zst" => Some(FormatTag::Zstd),
        "xar" => Some(FormatTag::Xar),
        _ => None,
    }
}
