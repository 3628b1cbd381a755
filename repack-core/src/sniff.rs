//! Binary signature sniffing.
//!
//! Classifies a file from a bounded prefix of its raw bytes, independent of
//! its name. Signature checks run in a fixed precedence order; the first
//! match wins. Any read that comes up shorter than a check requires simply
//! skips that check, and unreadable files yield [`FormatTag::Unknown`] so
//! the caller can fall back to extension classification. This function never
//! fails.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use crate::format::FormatTag;

/// Offset of the "ustar" marker inside a POSIX tar header.
const USTAR_OFFSET: u64 = 257;

/// Sniffs the file at `path` and returns the matched format tag.
///
/// Gzip streams classify as [`FormatTag::TarGz`] even when they do not wrap
/// a tar archive; bare `.gz` is not a distinct supported tag and the
/// downstream tooling treats the two identically. The same deliberate
/// imprecision applies to the legacy-tar heuristic, which accepts any
/// 512-byte block whose first 100 bytes are printable-or-null with at least
/// one non-null byte.
pub fn sniff(path: &Path) -> FormatTag {
    sniff_inner(path).unwrap_or(FormatTag::Unknown)
}

fn sniff_inner(path: &Path) -> Option<FormatTag> {
    let mut file = File::open(path).ok()?;

    let mut header = [0u8; 16];
    let n = read_prefix(&mut file, &mut header).ok()?;
    if n < 4 {
        return Some(FormatTag::Unknown);
    }

    // ZIP local file header, end-of-central-directory, or central directory entry.
    if header[0] == 0x50
        && header[1] == 0x4B
        && matches!(
            (header[2], header[3]),
            (0x03, 0x04) | (0x05, 0x06) | (0x01, 0x02)
        )
    {
        return Some(FormatTag::Zip);
    }

    // "Rar!"
    if header[..4] == [0x52, 0x61, 0x72, 0x21] {
        return Some(FormatTag::Rar);
    }

    if n >= 6 && header[..6] == [0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C] {
        return Some(FormatTag::SevenZip);
    }

    // Gzip stream; could be .tar.gz or a standalone .gz.
    if header[0] == 0x1F && header[1] == 0x8B {
        return Some(FormatTag::TarGz);
    }

    // "BZh"
    if header[..3] == [0x42, 0x5A, 0x68] {
        return Some(FormatTag::TarBz2);
    }

    if n >= 6 && header[..6] == [0xFD, 0x37, 0x7A, 0x58, 0x5A, 0x00] {
        return Some(FormatTag::TarXz);
    }

    if header[..4] == [0x04, 0x22, 0x4D, 0x18] {
        return Some(FormatTag::Lz4);
    }

    // Zstandard standard and legacy frame magics.
    if header[..4] == [0x28, 0xB5, 0x2F, 0xFD] || header[..4] == [0x22, 0xB5, 0x2F, 0xFD] {
        return Some(FormatTag::Zstd);
    }

    // POSIX tar: "ustar" at offset 257.
    file.seek(SeekFrom::Start(USTAR_OFFSET)).ok()?;
    let mut marker = [0u8; 6];
    let m = read_prefix(&mut file, &mut marker).ok()?;
    if m >= 5 && &marker[..5] == b"ustar" {
        return Some(FormatTag::Tar);
    }

    // Legacy tar without the ustar marker: inspect the full first block.
    file.seek(SeekFrom::Start(0)).ok()?;
    let mut block = [0u8; 512];
    let b = read_prefix(&mut file, &mut block).ok()?;
    if b >= 512 && looks_like_legacy_tar(&block) {
        return Some(FormatTag::Tar);
    }

    Some(FormatTag::Unknown)
}

/// Reads into `buf` until it is full or EOF, returning the byte count.
fn read_prefix(file: &mut File, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Legacy tar heuristic: the 100-byte filename field holds at least one
/// non-null byte and every non-null byte is printable ASCII.
fn looks_like_legacy_tar(block: &[u8; 512]) -> bool {
    let mut has_filename = false;
    for &byte in &block[..100] {
        if byte != 0 {
            has_filename = true;
            if !(32..=126).contains(&byte) {
                return false;
            }
        }
    }
    has_filename
}
