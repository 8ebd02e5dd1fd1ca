// ABOUTME: Text rendering for classified property values
// ABOUTME: Best-effort formatting into any fmt::Write sink, reporting truncation

use super::classify::{ADDRESS_RANGE_SIZE, DisplayKind, SEGMENT_RANGE_SIZE, is_printable, read_le_u64};
use core::fmt::{self, Write};

/// Rendered in place of an integer whose width is not 1, 2, 4 or 8 bytes
pub const INVALID_WIDTH: &str = "<invalid>";

/// Whether a value was rendered in full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The whole value was written
    Complete,
    /// The sink refused part of the value; what it holds is a prefix
    Truncated,
}

impl Completion {
    /// True if nothing was cut off
    pub fn is_complete(self) -> bool {
        self == Completion::Complete
    }
}

/// Render `bytes` as `kind` into `out`.
///
/// Never fails on malformed input. Any write error from the sink ends
/// rendering and is reported as [`Completion::Truncated`].
pub fn format_value<W: Write + ?Sized>(kind: DisplayKind, bytes: &[u8], out: &mut W) -> Completion {
    let result = match kind {
        DisplayKind::RawHexDump => write_hex_dump(out, bytes),
        DisplayKind::SmallHexInteger => write_uint(out, bytes, true),
        DisplayKind::DecimalInteger => write_uint(out, bytes, false),
        DisplayKind::PrintableString => write_quoted(out, until_nul(bytes)),
        DisplayKind::QuotedHexString | DisplayKind::FunctionDescriptor => write_quoted(out, bytes),
        DisplayKind::AddressRangeTable => write_address_ranges(out, bytes),
        DisplayKind::SegmentRangeTable => write_segment_ranges(out, bytes),
    };

    match result {
        Ok(()) => Completion::Complete,
        Err(fmt::Error) => Completion::Truncated,
    }
}

/// Little-endian unsigned integer of width 1, 2, 4 or 8
pub fn read_uint(bytes: &[u8]) -> Option<u64> {
    match *bytes {
        [a] => Some(a as u64),
        [a, b] => Some(u16::from_le_bytes([a, b]) as u64),
        [a, b, c, d] => Some(u32::from_le_bytes([a, b, c, d]) as u64),
        [_, _, _, _, _, _, _, _] => Some(read_le_u64(bytes)),
        _ => None,
    }
}

/// Bytes with quotes, backslashes, NULs and non-printables escaped
#[derive(Debug, Clone, Copy)]
pub struct Escaped<'a>(pub &'a [u8]);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.0 {
            match b {
                b'\\' => f.write_str("\\\\")?,
                b'"' => f.write_str("\\\"")?,
                0 => f.write_str("\\0")?,
                b if is_printable(b) => f.write_char(b as char)?,
                b => write!(f, "\\x{b:02x}")?,
            }
        }
        Ok(())
    }
}

fn until_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

fn write_uint<W: Write + ?Sized>(out: &mut W, bytes: &[u8], hex: bool) -> fmt::Result {
    match read_uint(bytes) {
        None => out.write_str(INVALID_WIDTH),
        Some(0) if hex => out.write_str("0"),
        Some(value) if hex => write!(out, "0x{value:x}"),
        Some(value) => write!(out, "{value}"),
    }
}

fn write_quoted<W: Write + ?Sized>(out: &mut W, bytes: &[u8]) -> fmt::Result {
    write!(out, "\"{}\"", Escaped(bytes))
}

fn write_hex_dump<W: Write + ?Sized>(out: &mut W, bytes: &[u8]) -> fmt::Result {
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.write_char(' ')?;
        }
        write!(out, "{b:02x}")?;
    }
    Ok(())
}

fn write_address_ranges<W: Write + ?Sized>(out: &mut W, bytes: &[u8]) -> fmt::Result {
    for (i, record) in bytes.chunks_exact(ADDRESS_RANGE_SIZE).enumerate() {
        if i > 0 {
            out.write_str("; ")?;
        }
        let address = read_le_u64(&record[..8]);
        let size = read_le_u64(&record[8..]);
        write!(out, "0x{address:x},{size:x}")?;
    }
    Ok(())
}

fn write_segment_ranges<W: Write + ?Sized>(out: &mut W, bytes: &[u8]) -> fmt::Result {
    for (i, record) in bytes.chunks_exact(SEGMENT_RANGE_SIZE).enumerate() {
        if i > 0 {
            out.write_str("; ")?;
        }
        let phys = read_le_u64(&record[0..8]);
        let virt = read_le_u64(&record[8..16]);
        let remap = read_le_u64(&record[16..24]);
        let size = u32::from_le_bytes([record[24], record[25], record[26], record[27]]);
        let flags = u32::from_le_bytes([record[28], record[29], record[30], record[31]]);
        write!(
            out,
            "{{ phys=0x{phys:x}, virt=0x{virt:x}, remap=0x{remap:x}, size=0x{size:x}, flags=0x{flags:x} }}"
        )?;
    }
    Ok(())
}
