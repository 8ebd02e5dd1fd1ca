// ABOUTME: Heuristic display-kind inference for opaque property values
// ABOUTME: Ordered name and content rules mapping raw bytes to a rendering style

/// How a property value should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayKind {
    /// Space-separated hex bytes
    RawHexDump,
    /// Little-endian integer in hex
    SmallHexInteger,
    /// Little-endian integer in decimal
    DecimalInteger,
    /// Quoted NUL-terminated string
    PrintableString,
    /// Quoted string over the full value, with escapes
    QuotedHexString,
    /// `function-*` reference: phandle plus four-character method code
    FunctionDescriptor,
    /// Table of 64-bit (address, size) pairs
    AddressRangeTable,
    /// Table of segment mapping records
    SegmentRangeTable,
}

/// Size of one (address, size) record
pub const ADDRESS_RANGE_SIZE: usize = 16;

/// Size of one segment record: phys, virt, remap (u64) then size, flags (u32)
pub const SEGMENT_RANGE_SIZE: usize = 32;

/// Property name reserved for segment tables
pub const SEGMENT_RANGES_NAME: &[u8] = b"segment-ranges";

/// Highest plausible physical address in an unnamed range table
pub const MAX_PLAUSIBLE_ADDRESS: u64 = 0x9_8000_0000;

/// Required alignment of plausible addresses
pub const PAGE_SIZE: u64 = 0x1000;

/// Largest plausible region size in an unnamed range table
pub const MAX_PLAUSIBLE_RANGE: u64 = 0x8000_0000;

/// Minimum length of a printable run that counts toward `printable_run_sum`
const MIN_PRINTABLE_RUN: usize = 8;

/// Printable ASCII, space through tilde
pub fn is_printable(b: u8) -> bool {
    (0x20..0x7f).contains(&b)
}

/// Byte statistics gathered in one pass over a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValueStats {
    /// Number of printable bytes
    pub printable: usize,
    /// Index of the first NUL, or the length if there is none
    pub first_null: usize,
    /// Number of non-NUL bytes after the first NUL
    pub after_null: usize,
    /// Number of NUL bytes
    pub null_count: usize,
    /// Total length of printable runs at least 8 bytes long
    pub printable_run_sum: usize,
}

impl ValueStats {
    /// Measure `bytes`
    pub fn measure(bytes: &[u8]) -> Self {
        let mut stats = ValueStats {
            first_null: bytes.len(),
            ..Default::default()
        };
        let mut run = 0;

        for (i, &b) in bytes.iter().enumerate() {
            if b == 0 {
                stats.null_count += 1;
                if stats.first_null == bytes.len() {
                    stats.first_null = i;
                }
            } else if stats.first_null != bytes.len() {
                stats.after_null += 1;
            }

            if is_printable(b) {
                stats.printable += 1;
                run += 1;
            } else {
                if run >= MIN_PRINTABLE_RUN {
                    stats.printable_run_sum += run;
                }
                run = 0;
            }
        }

        if run >= MIN_PRINTABLE_RUN {
            stats.printable_run_sum += run;
        }

        stats
    }
}

/// Infer how to display the value `bytes` of the property `name`.
///
/// Rules are tried in order and the first match wins; name-based rules sit
/// ahead of the size-based integer fallback. Callers skip empty values.
pub fn classify(name: &[u8], bytes: &[u8]) -> DisplayKind {
    let size = bytes.len();

    if size == 1 || size == 2 {
        return DisplayKind::SmallHexInteger;
    }
    if name.first() == Some(&b'#') {
        return DisplayKind::DecimalInteger;
    }
    if size > 0 && size % SEGMENT_RANGE_SIZE == 0 && name == SEGMENT_RANGES_NAME {
        return DisplayKind::SegmentRangeTable;
    }

    let stats = ValueStats::measure(bytes);

    if stats.printable == stats.first_null
        && stats.after_null == 0
        && ((size != 4 && size != 8) || stats.printable + 1 >= size)
    {
        return DisplayKind::PrintableString;
    }

    if name.starts_with(b"function-")
        && size >= 8
        && size % 4 == 0
        && bytes[4..8].iter().all(|&b| is_printable(b))
    {
        return DisplayKind::FunctionDescriptor;
    }

    if 4 * stats.printable >= 3 * size {
        return DisplayKind::QuotedHexString;
    }

    if size > 0
        && size % ADDRESS_RANGE_SIZE == 0
        && (contains(name, b"reg") || plausible_address_ranges(bytes))
    {
        return DisplayKind::AddressRangeTable;
    }

    if stats.printable >= 2 && size >= 24 && 10 * (stats.printable + stats.null_count) >= 9 * size
    {
        return DisplayKind::QuotedHexString;
    }

    if stats.printable_run_sum > 0
        && size >= 24
        && 5 * (stats.printable_run_sum + stats.null_count) >= 3 * size
    {
        return DisplayKind::QuotedHexString;
    }

    if size == 4 || size == 8 {
        return DisplayKind::SmallHexInteger;
    }

    DisplayKind::RawHexDump
}

/// Whether every 16-byte record looks like a physical (address, size) pair
pub fn plausible_address_ranges(bytes: &[u8]) -> bool {
    bytes.chunks_exact(ADDRESS_RANGE_SIZE).all(|record| {
        let address = read_le_u64(&record[..8]);
        let size = read_le_u64(&record[8..]);
        address <= MAX_PLAUSIBLE_ADDRESS && address % PAGE_SIZE == 0 && size <= MAX_PLAUSIBLE_RANGE
    })
}

pub(crate) fn read_le_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
