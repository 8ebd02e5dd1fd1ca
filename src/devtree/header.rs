// ABOUTME: Node and property header layouts for the nested device tree format
// ABOUTME: Little-endian fixed-size headers with 4-byte padded property values

use super::error::DeviceTreeError;
use core::fmt;

/// Node header: property count followed by child count (8 bytes total)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHeader {
    /// Number of properties stored directly after the header
    pub n_properties: u32,
    /// Number of child subtrees stored after the properties
    pub n_children: u32,
}

impl NodeHeader {
    /// Header size in bytes
    pub const SIZE: usize = 8;

    /// Parse a node header from the front of `input`
    pub fn parse(input: &[u8]) -> Result<(&[u8], Self), DeviceTreeError> {
        if input.len() < Self::SIZE {
            return Err(DeviceTreeError::TruncatedNodeHeader);
        }

        let header = NodeHeader {
            n_properties: read_le_u32(&input[0..4]),
            n_children: read_le_u32(&input[4..8]),
        };

        Ok((&input[Self::SIZE..], header))
    }
}

/// Property header: a fixed NUL-terminated name field and a flagged size word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyHeader<'a> {
    /// Property name, without the NUL terminator or zero fill
    pub name: PropertyName<'a>,
    /// Value size in bytes with the substitution flag masked off
    pub size: u32,
    /// Bit 31 of the raw size word: the loader replaces this value at boot
    pub needs_substitution: bool,
}

impl<'a> PropertyHeader<'a> {
    /// Width of the name field in bytes
    pub const NAME_LEN: usize = 32;

    /// Header size in bytes (name field plus size word)
    pub const SIZE: usize = Self::NAME_LEN + 4;

    /// Flag bit in the raw size word
    pub const SUBSTITUTION_FLAG: u32 = 0x8000_0000;

    /// Parse a property header from the front of `input`
    pub fn parse(input: &'a [u8]) -> Result<(&'a [u8], Self), DeviceTreeError> {
        if input.len() < Self::SIZE {
            return Err(DeviceTreeError::TruncatedPropertyHeader);
        }

        let name_field = &input[..Self::NAME_LEN];
        if name_field[Self::NAME_LEN - 1] != 0 {
            return Err(DeviceTreeError::UnterminatedName);
        }
        let name_len = name_field
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(Self::NAME_LEN - 1);

        let raw_size = read_le_u32(&input[Self::NAME_LEN..Self::SIZE]);

        let header = PropertyHeader {
            name: PropertyName(&name_field[..name_len]),
            size: raw_size & !Self::SUBSTITUTION_FLAG,
            needs_substitution: raw_size & Self::SUBSTITUTION_FLAG != 0,
        };

        Ok((&input[Self::SIZE..], header))
    }

    /// Split this header's value off the front of `input`, skipping padding.
    ///
    /// Values are padded to a multiple of 4 bytes. A value whose unpadded end
    /// lands exactly on the end of `input` is accepted without its padding.
    pub fn split_value(&self, input: &'a [u8]) -> Result<(&'a [u8], &'a [u8]), DeviceTreeError> {
        let size = self.size as usize;
        let padded = size + padding_for(size);

        if padded <= input.len() {
            Ok((&input[padded..], &input[..size]))
        } else if size == input.len() {
            Ok((&input[size..], input))
        } else {
            Err(DeviceTreeError::ValueOverrun)
        }
    }
}

/// Zero-copy view of a property name
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropertyName<'a>(&'a [u8]);

impl<'a> PropertyName<'a> {
    /// Wrap raw name bytes (without NUL)
    pub fn new(bytes: &'a [u8]) -> Self {
        Self(bytes)
    }

    /// Raw name bytes
    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    /// Name as a string slice, if it is valid UTF-8
    pub fn to_str(&self) -> Option<&'a str> {
        core::str::from_utf8(self.0).ok()
    }
}

impl PartialEq<str> for PropertyName<'_> {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for PropertyName<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Display for PropertyName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.0 {
            if (0x20..0x7f).contains(&b) {
                fmt::Write::write_char(f, b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for PropertyName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

/// Calculate padding needed to reach 4-byte alignment
pub fn padding_for(len: usize) -> usize {
    (4 - (len % 4)) % 4
}

fn read_le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
