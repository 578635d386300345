//! BIFF8 string decoding and shared string table reassembly
//!
//! A BIFF8 "unicode string" is a character count followed by an option
//! byte and the characters. Characters are stored either as UTF-16LE code
//! units or, when every unit fits in a byte, compressed to one byte each
//! with the zero high byte dropped. Optional rich-text and phonetic blocks
//! follow the characters and are skipped.
//!
//! Strings in the SST may be cut at a record boundary. The continuation
//! record then starts with a fresh option byte (the compression can differ
//! from the first part) followed by the remaining characters.

use bitflags::bitflags;

use crate::common::{Error, Result};
use crate::ole::binary;

bitflags! {
    /// Option byte preceding the characters of a BIFF8 string
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StringFlags: u8 {
        /// Characters are 16-bit; otherwise compressed to 8 bits
        const HIGH_BYTE = 0x01;
        /// A phonetic (extended) block follows the characters
        const EXT_ST = 0x04;
        /// Rich-text formatting runs follow the characters
        const RICH_ST = 0x08;
    }
}

/// Layout of one string after its option byte has been read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnicodeParams {
    pub flags: StringFlags,
    /// Offset of the first character byte
    pub start: usize,
    /// Rich-text and phonetic bytes that follow the characters
    pub trailing: usize,
}

impl UnicodeParams {
    #[inline]
    pub fn char_width(&self) -> usize {
        char_width(self.flags)
    }
}

#[inline]
fn char_width(flags: StringFlags) -> usize {
    if flags.contains(StringFlags::HIGH_BYTE) { 2 } else { 1 }
}

/// Read the option byte at `offset` and the optional run count and
/// phonetic size behind it.
pub fn parse_unicode_params(data: &[u8], offset: usize) -> Result<UnicodeParams> {
    let flags = StringFlags::from_bits_truncate(binary::read_u8(data, offset)?);
    let mut pos = offset + 1;
    let mut trailing = 0usize;

    if flags.contains(StringFlags::RICH_ST) {
        trailing += binary::read_u16_le(data, pos)? as usize * 4;
        pos += 2;
    }
    if flags.contains(StringFlags::EXT_ST) {
        trailing += binary::read_u32_le(data, pos)? as usize;
        pos += 4;
    }

    Ok(UnicodeParams {
        flags,
        start: pos,
        trailing,
    })
}

/// Append `count` characters stored at `data[..]` as UTF-16 code units.
fn push_units(units: &mut Vec<u16>, data: &[u8], count: usize, width: usize) {
    if width == 2 {
        units.extend(
            data[..count * 2]
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]])),
        );
    } else {
        units.extend(data[..count].iter().map(|&b| b as u16));
    }
}

fn units_to_string(units: &[u16]) -> Result<String> {
    String::from_utf16(units).map_err(|_| Error::InvalidCharacter)
}

/// Decode a complete unicode string whose option byte sits at `offset`.
///
/// Returns the text and the offset just past the string, trailing blocks
/// included.
pub fn read_unicode_string(data: &[u8], offset: usize, cch: usize) -> Result<(String, usize)> {
    let params = parse_unicode_params(data, offset)?;
    let width = params.char_width();
    let bytes = binary::read_bytes(data, params.start, cch * width)?;

    let mut units = Vec::with_capacity(cch);
    push_units(&mut units, bytes, cch, width);
    let text = units_to_string(&units)?;
    Ok((text, params.start + cch * width + params.trailing))
}

/// The finished shared string table
#[derive(Debug, Clone, Default)]
pub struct SharedStrings {
    strings: Vec<String>,
    declared: u32,
}

impl SharedStrings {
    /// A table whose strings were not decoded (metadata-only opens).
    pub fn declared_only(declared: u32) -> Self {
        SharedStrings {
            strings: Vec::new(),
            declared,
        }
    }

    /// Number of strings the SST header announced
    pub fn declared(&self) -> u32 {
        self.declared
    }

    /// Number of strings actually decoded
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn get(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }
}

/// A string cut at a record boundary
#[derive(Debug)]
struct PendingString {
    units: Vec<u16>,
    remaining: usize,
    trailing: usize,
}

/// Incremental SST decoder fed with the SST record and its CONTINUEs.
#[derive(Debug, Default)]
pub struct SstBuilder {
    table: SharedStrings,
    pending: Option<PendingString>,
    skip: usize,
}

impl SstBuilder {
    /// Start from the SST record itself: total and unique counts, then
    /// strings from offset 8.
    pub fn start(data: &[u8]) -> Result<Self> {
        let declared = binary::read_u32_le(data, 4)?;
        let mut builder = SstBuilder {
            table: SharedStrings {
                strings: Vec::new(),
                declared,
            },
            pending: None,
            skip: 0,
        };
        builder.parse_strings(data, 8)?;
        Ok(builder)
    }

    /// Feed the payload of a CONTINUE record that follows the SST.
    pub fn continue_with(&mut self, data: &[u8]) -> Result<()> {
        let mut pos = 0;

        if let Some(mut pending) = self.pending.take() {
            let flags = StringFlags::from_bits_truncate(binary::read_u8(data, 0)?);
            let width = char_width(flags);
            pos = 1;

            let take = pending.remaining.min((data.len() - pos) / width);
            push_units(&mut pending.units, &data[pos..], take, width);
            pos += take * width;
            pending.remaining -= take;

            if pending.remaining > 0 {
                self.pending = Some(pending);
                return Ok(());
            }

            self.table.strings.push(units_to_string(&pending.units)?);
            if pos + pending.trailing > data.len() {
                self.skip = pos + pending.trailing - data.len();
                return Ok(());
            }
            pos += pending.trailing;
        } else if self.skip > 0 {
            if self.skip >= data.len() {
                self.skip -= data.len();
                return Ok(());
            }
            pos = self.skip;
            self.skip = 0;
        }

        self.parse_strings(data, pos)
    }

    fn parse_strings(&mut self, data: &[u8], mut pos: usize) -> Result<()> {
        while self.table.strings.len() < self.table.declared as usize {
            // A string header never straddles records
            if pos + 3 > data.len() {
                break;
            }

            let cch = binary::read_u16_le(data, pos)? as usize;
            let params = parse_unicode_params(data, pos + 2)?;
            let width = params.char_width();
            pos = params.start;

            let available = data.len().saturating_sub(pos) / width;
            let mut units = Vec::with_capacity(cch);
            if cch > available {
                push_units(&mut units, &data[pos.min(data.len())..], available, width);
                self.pending = Some(PendingString {
                    units,
                    remaining: cch - available,
                    trailing: params.trailing,
                });
                break;
            }

            push_units(&mut units, &data[pos..], cch, width);
            pos += cch * width;
            self.table.strings.push(units_to_string(&units)?);

            if pos + params.trailing > data.len() {
                self.skip = pos + params.trailing - data.len();
                break;
            }
            pos += params.trailing;
        }
        Ok(())
    }

    /// Whether every declared string has been decoded
    pub fn is_complete(&self) -> bool {
        self.pending.is_none() && self.table.strings.len() >= self.table.declared as usize
    }

    pub fn finish(self) -> SharedStrings {
        if !self.is_complete() {
            log::warn!(
                "SST declared {} strings, decoded {}",
                self.table.declared,
                self.table.strings.len()
            );
        }
        self.table
    }
}
