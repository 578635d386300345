//! BIFF record identifiers and fixed-layout record decoding
//!
//! A BIFF stream is a flat sequence of records, each a 4-byte header
//! (type, payload length) followed by the payload. Field layouts shift
//! between BIFF versions; the helpers here cover the version-dependent
//! records that do not need text decoding.

use crate::ole::binary;
use crate::common::Result;

// Record types shared by BIFF5 and BIFF8 (and, where noted, older versions)
pub const RECORD_DIMENSION_2: u16 = 0x0000;
pub const RECORD_INTEGER_2: u16 = 0x0002;
pub const RECORD_NUMBER_2: u16 = 0x0003;
pub const RECORD_LABEL_2: u16 = 0x0004;
pub const RECORD_BOOLERR_2: u16 = 0x0005;
pub const RECORD_BOF_2: u16 = 0x0009;
pub const RECORD_EOF: u16 = 0x000A;
pub const RECORD_FORMAT_2: u16 = 0x001E;
pub const RECORD_DATEMODE: u16 = 0x0022;
pub const RECORD_FILEPASS: u16 = 0x002F;
pub const RECORD_CONTINUE: u16 = 0x003C;
pub const RECORD_CODEPAGE: u16 = 0x0042;
pub const RECORD_XF_2: u16 = 0x0043;
pub const RECORD_SHEET: u16 = 0x0085;
pub const RECORD_SHEETSOFFSET: u16 = 0x008E;
pub const RECORD_MULRK: u16 = 0x00BD;
pub const RECORD_XF: u16 = 0x00E0;
pub const RECORD_SST: u16 = 0x00FC;
pub const RECORD_LABEL_SST: u16 = 0x00FD;
pub const RECORD_DIMENSION: u16 = 0x0200;
pub const RECORD_NUMBER: u16 = 0x0203;
pub const RECORD_LABEL: u16 = 0x0204;
pub const RECORD_BOOLERR: u16 = 0x0205;
pub const RECORD_BOF_3: u16 = 0x0209;
pub const RECORD_XF_3: u16 = 0x0243;
pub const RECORD_RK: u16 = 0x027E;
pub const RECORD_BOF_4: u16 = 0x0409;
pub const RECORD_FORMAT: u16 = 0x041E;
pub const RECORD_XF_4: u16 = 0x0443;
pub const RECORD_BOF: u16 = 0x0809;

/// BOF version word for BIFF5 and BIFF8 streams
pub const BOF_VERSION_BIFF5: u16 = 0x0500;
pub const BOF_VERSION_BIFF8: u16 = 0x0600;

/// One record as handed out by a record source.
#[derive(Debug, Clone, Copy)]
pub struct BiffRecord<'a> {
    pub record_type: u16,
    /// Stream offset of the record header
    pub offset: u32,
    pub data: &'a [u8],
}

/// BIFF versions supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BiffVersion {
    Biff2 = 2,
    Biff3 = 3,
    Biff4 = 4,
    Biff5 = 5,
    Biff8 = 8,
}

impl BiffVersion {
    /// Version word of a BIFF5/BIFF8 BOF record
    pub fn from_bof_version(version: u16) -> Option<Self> {
        match version {
            BOF_VERSION_BIFF5 => Some(BiffVersion::Biff5),
            BOF_VERSION_BIFF8 => Some(BiffVersion::Biff8),
            _ => None,
        }
    }

    /// Legacy streams carry the version in the BOF record type itself
    pub fn from_legacy_bof(record_type: u16) -> Option<Self> {
        match record_type {
            RECORD_BOF_2 => Some(BiffVersion::Biff2),
            RECORD_BOF_3 => Some(BiffVersion::Biff3),
            RECORD_BOF_4 => Some(BiffVersion::Biff4),
            _ => None,
        }
    }

    /// Largest record payload the version allows (BIFF5/8 only)
    pub fn max_record_size(self) -> Option<u16> {
        match self {
            BiffVersion::Biff5 => Some(2080),
            BiffVersion::Biff8 => Some(8224),
            _ => None,
        }
    }

    #[inline]
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn supports_unicode(self) -> bool {
        matches!(self, BiffVersion::Biff8)
    }

    pub fn is_legacy(self) -> bool {
        self <= BiffVersion::Biff4
    }
}

/// Sheet visibility types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetVisibility {
    Visible,
    Hidden,
    VeryHidden,
}

impl SheetVisibility {
    pub fn from_u8(value: u8) -> Self {
        match value & 0x3 {
            0x00 => SheetVisibility::Visible,
            0x01 => SheetVisibility::Hidden,
            _ => SheetVisibility::VeryHidden,
        }
    }
}

/// Substream types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Worksheet,
    MacroSheet,
    Chart,
    VbModule,
    Unknown(u8),
}

impl SheetKind {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x00 => SheetKind::Worksheet,
            0x01 => SheetKind::MacroSheet,
            0x02 => SheetKind::Chart,
            0x06 => SheetKind::VbModule,
            v => SheetKind::Unknown(v),
        }
    }
}

/// Row and column counts from a DIMENSION record.
///
/// BIFF8 stores the row bound as 32 bits at offset 4 and the column bound
/// at offset 10; earlier versions use 16-bit rows at offset 2 and columns
/// at offset 6. Both bounds are exclusive, so they are the counts.
pub fn parse_dimension(data: &[u8], version: BiffVersion) -> Result<(u32, u16)> {
    if version == BiffVersion::Biff8 {
        Ok((
            binary::read_u32_le(data, 4)?,
            binary::read_u16_le(data, 10)?,
        ))
    } else {
        Ok((
            binary::read_u16_le(data, 2)? as u32,
            binary::read_u16_le(data, 6)?,
        ))
    }
}

/// Row and column of any cell record; every cell layout starts with them.
#[inline]
pub fn cell_position(data: &[u8]) -> Result<(u16, u16)> {
    Ok((binary::read_u16_le(data, 0)?, binary::read_u16_le(data, 2)?))
}

/// Whether a record type carries a cell value in BIFF2-4 streams.
pub fn is_legacy_cell_record(record_type: u16, version: BiffVersion) -> bool {
    match record_type {
        RECORD_INTEGER_2 | RECORD_NUMBER_2 | RECORD_BOOLERR_2 | RECORD_LABEL_2 => {
            version == BiffVersion::Biff2
        },
        RECORD_NUMBER | RECORD_BOOLERR | RECORD_LABEL | RECORD_RK => version != BiffVersion::Biff2,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bof_versions() {
        assert_eq!(BiffVersion::from_bof_version(0x0600), Some(BiffVersion::Biff8));
        assert_eq!(BiffVersion::from_bof_version(0x0500), Some(BiffVersion::Biff5));
        assert_eq!(BiffVersion::from_bof_version(0x0400), None);
        assert_eq!(BiffVersion::from_legacy_bof(0x0409), Some(BiffVersion::Biff4));
        assert_eq!(BiffVersion::from_legacy_bof(0x0809), None);
        assert_eq!(BiffVersion::Biff8.max_record_size(), Some(8224));
        assert_eq!(BiffVersion::Biff5.max_record_size(), Some(2080));
        assert!(BiffVersion::Biff3.is_legacy());
        assert!(!BiffVersion::Biff5.is_legacy());
    }

    #[test]
    fn test_parse_dimension_biff8() {
        let mut data = vec![0u8; 14];
        data[4..8].copy_from_slice(&70000u32.to_le_bytes());
        data[10..12].copy_from_slice(&12u16.to_le_bytes());
        assert_eq!(parse_dimension(&data, BiffVersion::Biff8).unwrap(), (70000, 12));
    }

    #[test]
    fn test_parse_dimension_biff5() {
        let mut data = vec![0u8; 10];
        data[2..4].copy_from_slice(&300u16.to_le_bytes());
        data[6..8].copy_from_slice(&4u16.to_le_bytes());
        assert_eq!(parse_dimension(&data, BiffVersion::Biff5).unwrap(), (300, 4));
        assert!(parse_dimension(&data[..6], BiffVersion::Biff4).is_err());
    }

    #[test]
    fn test_sheet_attributes() {
        assert_eq!(SheetVisibility::from_u8(1), SheetVisibility::Hidden);
        assert_eq!(SheetVisibility::from_u8(2), SheetVisibility::VeryHidden);
        assert_eq!(SheetKind::from_u8(2), SheetKind::Chart);
        assert_eq!(SheetKind::from_u8(9), SheetKind::Unknown(9));
    }

    #[test]
    fn test_legacy_cell_records() {
        assert!(is_legacy_cell_record(RECORD_INTEGER_2, BiffVersion::Biff2));
        assert!(!is_legacy_cell_record(RECORD_RK, BiffVersion::Biff2));
        assert!(is_legacy_cell_record(RECORD_RK, BiffVersion::Biff4));
        assert!(!is_legacy_cell_record(RECORD_NUMBER_2, BiffVersion::Biff3));
    }
}
