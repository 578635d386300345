//! BIFF2, BIFF3 and BIFF4 worksheet files
//!
//! These predate the compound file container: the file is a bare record
//! stream holding a single worksheet. There is no shared string table;
//! text is stored inline in the workbook codepage. Formats are numbered by
//! their position in the stream.

use crate::common::{Error, Result};
use crate::ole::binary::{self, BinaryError};
use crate::ole::stream::{ByteStream, RecordSource};
use crate::ole::xls::book::BookData;
use crate::ole::xls::cell::Cell;
use crate::ole::xls::records::*;
use crate::ole::xls::utils::{DateMode, RkNumber, decode_rk};
use crate::ole::xls::worksheet::Worksheet;

/// Name given to the only sheet of a legacy file
pub const LEGACY_SHEET_NAME: &str = "Worksheet";

/// BIFF version of a bare legacy stream, judged by its first record.
pub(crate) fn detect(data: &[u8]) -> Option<BiffVersion> {
    let record_type = binary::read_u16_le(data, 0).ok()?;
    BiffVersion::from_legacy_bof(record_type)
}

/// Parse a complete BIFF2-4 stream into `book`.
pub(crate) fn parse_legacy(book: &mut BookData, data: &[u8]) -> Result<()> {
    let mut stream = ByteStream::new(data);
    let version = match stream.next_record()? {
        Some(bof) => BiffVersion::from_legacy_bof(bof.record_type),
        None => None,
    }
    .ok_or(Error::BiffInvalidBof)?;

    log::debug!("legacy BIFF{} stream", version.number());
    book.version = Some(version);

    let mut parser = LegacyParser {
        book,
        version,
        next_format: 0,
    };
    parser.run(stream, data.len())
}

struct LegacyParser<'b> {
    book: &'b mut BookData,
    version: BiffVersion,
    /// Index given to the next FORMAT record
    next_format: u16,
}

impl LegacyParser<'_> {
    fn run(&mut self, mut stream: ByteStream<'_>, len: usize) -> Result<()> {
        loop {
            let lookahead = stream.clone();
            let Some(record) = stream.next_record()? else {
                return Err(Error::Truncated(BinaryError {
                    offset: len,
                    needed: 4,
                    available: 0,
                }));
            };
            log::trace!(
                "record 0x{:04X} ({} bytes) at {}",
                record.record_type,
                record.data.len(),
                record.offset
            );
            if is_end_padding(record.record_type, record.data) {
                log::debug!("empty record at {}, treating as end of stream", record.offset);
                return Ok(());
            }

            let data = record.data;
            match record.record_type {
                RECORD_SHEETSOFFSET => {
                    return Err(Error::BiffUnsupportedVersion("BIFF4 workbook"));
                },
                RECORD_EOF => return Ok(()),
                RECORD_CODEPAGE => self.book.set_codepage(binary::read_u16_le(data, 0)?)?,
                RECORD_DATEMODE => {
                    self.book.date_mode = DateMode::from_record(binary::read_u16_le(data, 0)?);
                },
                RECORD_FILEPASS => self.book.obfuscated = true,
                t if self.is_format(t) => self.format(data)?,
                t if self.is_xf(t) => self.xf(data)?,
                t if self.is_dimension(t) => {
                    let (rows, columns) = parse_dimension(data, self.version)?;
                    self.ensure_sheet();
                    self.book.declare_dimensions(rows, columns)?;
                },
                t if is_legacy_cell_record(t, self.version) => {
                    if self.book.active.is_none() {
                        self.infer_dimensions(lookahead)?;
                    }
                    if !self.book.is_info_only() {
                        self.cell(t, data)?;
                    }
                },
                _ => {},
            }
        }
    }

    fn is_format(&self, record_type: u16) -> bool {
        match self.version {
            BiffVersion::Biff2 | BiffVersion::Biff3 => record_type == RECORD_FORMAT_2,
            _ => record_type == RECORD_FORMAT,
        }
    }

    fn is_xf(&self, record_type: u16) -> bool {
        match self.version {
            BiffVersion::Biff2 => record_type == RECORD_XF_2,
            BiffVersion::Biff3 => record_type == RECORD_XF_3,
            _ => record_type == RECORD_XF_4,
        }
    }

    fn is_dimension(&self, record_type: u16) -> bool {
        match self.version {
            BiffVersion::Biff2 => record_type == RECORD_DIMENSION_2,
            _ => record_type == RECORD_DIMENSION,
        }
    }

    fn format(&mut self, data: &[u8]) -> Result<()> {
        let text_at = if self.version == BiffVersion::Biff4 { 2 } else { 0 };
        let len = binary::read_u8(data, text_at)? as usize;
        let mask = self
            .book
            .decode_text(binary::read_bytes(data, text_at + 1, len)?)?;
        self.book.formats.add(self.next_format, &mask);
        self.next_format = self.next_format.wrapping_add(1);
        Ok(())
    }

    fn xf(&mut self, data: &[u8]) -> Result<()> {
        let format_index = if self.version == BiffVersion::Biff2 {
            binary::read_u8(data, 2)? & 0x3F
        } else {
            binary::read_u8(data, 1)?
        };
        self.book.xfs.add(format_index as u16);
        Ok(())
    }

    fn ensure_sheet(&mut self) {
        if self.book.active.is_none() {
            self.book.sheets.push(Worksheet::new(
                LEGACY_SHEET_NAME.to_string(),
                0,
                SheetVisibility::Visible,
                SheetKind::Worksheet,
            ));
            self.book.active = Some(self.book.sheets.len() - 1);
        }
    }

    /// Size the sheet from the cells between `stream` and the EOF record,
    /// for files whose cells come without a DIMENSION record.
    fn infer_dimensions(&mut self, mut stream: ByteStream<'_>) -> Result<()> {
        let (mut max_row, mut max_col) = (0u16, 0u16);
        while let Some(record) = stream.next_record()? {
            if record.record_type == RECORD_EOF
                || is_end_padding(record.record_type, record.data)
            {
                break;
            }
            if is_legacy_cell_record(record.record_type, self.version) {
                let (row, col) = cell_position(record.data)?;
                max_row = max_row.max(row);
                max_col = max_col.max(col);
            }
        }

        log::debug!("no DIMENSION record, cells reach row {} column {}", max_row, max_col);
        self.ensure_sheet();
        self.book
            .declare_dimensions(max_row as u32 + 1, max_col.saturating_add(1))
    }

    fn cell(&mut self, record_type: u16, data: &[u8]) -> Result<()> {
        let biff2 = self.version == BiffVersion::Biff2;
        let (row, col) = cell_position(data)?;

        let cell = match record_type {
            RECORD_INTEGER_2 => {
                let xf = (binary::read_u8(data, 4)? & 0x3F) as u16;
                let value = binary::read_u16_le(data, 7)?;
                self.book.numeric_cell(xf, RkNumber::Int(value as i32))
            },
            RECORD_NUMBER_2 | RECORD_NUMBER => {
                let (xf, value) = if biff2 {
                    ((binary::read_u8(data, 4)? & 0x3F) as u16, binary::read_f64_le(data, 7)?)
                } else {
                    (binary::read_u16_le(data, 4)?, binary::read_f64_le(data, 6)?)
                };
                self.book.numeric_cell(xf, RkNumber::Float(value))
            },
            RECORD_BOOLERR_2 | RECORD_BOOLERR => {
                let value = binary::read_u8(data, if biff2 { 7 } else { 6 })?;
                Cell::Int(i32::from(value != 0))
            },
            RECORD_RK => {
                if data.len() < 10 {
                    return Err(Error::IllegalRkValue);
                }
                let xf = binary::read_u16_le(data, 4)?;
                let rk = binary::read_u32_le(data, 6)?;
                self.book.numeric_cell(xf, decode_rk(rk))
            },
            _ => {
                let len = if biff2 {
                    binary::read_u8(data, 7)? as usize
                } else {
                    binary::read_u16_le(data, 6)? as usize
                };
                Cell::Text(self.book.decode_text(binary::read_bytes(data, 8, len)?)?)
            },
        };
        self.book.store(row as u32, col, cell)
    }
}

/// Zero bytes after the last record read as a type-0 record with no
/// body. A BIFF2 DIMENSION shares type 0 but always carries a body.
fn is_end_padding(record_type: u16, data: &[u8]) -> bool {
    record_type == 0 && data.is_empty()
}
