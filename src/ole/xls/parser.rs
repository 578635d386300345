//! BIFF5/BIFF8 workbook stream parser
//!
//! The stream holds a globals substream (codepage, formats, XFs, shared
//! strings and one SHEET record per sheet) followed by one BOF..EOF
//! substream per sheet. Sheets are matched to their substream through the
//! stream offset recorded in the SHEET record.
//!
//! Cells of a sheet without a DIMENSION record cannot be stored on the
//! first read, since the grid size is unknown. Their positions widen the
//! sheet's extent instead, and a second pass over the stream fills in the
//! values once every such sheet has been sized.

use crate::common::{Error, Result};
use crate::ole::binary;
use crate::ole::stream::RecordSource;
use crate::ole::xls::book::BookData;
use crate::ole::xls::cell::Cell;
use crate::ole::xls::records::*;
use crate::ole::xls::strings::{SharedStrings, SstBuilder, read_unicode_string};
use crate::ole::xls::utils::{DateMode, RkNumber, decode_rk};
use crate::ole::xls::worksheet::Worksheet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pass {
    /// Reads the structure and every sheet with known dimensions
    First,
    /// Fills the sheets sized after the first pass
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BofState {
    ExpectingMain,
    InSubstream,
    BetweenSubstreams,
}

pub(crate) struct BiffParser<'b> {
    book: &'b mut BookData,
    pass: Pass,
    state: BofState,
    version: BiffVersion,
    /// Substreams opened inside the current one (charts embedded in a sheet)
    depth: usize,
    prev_record: u16,
    sst: Option<SstBuilder>,
}

impl<'b> BiffParser<'b> {
    pub fn new(book: &'b mut BookData, pass: Pass) -> Self {
        BiffParser {
            book,
            pass,
            state: BofState::ExpectingMain,
            version: BiffVersion::Biff8,
            depth: 0,
            prev_record: 0,
            sst: None,
        }
    }

    /// Parse every record of `source`.
    pub fn run(mut self, source: &mut impl RecordSource) -> Result<()> {
        log::debug!("BIFF parse: {:?} pass", self.pass);
        while let Some(record) = source.next_record()? {
            if record.record_type == 0 && record.data.is_empty() {
                log::debug!("empty record at {}, treating as end of stream", record.offset);
                break;
            }
            self.handle(&record)?;
            if record.record_type != RECORD_CONTINUE {
                self.prev_record = record.record_type;
            }
        }
        self.finish_sst();
        Ok(())
    }

    fn finish_sst(&mut self) {
        if let Some(builder) = self.sst.take() {
            self.book.sst = builder.finish();
            log::debug!("SST: {} strings", self.book.sst.len());
        }
    }

    fn handle(&mut self, record: &BiffRecord<'_>) -> Result<()> {
        log::trace!(
            "record 0x{:04X} ({} bytes) at {}",
            record.record_type,
            record.data.len(),
            record.offset
        );

        match self.state {
            BofState::ExpectingMain => return self.main_bof(record),
            BofState::BetweenSubstreams => return self.substream_bof(record),
            BofState::InSubstream => {},
        }

        if record.record_type != RECORD_CONTINUE {
            self.finish_sst();
        }

        let first = self.pass == Pass::First;
        let data = record.data;
        match record.record_type {
            RECORD_BOF => self.depth += 1,
            RECORD_EOF => {
                if self.depth > 0 {
                    self.depth -= 1;
                } else {
                    self.state = BofState::BetweenSubstreams;
                }
            },
            RECORD_CONTINUE => {
                if self.prev_record == RECORD_SST
                    && let Some(builder) = self.sst.as_mut()
                {
                    builder.continue_with(data)?;
                }
            },
            RECORD_SST if first => {
                if self.book.is_info_only() {
                    self.book.sst = SharedStrings::declared_only(binary::read_u32_le(data, 4)?);
                } else {
                    self.sst = Some(SstBuilder::start(data)?);
                }
            },
            RECORD_CODEPAGE if first => self.book.set_codepage(binary::read_u16_le(data, 0)?)?,
            RECORD_DATEMODE if first => {
                self.book.date_mode = DateMode::from_record(binary::read_u16_le(data, 0)?);
            },
            RECORD_FILEPASS if first => {
                log::debug!("workbook is password protected");
                self.book.obfuscated = true;
            },
            RECORD_SHEET if first => self.sheet(data)?,
            RECORD_FORMAT if first => self.format(data)?,
            RECORD_XF if first => self.book.xfs.add(binary::read_u16_le(data, 2)?),
            RECORD_DIMENSION if first && self.depth == 0 => {
                let (rows, columns) = parse_dimension(data, self.version)?;
                self.book.declare_dimensions(rows, columns)?;
            },
            RECORD_NUMBER | RECORD_BOOLERR | RECORD_RK | RECORD_MULRK | RECORD_LABEL
            | RECORD_LABEL_SST
                if self.depth == 0 =>
            {
                self.cell(record.record_type, data)?;
            },
            _ => {},
        }
        Ok(())
    }

    fn main_bof(&mut self, record: &BiffRecord<'_>) -> Result<()> {
        if record.record_type != RECORD_BOF {
            return Err(Error::BiffInvalidBof);
        }
        let word = binary::read_u16_le(record.data, 0)?;
        self.version = BiffVersion::from_bof_version(word).ok_or(Error::BiffInvalidBof)?;
        if self.pass == Pass::First {
            log::debug!("BIFF{} workbook stream", self.version.number());
            self.book.version = Some(self.version);
        }
        self.state = BofState::InSubstream;
        Ok(())
    }

    /// A sheet substream starts: find the sheet whose SHEET record points
    /// at this BOF.
    fn substream_bof(&mut self, record: &BiffRecord<'_>) -> Result<()> {
        if record.record_type != RECORD_BOF {
            return Err(Error::BiffInvalidBof);
        }
        self.book.active = self
            .book
            .sheets
            .iter()
            .position(|sheet| sheet.start_offset() == record.offset);
        if self.book.active.is_none() {
            log::warn!("substream at {} is not listed by any SHEET record", record.offset);
        }
        self.state = BofState::InSubstream;
        self.depth = 0;
        Ok(())
    }

    fn sheet(&mut self, data: &[u8]) -> Result<()> {
        let start_offset = binary::read_u32_le(data, 0)?;
        let visibility = SheetVisibility::from_u8(binary::read_u8(data, 4)?);
        let kind = SheetKind::from_u8(binary::read_u8(data, 5)?);
        let len = binary::read_u8(data, 6)? as usize;

        let name = if self.version.supports_unicode() {
            read_unicode_string(data, 7, len)?.0
        } else {
            self.book.decode_text(binary::read_bytes(data, 7, len)?)?
        };
        log::debug!("sheet '{}' ({:?}) at {}", name, kind, start_offset);

        self.book
            .sheets
            .push(Worksheet::new(name, start_offset, visibility, kind));
        Ok(())
    }

    fn format(&mut self, data: &[u8]) -> Result<()> {
        let index = binary::read_u16_le(data, 0)?;
        let mask = if self.version.supports_unicode() {
            let cch = binary::read_u16_le(data, 2)? as usize;
            read_unicode_string(data, 4, cch)?.0
        } else {
            let len = binary::read_u8(data, 2)? as usize;
            self.book.decode_text(binary::read_bytes(data, 3, len)?)?
        };
        self.book.formats.add(index, &mask);
        Ok(())
    }

    fn cell(&mut self, record_type: u16, data: &[u8]) -> Result<()> {
        match record_type {
            RECORD_RK if data.len() < 10 => return Err(Error::IllegalRkValue),
            RECORD_MULRK if data.len() < 6 || (data.len() - 6) % 6 != 0 => {
                return Err(Error::IllegalMulRkValue);
            },
            _ => {},
        }

        let (row, col) = cell_position(data)?;
        let row = row as u32;

        if record_type == RECORD_MULRK {
            let count = (data.len() - 6) / 6;
            if count == 0 {
                return Err(Error::IllegalMulRkValue);
            }
            let last_col = col.saturating_add((count - 1) as u16);
            if !self.book.admit_cells(row, col, last_col) {
                return Ok(());
            }
            for i in 0..count {
                let offset = 4 + i * 6;
                let xf = binary::read_u16_le(data, offset)?;
                let rk = binary::read_u32_le(data, offset + 2)?;
                let cell = self.book.numeric_cell(xf, decode_rk(rk));
                self.book.store(row, col.saturating_add(i as u16), cell)?;
            }
            return Ok(());
        }

        if !self.book.admit_cells(row, col, col) {
            return Ok(());
        }

        let cell = match record_type {
            RECORD_NUMBER => {
                let xf = binary::read_u16_le(data, 4)?;
                let value = binary::read_f64_le(data, 6)?;
                self.book.numeric_cell(xf, RkNumber::Float(value))
            },
            RECORD_RK => {
                let xf = binary::read_u16_le(data, 4)?;
                let rk = binary::read_u32_le(data, 6)?;
                self.book.numeric_cell(xf, decode_rk(rk))
            },
            RECORD_BOOLERR => Cell::Int(i32::from(binary::read_u8(data, 6)? != 0)),
            RECORD_LABEL => {
                let len = binary::read_u16_le(data, 6)? as usize;
                let text = if self.version.supports_unicode() {
                    read_unicode_string(data, 8, len)?.0
                } else {
                    self.book.decode_text(binary::read_bytes(data, 8, len)?)?
                };
                Cell::Text(text)
            },
            _ => {
                let index = binary::read_u32_le(data, 6)?;
                if self.book.sst.get(index).is_none() {
                    return Err(Error::BiffIllegalSstIndex(index));
                }
                Cell::SharedText(index)
            },
        };
        self.book.store(row, col, cell)
    }
}

/// Close the first pass: sheets without a DIMENSION record take the extent
/// of the cells seen, the others are complete.
///
/// Returns whether a second pass is needed to fill the newly sized sheets.
pub(crate) fn settle_dimensions(book: &mut BookData) -> Result<bool> {
    let info_only = book.is_info_only();
    let max_cells = book.options.max_cells;
    let mut second_pass = false;

    for sheet in &mut book.sheets {
        if sheet.has_valid_dimension() {
            sheet.mark_done();
            continue;
        }
        sheet.promote_observed();
        let (rows, columns) = sheet.dimensions();
        log::debug!("sheet '{}' has no DIMENSION, inferred {} x {}", sheet.name(), rows, columns);
        if !info_only {
            sheet.allocate(max_cells)?;
            second_pass = true;
        }
    }

    Ok(second_pass)
}
