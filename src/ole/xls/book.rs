//! Workbook state accumulated while parsing

use crate::common::{Error, Result};
use crate::config::OpenOptions;
use crate::ole::codepage::{Codepage, TextDecoder};
use crate::ole::xls::cell::Cell;
use crate::ole::xls::format::{self, DateTimeKind, FormatTable, XfTable};
use crate::ole::xls::records::BiffVersion;
use crate::ole::xls::strings::SharedStrings;
use crate::ole::xls::utils::{self, DateMode, RkNumber};
use crate::ole::xls::worksheet::Worksheet;

/// Everything the BIFF parsers learn about a workbook.
#[derive(Debug, Default)]
pub(crate) struct BookData {
    pub options: OpenOptions,
    pub version: Option<BiffVersion>,
    /// Decoder for byte strings, set by CODEPAGE
    pub decoder: Option<TextDecoder>,
    pub date_mode: DateMode,
    pub obfuscated: bool,
    pub sheets: Vec<Worksheet>,
    pub active: Option<usize>,
    pub sst: SharedStrings,
    pub formats: FormatTable,
    pub xfs: XfTable,
}

impl BookData {
    pub fn new(options: &OpenOptions) -> Self {
        BookData {
            options: options.clone(),
            ..Default::default()
        }
    }

    pub fn is_info_only(&self) -> bool {
        self.options.is_info_only()
    }

    pub fn codepage(&self) -> Option<Codepage> {
        self.decoder.as_ref().map(TextDecoder::codepage)
    }

    pub fn set_codepage(&mut self, code: u16) -> Result<()> {
        let decoder = TextDecoder::for_biff_codepage(code)?;
        log::debug!("codepage {} ({})", code, decoder.codepage().name());
        self.decoder = Some(decoder);
        Ok(())
    }

    /// Decode a byte string in the workbook codepage.
    pub fn decode_text(&self, bytes: &[u8]) -> Result<String> {
        self.decoder
            .as_ref()
            .ok_or(Error::UnsupportedCharset(0))?
            .decode(bytes)
    }

    pub fn active_sheet(&self) -> Option<&Worksheet> {
        self.active.and_then(|i| self.sheets.get(i))
    }

    pub fn active_sheet_mut(&mut self) -> Option<&mut Worksheet> {
        self.active.and_then(|i| self.sheets.get_mut(i))
    }

    /// Size the active sheet from a DIMENSION record.
    pub fn declare_dimensions(&mut self, rows: u32, columns: u16) -> Result<()> {
        let max_cells = self.options.max_cells;
        let info_only = self.is_info_only();
        let Some(sheet) = self.active_sheet_mut() else {
            log::warn!("DIMENSION outside any known sheet");
            return Ok(());
        };
        sheet.set_dimensions(rows, columns);
        if !info_only {
            sheet.allocate(max_cells)?;
        }
        log::debug!("sheet '{}': {} x {}", sheet.name(), rows, columns);
        Ok(())
    }

    /// Whether a cell record at `row`, `first_col..=last_col` should be
    /// decoded and stored.
    ///
    /// Sheets loaded by an earlier pass ignore their cells; sheets without
    /// final dimensions only widen them.
    pub fn admit_cells(&mut self, row: u32, first_col: u16, last_col: u16) -> bool {
        let info_only = self.is_info_only();
        match self.active_sheet_mut() {
            Some(sheet) if sheet.is_already_done() => false,
            Some(sheet) if !sheet.has_valid_dimension() => {
                sheet.observe(row, first_col.max(last_col));
                false
            },
            _ => !info_only,
        }
    }

    pub fn store(&mut self, row: u32, col: u16, cell: Cell) -> Result<()> {
        match self.active_sheet_mut() {
            Some(sheet) => sheet.set_cell(row, col, cell),
            None => Err(Error::IllegalCellRowCol {
                row,
                col: col as u32,
            }),
        }
    }

    fn date_kind(&self, xf_index: u16) -> Option<DateTimeKind> {
        let builtins = self.version.is_some_and(|v| !v.is_legacy());
        format::classify(&self.xfs, &self.formats, xf_index, builtins)
    }

    /// Render a number through the date and time formats of its XF.
    ///
    /// Serials outside the calendar stay numbers.
    pub fn numeric_cell(&self, xf_index: u16, value: RkNumber) -> Cell {
        let Some(kind) = self.date_kind(xf_index) else {
            return plain_number(value);
        };
        let mode = self.date_mode;
        let serial = match value {
            RkNumber::Int(n) => n as f64,
            RkNumber::Float(v) => v,
        };
        let rendered = match kind {
            DateTimeKind::Date => utils::format_date(mode, serial.floor() as i64).map(Cell::Date),
            DateTimeKind::DateTime => utils::format_datetime(mode, serial).map(Cell::DateTime),
            DateTimeKind::Time => Some(Cell::Time(utils::format_time(serial - serial.floor()))),
        };
        rendered.unwrap_or_else(|| plain_number(value))
    }
}

fn plain_number(value: RkNumber) -> Cell {
    match value {
        RkNumber::Int(n) => Cell::Int(n),
        RkNumber::Float(v) => Cell::Double(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::xls::records::{SheetKind, SheetVisibility};

    fn book_with_sheet() -> BookData {
        let mut book = BookData::new(&OpenOptions::default());
        book.version = Some(BiffVersion::Biff8);
        book.sheets.push(Worksheet::new(
            "Sheet1".into(),
            0,
            SheetVisibility::Visible,
            SheetKind::Worksheet,
        ));
        book.active = Some(0);
        book
    }

    #[test]
    fn test_numeric_cell_date_kinds() {
        let mut book = book_with_sheet();
        book.xfs.add(0);
        book.xfs.add(14);
        book.xfs.add(22);
        book.xfs.add(20);

        assert_eq!(book.numeric_cell(0, RkNumber::Int(5)), Cell::Int(5));
        assert_eq!(
            book.numeric_cell(1, RkNumber::Int(2)),
            Cell::Date("1900-01-02".into())
        );
        assert_eq!(
            book.numeric_cell(1, RkNumber::Float(36526.75)),
            Cell::Date("2000-01-01".into())
        );
        assert_eq!(
            book.numeric_cell(2, RkNumber::Int(36526)),
            Cell::DateTime("2000-01-01 00:00:00".into())
        );
        assert_eq!(
            book.numeric_cell(2, RkNumber::Float(36526.5)),
            Cell::DateTime("2000-01-01 12:00:00".into())
        );
        assert_eq!(
            book.numeric_cell(3, RkNumber::Float(1.25)),
            Cell::Time("06:00:00".into())
        );
        assert_eq!(book.numeric_cell(9, RkNumber::Float(2.5)), Cell::Double(2.5));
        assert_eq!(
            book.numeric_cell(1, RkNumber::Float(1e300)),
            Cell::Double(1e300)
        );
    }

    #[test]
    fn test_admit_cells_folds_undeclared_dimensions() {
        let mut book = book_with_sheet();
        assert!(!book.admit_cells(3, 1, 4));
        assert_eq!(book.sheets[0].dimensions(), (3, 4));

        book.declare_dimensions(10, 10).unwrap();
        assert!(book.admit_cells(0, 0, 0));
        book.sheets[0].mark_done();
        assert!(!book.admit_cells(0, 0, 0));
    }

    #[test]
    fn test_store_without_sheet() {
        let mut book = BookData::new(&OpenOptions::default());
        assert!(matches!(
            book.store(1, 2, Cell::Int(0)),
            Err(Error::IllegalCellRowCol { row: 1, col: 2 })
        ));
    }

    #[test]
    fn test_decode_text_needs_codepage() {
        let mut book = BookData::new(&OpenOptions::default());
        assert!(matches!(
            book.decode_text(b"abc"),
            Err(Error::UnsupportedCharset(_))
        ));
        book.set_codepage(0x04E4).unwrap();
        assert_eq!(book.decode_text(b"abc").unwrap(), "abc");
    }
}
