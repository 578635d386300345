//! Legacy Excel (.xls) workbook reader
//!
//! BIFF5 and BIFF8 workbooks are read from the `Workbook` (or `Book`)
//! stream of a compound file; BIFF2, BIFF3 and BIFF4 files are bare record
//! streams. Parsing happens once, at open time, and every query afterwards
//! is answered from memory.

/// BIFF record types and fixed-layout record bodies
pub(crate) mod records;

/// Workbook state shared by the parsers
mod book;

/// Cell storage and the values handed to callers
mod cell;

/// FORMAT and XF tables used to recognize dates and times
mod format;

/// BIFF5/BIFF8 record parser
mod parser;

/// BIFF2-4 stream parser
mod legacy;

/// Shared string table and unicode string decoding
mod strings;

/// RK numbers, serial dates and cell references
mod utils;

/// Public workbook handle
mod workbook;

mod worksheet;

pub use cell::{CellKind, CellValue};
pub use legacy::LEGACY_SHEET_NAME;
pub use records::{BiffVersion, SheetKind, SheetVisibility};
pub use utils::{DateMode, cell_reference, column_index_to_name};
pub use workbook::{CfbfVersion, Info, InfoKind, Password, StreamKind, Workbook};
pub use worksheet::Worksheet;
