//! FreeXL - read-only access to legacy Microsoft Excel workbooks
//!
//! This library extracts sheet names, dimensions and cell values from
//! `.xls` files written by Excel 2.x through Excel 2003.
//!
//! # Features
//!
//! - **CFBF container**: version 3 and 4 compound files, FAT and miniFAT
//!   chains, DIFAT sectors
//! - **BIFF8 and BIFF5**: workbooks stored in the `Workbook` or `Book` stream
//! - **BIFF2 to BIFF4**: bare record streams, read as a single worksheet
//! - **Codepages**: Windows, DOS/OEM and Mac single-byte encodings, CJK
//!   double-byte encodings and UTF-16
//! - **Dates and times**: numbers formatted as dates are rendered as
//!   `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or `HH:MM:SS`
//! - **Info-only mode**: metadata queries without loading any cells
//!
//! # Example - Reading every cell
//!
//! ```no_run
//! use freexl::{CellValue, Workbook};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut workbook = Workbook::open("inventory.xls")?;
//!
//! for index in 0..workbook.sheet_count() {
//!     workbook.select_active_worksheet(index)?;
//!     let (rows, columns) = workbook.worksheet_dimensions()?;
//!     println!("sheet {}: {} rows, {} columns", workbook.worksheet_name(index)?, rows, columns);
//!
//!     for row in 0..rows {
//!         for col in 0..columns {
//!             match workbook.cell(row, col)? {
//!                 CellValue::Null => {},
//!                 CellValue::Double(v) => println!("{} {}: {}", row, col, v),
//!                 other => println!("{} {}: {}", row, col, other),
//!             }
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Metadata only
//!
//! ```no_run
//! use freexl::{InfoKind, Workbook};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let workbook = Workbook::open_info("inventory.xls")?;
//! for kind in InfoKind::ALL {
//!     println!("{}: {}", kind.name(), workbook.info(kind));
//! }
//! # Ok(())
//! # }
//! ```

/// Error type and shared infrastructure
pub mod common;

/// Open-time options
pub mod config;

/// Compound file container and the BIFF workbook reader
pub mod ole;

pub use common::{Error, Result};
pub use config::{OpenMode, OpenOptions};
pub use ole::codepage::Codepage;
pub use ole::xls::{
    BiffVersion, CellKind, CellValue, CfbfVersion, DateMode, Info, InfoKind, Password, SheetKind,
    SheetVisibility, StreamKind, Workbook, Worksheet,
};
