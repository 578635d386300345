//! Error type shared by the container, stream and BIFF layers.
use thiserror::Error;

use crate::ole::binary::BinaryError;

/// Main error type for workbook operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A data query was issued against a workbook opened for info only
    #[error("workbook was opened in info-only mode")]
    InvalidHandle,

    /// The path could not be opened
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Reading from the compound file failed or came up short
    #[error("CFBF read error: {0}")]
    CfbfRead(#[source] std::io::Error),

    /// Seeking inside the compound file failed
    #[error("CFBF seek error: {0}")]
    CfbfSeek(#[source] std::io::Error),

    /// The header does not carry the compound file magic
    #[error("invalid CFBF signature")]
    CfbfInvalidSignature,

    /// The header declares a sector shift other than 9 or 12
    #[error("invalid CFBF sector shift: {0}")]
    CfbfInvalidSectorSize(u16),

    /// No FAT sectors could be located
    #[error("empty FAT chain")]
    CfbfEmptyFatChain,

    /// A sector chain points outside the FAT or never terminates
    #[error("illegal FAT entry: {0:#010x}")]
    CfbfIllegalFatEntry(u32),

    /// The mini stream does not match its declared size or layout
    #[error("invalid mini stream")]
    InvalidMiniStream,

    /// A grid or table allocation was refused
    #[error("insufficient memory")]
    InsufficientMemory,

    /// The CODEPAGE record names an unknown codepage, or text precedes it
    #[error("unsupported charset: {0:#06x}")]
    UnsupportedCharset(u16),

    /// A string could not be converted to UTF-8
    #[error("invalid character in string")]
    InvalidCharacter,

    /// The container holds no `Workbook` or `Book` stream
    #[error("workbook stream not found")]
    WorkbookNotFound,

    /// A BOF record was expected but something else was found
    #[error("invalid BOF record")]
    BiffInvalidBof,

    /// The stream uses a BIFF variant that cannot be read
    #[error("unsupported BIFF stream: {0}")]
    BiffUnsupportedVersion(&'static str),

    /// A malformed RK record
    #[error("illegal RK value")]
    IllegalRkValue,

    /// A malformed MULRK record
    #[error("illegal MULRK value")]
    IllegalMulRkValue,

    /// A shared string index outside the SST
    #[error("illegal SST index: {0}")]
    BiffIllegalSstIndex(u32),

    /// A sheet index outside the sheet list
    #[error("illegal sheet index: {0}")]
    IllegalSheetIndex(usize),

    /// No sheet is currently active
    #[error("no worksheet selected")]
    UnselectedSheet,

    /// A row or column outside the active sheet's grid
    #[error("illegal cell position: row {row}, column {col}")]
    IllegalCellRowCol { row: u32, col: u32 },

    /// An unknown info query
    #[error("invalid info argument: {0}")]
    InvalidInfoArgument(String),

    /// A record body shorter than its fixed fields
    #[error("truncated record data: {0}")]
    Truncated(#[from] BinaryError),
}

/// Result type for workbook operations.
pub type Result<T> = std::result::Result<T, Error>;
