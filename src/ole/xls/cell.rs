//! Cell representation for XLS files

use std::fmt;

use crate::ole::xls::strings::SharedStrings;

/// One entry of a worksheet grid as stored by the parser.
///
/// Shared strings are kept as an index into the workbook's SST.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    #[default]
    Null,
    Int(i32),
    Double(f64),
    Text(String),
    SharedText(u32),
    Date(String),
    DateTime(String),
    Time(String),
}

impl Cell {
    /// Resolve the cell against the shared string table.
    pub(crate) fn value<'a>(&'a self, sst: &'a SharedStrings) -> CellValue<'a> {
        match self {
            Cell::Null => CellValue::Null,
            Cell::Int(v) => CellValue::Int(*v),
            Cell::Double(v) => CellValue::Double(*v),
            Cell::Text(s) => CellValue::Text(s),
            // Indexes are checked against the SST when the cell is stored
            Cell::SharedText(index) => sst
                .get(*index)
                .map(CellValue::SstText)
                .unwrap_or(CellValue::Null),
            Cell::Date(s) => CellValue::Date(s),
            Cell::DateTime(s) => CellValue::DateTime(s),
            Cell::Time(s) => CellValue::Time(s),
        }
    }
}

/// Discriminant of a [`CellValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Null,
    Int,
    Double,
    Text,
    SstText,
    Date,
    DateTime,
    Time,
}

/// Value of a cell, borrowing its text from the workbook.
///
/// Dates are rendered as `YYYY-MM-DD`, times as `HH:MM:SS` and date-times
/// as `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Null,
    Int(i32),
    Double(f64),
    Text(&'a str),
    /// Text held by the shared string table
    SstText(&'a str),
    Date(&'a str),
    DateTime(&'a str),
    Time(&'a str),
}

impl<'a> CellValue<'a> {
    pub fn kind(&self) -> CellKind {
        match self {
            CellValue::Null => CellKind::Null,
            CellValue::Int(_) => CellKind::Int,
            CellValue::Double(_) => CellKind::Double,
            CellValue::Text(_) => CellKind::Text,
            CellValue::SstText(_) => CellKind::SstText,
            CellValue::Date(_) => CellKind::Date,
            CellValue::DateTime(_) => CellKind::DateTime,
            CellValue::Time(_) => CellKind::Time,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Text of any string-carrying variant, dates and times included
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            CellValue::Text(s)
            | CellValue::SstText(s)
            | CellValue::Date(s)
            | CellValue::DateTime(s)
            | CellValue::Time(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            CellValue::Int(v) => Some(v as f64),
            CellValue::Double(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Int(v) => write!(f, "{}", v),
            CellValue::Double(v) => write!(f, "{}", v),
            CellValue::Text(s)
            | CellValue::SstText(s)
            | CellValue::Date(s)
            | CellValue::DateTime(s)
            | CellValue::Time(s) => f.write_str(s),
        }
    }
}
