//! Numeric and temporal decoding for XLS cell values

use chrono::{Datelike, NaiveDate};

/// Number carried by an RK value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RkNumber {
    Int(i32),
    Float(f64),
}

/// Decode an RK value
///
/// RK values pack a number into 32 bits. Bit 1 selects a 30-bit signed
/// integer (the value shifted right by two) over a truncated double (the
/// remaining 30 bits become the high bits of an IEEE-754 double whose low
/// 32 bits are zero). Bit 0 divides the result by 100; a divided integer
/// is reported as a float.
///
/// The float form keeps 18 of the 52 mantissa bits, so it carries a
/// relative error below 2^-18 against the double it was made from.
pub fn decode_rk(rk: u32) -> RkNumber {
    let div100 = rk & 0x01 != 0;
    if rk & 0x02 != 0 {
        let int_val = (rk as i32) >> 2;
        if div100 {
            RkNumber::Float(int_val as f64 / 100.0)
        } else {
            RkNumber::Int(int_val)
        }
    } else {
        let value = f64::from_bits(((rk & 0xFFFF_FFFC) as u64) << 32);
        RkNumber::Float(if div100 { value / 100.0 } else { value })
    }
}

/// Workbook epoch, set by the DATEMODE record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateMode {
    /// Serial 1 is 1900-01-01
    #[default]
    Date1900,
    /// Serial 1 is 1904-01-02
    Date1904,
}

impl DateMode {
    pub fn from_record(value: u16) -> Self {
        if value == 0 {
            DateMode::Date1900
        } else {
            DateMode::Date1904
        }
    }
}

/// Calendar date produced from an Excel serial number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Days in a four-year block when every fourth year is a leap year
const DAYS_PER_BLOCK: i64 = 4 * 365 + 1;

/// Date for an Excel serial day number.
///
/// Serial 1 is the epoch itself; serials at or below 1 all map to it. The
/// calendar treats every year divisible by four as a leap year, so 1900
/// has a February 29th (serial 60) and so do 2100, 2200 and 2300. Both
/// epoch years open a four-year block. Returns `None` when the year does
/// not fit.
pub fn compute_date(mode: DateMode, serial: i64) -> Option<SerialDate> {
    let offset = serial.max(1) - 1;
    let (epoch, ordinal) = match mode {
        DateMode::Date1900 => (1900i64, offset),
        DateMode::Date1904 => (1904i64, offset.checked_add(1)?),
    };
    let blocks = ordinal / DAYS_PER_BLOCK;
    let mut day = ordinal % DAYS_PER_BLOCK;
    let mut year = epoch.checked_add(blocks.checked_mul(4)?)?;
    let mut leap = true;
    loop {
        let len = if leap { 366 } else { 365 };
        if day < len {
            break;
        }
        day -= len;
        year += 1;
        leap = false;
    }
    // Month and day within a year of the right length
    let proxy = NaiveDate::from_yo_opt(if leap { 2000 } else { 2001 }, day as u32 + 1)?;
    Some(SerialDate {
        year: i32::try_from(year).ok()?,
        month: proxy.month(),
        day: proxy.day(),
    })
}

/// Hours, minutes and seconds of a day fraction, rounded to the second.
pub fn compute_time(fraction: f64) -> (i64, i64, i64) {
    let secs = (fraction * 86400.0).round() as i64;
    (secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// `YYYY-MM-DD` for a serial day number
pub fn format_date(mode: DateMode, serial: i64) -> Option<String> {
    let date = compute_date(mode, serial)?;
    Some(format!("{:04}-{:02}-{:02}", date.year, date.month, date.day))
}

/// `HH:MM:SS` for a day fraction
pub fn format_time(fraction: f64) -> String {
    let (h, m, s) = compute_time(fraction);
    format!("{:02}:{:02}:{:02}", h, m, s)
}

/// `YYYY-MM-DD HH:MM:SS` for a fractional serial number
pub fn format_datetime(mode: DateMode, value: f64) -> Option<String> {
    let days = value.floor();
    Some(format!(
        "{} {}",
        format_date(mode, days as i64)?,
        format_time(value - days)
    ))
}

/// Convert column number to Excel column name (A, B, ..., Z, AA, AB, etc.)
pub fn column_index_to_name(mut col: u32) -> String {
    let mut name = String::new();

    while col > 0 {
        col -= 1; // Make 0-based
        let ch = (b'A' + (col % 26) as u8) as char;
        name.insert(0, ch);
        col /= 26;
    }

    name
}

/// Convert row and column to Excel cell reference (e.g., "A1", "B2")
pub fn cell_reference(row: u32, col: u32) -> String {
    format!("{}{}", column_index_to_name(col + 1), row + 1)
}
