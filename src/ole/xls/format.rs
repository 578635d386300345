//! Number format and XF tables
//!
//! Only one property of a number format matters to the reader: whether it
//! renders a serial number as a date, a time or both. FORMAT records are
//! classified as they are read; XF records map a cell's XF index to the
//! format index it uses.

/// How a numeric cell is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeKind {
    Date,
    DateTime,
    Time,
}

/// Stored FORMAT entries
pub const MAX_FORMATS: usize = 2048;
/// Stored XF entries
pub const MAX_XFS: usize = 8192;

/// Built-in BIFF5/BIFF8 format codes that render dates or times
pub fn builtin_format(index: u16) -> Option<DateTimeKind> {
    match index {
        14..=17 => Some(DateTimeKind::Date),
        18..=21 | 45..=47 => Some(DateTimeKind::Time),
        22 => Some(DateTimeKind::DateTime),
        _ => None,
    }
}

/// Classify a format mask by the date and time tokens it contains.
///
/// Tokens are counted case-insensitively. A mask with year, month, day and
/// hour is a date-time; year+month or month+day is a date; hour+minute or
/// minute+second is a time. `m` is ambiguous between month and minute and
/// counts toward both.
pub fn classify_format_mask(mask: &str) -> Option<DateTimeKind> {
    let (mut y, mut m, mut d, mut h, mut s) = (false, false, false, false, false);
    for c in mask.chars() {
        match c.to_ascii_lowercase() {
            'y' => y = true,
            'm' => m = true,
            'd' => d = true,
            'h' => h = true,
            's' => s = true,
            _ => {},
        }
    }

    if y && m && d && h {
        Some(DateTimeKind::DateTime)
    } else if (y && m) || (m && d) {
        Some(DateTimeKind::Date)
    } else if (h && m) || (m && s) {
        Some(DateTimeKind::Time)
    } else {
        None
    }
}

/// FORMAT records seen so far; only date and time formats are kept.
#[derive(Debug, Clone, Default)]
pub struct FormatTable {
    entries: Vec<(u16, DateTimeKind)>,
    count: usize,
}

impl FormatTable {
    /// Record one FORMAT record.
    pub fn add(&mut self, index: u16, mask: &str) {
        self.count += 1;
        if let Some(kind) = classify_format_mask(mask)
            && self.entries.len() < MAX_FORMATS
        {
            self.entries.push((index, kind));
        }
    }

    /// Number of FORMAT records read
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn lookup(&self, index: u16) -> Option<DateTimeKind> {
        self.entries
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, kind)| *kind)
    }
}

/// XF records in file order: each maps to a format index
#[derive(Debug, Clone, Default)]
pub struct XfTable {
    formats: Vec<u16>,
    count: usize,
}

impl XfTable {
    pub fn add(&mut self, format_index: u16) {
        self.count += 1;
        if self.formats.len() < MAX_XFS {
            self.formats.push(format_index);
        }
    }

    /// Number of XF records read
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn format_index(&self, xf_index: u16) -> Option<u16> {
        self.formats.get(xf_index as usize).copied()
    }
}

/// Date/time rendering of the cell format `xf_index`.
///
/// Built-in codes only apply to BIFF5/BIFF8; legacy streams number their
/// formats by position and rely on the FORMAT table alone.
pub fn classify(
    xfs: &XfTable,
    formats: &FormatTable,
    xf_index: u16,
    builtins: bool,
) -> Option<DateTimeKind> {
    let format_index = xfs.format_index(xf_index)?;
    if builtins && let Some(kind) = builtin_format(format_index) {
        return Some(kind);
    }
    formats.lookup(format_index)
}
