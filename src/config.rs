//! Options controlling how a workbook is opened.

/// How much of the workbook the parser materializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Parse structure, shared strings and every cell value.
    #[default]
    Full,
    /// Stop after structural metadata: sheet list, dimensions, formats,
    /// XFs and counters. Cell and shared string queries are refused.
    InfoOnly,
}

/// Options for [`Workbook::open_with`](crate::Workbook::open_with) and
/// [`Workbook::from_reader`](crate::Workbook::from_reader).
///
/// # Examples
///
/// ```
/// use freexl::{OpenMode, OpenOptions};
///
/// let options = OpenOptions::new()
///     .with_mode(OpenMode::InfoOnly)
///     .with_max_cells(1 << 20);
/// assert!(options.is_info_only());
/// ```
#[derive(Debug, Clone)]
pub struct OpenOptions {
    /// Full parse or metadata only.
    pub mode: OpenMode,
    /// Upper bound on `rows * columns` for any single sheet grid.
    ///
    /// A DIMENSION record (or inferred extent) above this bound fails the
    /// open with [`Error::InsufficientMemory`](crate::Error::InsufficientMemory).
    pub max_cells: u64,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            mode: OpenMode::Full,
            max_cells: 1 << 32,
        }
    }
}

impl OpenOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a metadata-only open.
    pub fn info_only() -> Self {
        Self::default().with_mode(OpenMode::InfoOnly)
    }

    /// Set the open mode.
    #[inline]
    pub fn with_mode(mut self, mode: OpenMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the per-sheet cell limit.
    #[inline]
    pub fn with_max_cells(mut self, max_cells: u64) -> Self {
        self.max_cells = max_cells;
        self
    }

    #[inline]
    pub fn is_info_only(&self) -> bool {
        self.mode == OpenMode::InfoOnly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = OpenOptions::new();
        assert_eq!(options.mode, OpenMode::Full);
        assert!(!options.is_info_only());
        assert_eq!(options.max_cells, 1 << 32);
    }

    #[test]
    fn test_builder() {
        let options = OpenOptions::info_only().with_max_cells(10);
        assert!(options.is_info_only());
        assert_eq!(options.max_cells, 10);
    }
}
