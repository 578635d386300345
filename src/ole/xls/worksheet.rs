//! Worksheet implementation for XLS files

use crate::common::{Error, Result};
use crate::ole::xls::cell::Cell;
use crate::ole::xls::records::{SheetKind, SheetVisibility};

/// One BOF-delimited substream listed by a SHEET record, or the single
/// sheet of a BIFF2-4 stream.
///
/// The cell grid is dense and row-major. It is allocated once the
/// dimensions are known, either from a DIMENSION record or from the
/// largest row and column seen while scanning the cells.
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    start_offset: u32,
    visibility: SheetVisibility,
    kind: SheetKind,
    rows: u32,
    columns: u16,
    /// Dimensions are final
    valid_dimension: bool,
    /// Cells were fully loaded in an earlier pass
    already_done: bool,
    cells: Vec<Cell>,
}

impl Worksheet {
    pub(crate) fn new(
        name: String,
        start_offset: u32,
        visibility: SheetVisibility,
        kind: SheetKind,
    ) -> Self {
        Worksheet {
            name,
            start_offset,
            visibility,
            kind,
            rows: 0,
            columns: 0,
            valid_dimension: false,
            already_done: false,
            cells: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Workbook stream offset of the sheet's BOF record
    pub fn start_offset(&self) -> u32 {
        self.start_offset
    }

    pub fn visibility(&self) -> SheetVisibility {
        self.visibility
    }

    pub fn kind(&self) -> SheetKind {
        self.kind
    }

    /// Row and column counts
    pub fn dimensions(&self) -> (u32, u16) {
        (self.rows, self.columns)
    }

    pub(crate) fn has_valid_dimension(&self) -> bool {
        self.valid_dimension
    }

    pub(crate) fn is_already_done(&self) -> bool {
        self.already_done
    }

    pub(crate) fn mark_done(&mut self) {
        self.already_done = true;
    }

    /// Take the counts of a DIMENSION record as final.
    pub(crate) fn set_dimensions(&mut self, rows: u32, columns: u16) {
        self.rows = rows;
        self.columns = columns;
        self.valid_dimension = true;
    }

    /// Fold the position of a cell met before the dimensions are known.
    pub(crate) fn observe(&mut self, row: u32, col: u16) {
        self.rows = self.rows.max(row);
        self.columns = self.columns.max(col);
    }

    /// Turn the largest observed row and column into counts.
    pub(crate) fn promote_observed(&mut self) {
        self.rows = self.rows.saturating_add(1);
        self.columns = self.columns.saturating_add(1);
        self.valid_dimension = true;
    }

    /// Allocate the grid for the current dimensions, every cell Null.
    pub(crate) fn allocate(&mut self, max_cells: u64) -> Result<()> {
        let total = (self.rows as u64)
            .checked_mul(self.columns as u64)
            .filter(|&n| n <= max_cells)
            .ok_or(Error::InsufficientMemory)?;
        let total = usize::try_from(total).map_err(|_| Error::InsufficientMemory)?;

        let mut cells = Vec::new();
        cells
            .try_reserve_exact(total)
            .map_err(|_| Error::InsufficientMemory)?;
        cells.resize(total, Cell::Null);
        self.cells = cells;
        Ok(())
    }

    fn index(&self, row: u32, col: u16) -> Option<usize> {
        if self.cells.is_empty() || row >= self.rows || col >= self.columns {
            return None;
        }
        Some(row as usize * self.columns as usize + col as usize)
    }

    pub(crate) fn set_cell(&mut self, row: u32, col: u16, cell: Cell) -> Result<()> {
        let index = self.index(row, col).ok_or(Error::IllegalCellRowCol {
            row,
            col: col as u32,
        })?;
        self.cells[index] = cell;
        Ok(())
    }

    pub(crate) fn cell(&self, row: u32, col: u16) -> Option<&Cell> {
        self.index(row, col).map(|i| &self.cells[i])
    }
}
