//! Table grids embedded as paragraph content

use super::paragraph::Paragraph;
use super::style::{CharStyleId, ParaStyleId};
use serde::{Deserialize, Serialize};

/// A single cell of a table grid
///
/// `(row, col)` addresses the origin; merged regions are recorded as spans on
/// the origin cell and covered positions hold no cell of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub row: u32,
    pub col: u32,
    pub row_span: u32,
    pub col_span: u32,

    /// Cell content; never empty
    pub paragraphs: Vec<Paragraph>,
}

impl TableCell {
    pub fn new(row: u32, col: u32, paragraphs: Vec<Paragraph>) -> Self {
        Self {
            row,
            col,
            row_span: 1,
            col_span: 1,
            paragraphs,
        }
    }
}

/// A grid with declared row/column counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub rows: u32,
    pub cols: u32,
    pub cells: Vec<TableCell>,

    /// Per-column widths in HWPUNIT, when declared
    pub col_widths: Option<Vec<u32>>,
}

impl Table {
    /// Fully populated grid of single-empty-paragraph cells
    pub fn new(rows: u32, cols: u32, para_style: ParaStyleId, char_style: CharStyleId) -> Self {
        let mut cells = Vec::with_capacity((rows * cols) as usize);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(TableCell::new(
                    row,
                    col,
                    vec![Paragraph::empty(para_style, char_style)],
                ));
            }
        }
        Self {
            rows,
            cols,
            cells,
            col_widths: None,
        }
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&TableCell> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }

    pub fn cell_mut(&mut self, row: u32, col: u32) -> Option<&mut TableCell> {
        self.cells.iter_mut().find(|c| c.row == row && c.col == col)
    }

    /// Check full, non-overlapping coverage of the declared grid
    pub fn validate_grid(&self) -> Result<(), String> {
        if self.rows == 0 || self.cols == 0 {
            return Err(format!("declared size {}x{} is degenerate", self.rows, self.cols));
        }
        if let Some(widths) = &self.col_widths {
            if widths.len() != self.cols as usize {
                return Err(format!(
                    "{} column widths declared for {} columns",
                    widths.len(),
                    self.cols
                ));
            }
        }

        let mut covered = vec![false; (self.rows * self.cols) as usize];
        for cell in &self.cells {
            if cell.row_span == 0 || cell.col_span == 0 {
                return Err(format!("cell ({}, {}) has a zero span", cell.row, cell.col));
            }
            if cell.row + cell.row_span > self.rows || cell.col + cell.col_span > self.cols {
                return Err(format!(
                    "cell ({}, {}) span {}x{} exceeds the grid",
                    cell.row, cell.col, cell.row_span, cell.col_span
                ));
            }
            if cell.paragraphs.is_empty() {
                return Err(format!("cell ({}, {}) has no paragraphs", cell.row, cell.col));
            }
            for r in cell.row..cell.row + cell.row_span {
                for c in cell.col..cell.col + cell.col_span {
                    let slot = &mut covered[(r * self.cols + c) as usize];
                    if *slot {
                        return Err(format!("position ({}, {}) is covered twice", r, c));
                    }
                    *slot = true;
                }
            }
        }
        if let Some(idx) = covered.iter().position(|c| !c) {
            let (r, c) = (idx as u32 / self.cols, idx as u32 % self.cols);
            return Err(format!("position ({}, {}) is not covered by any cell", r, c));
        }
        Ok(())
    }
}
