//! Board representation: a row-major grid of cells plus Factory annotations.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::building::{BuildingKind, ParseNameError};
use crate::resource::Resource;

/// Reference board size.
pub const DEFAULT_ROWS: usize = 4;
pub const DEFAULT_COLS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid dimensions must be positive (got {rows}x{cols})")]
    ZeroSized { rows: usize, cols: usize },
    #[error("grid {rows}x{cols} needs {expected} cells, got {got}")]
    CellCount {
        rows: usize,
        cols: usize,
        expected: usize,
        got: usize,
    },
    #[error("cell index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },
}

/// Contents of one grid square.
///
/// Serialized as `null`, a resource name or a building name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Option<String>", into = "Option<String>")]
pub enum Cell {
    #[default]
    Empty,
    Resource(Resource),
    Building(BuildingKind),
}

impl Cell {
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn resource(self) -> Option<Resource> {
        match self {
            Cell::Resource(r) => Some(r),
            _ => None,
        }
    }

    pub fn building(self) -> Option<BuildingKind> {
        match self {
            Cell::Building(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cell::Empty => ".",
            Cell::Resource(r) => r.name(),
            Cell::Building(b) => b.name(),
        };
        f.pad(name)
    }
}

impl TryFrom<Option<String>> for Cell {
    type Error = ParseNameError;

    fn try_from(value: Option<String>) -> Result<Self, Self::Error> {
        let Some(s) = value else {
            return Ok(Cell::Empty);
        };
        if let Ok(r) = s.parse::<Resource>() {
            return Ok(Cell::Resource(r));
        }
        if let Ok(b) = s.parse::<BuildingKind>() {
            return Ok(Cell::Building(b));
        }
        Err(ParseNameError::Cell(s))
    }
}

impl From<Cell> for Option<String> {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Empty => None,
            Cell::Resource(r) => Some(r.name().to_string()),
            Cell::Building(b) => Some(b.name().to_string()),
        }
    }
}

/// Resource a Factory was stocked with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryStock {
    pub resource: Resource,
    #[serde(default = "default_stock_count")]
    pub count: u32,
}

fn default_stock_count() -> u32 {
    1
}

/// Sparse grid index -> Factory stock. Entries at non-Factory cells are ignored.
pub type FactoryAnnotations = BTreeMap<usize, FactoryStock>;

/// Unvalidated serde form of a [`Grid`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridRepr {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Cell>,
}

/// Row-major `rows x cols` board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridRepr", into = "GridRepr")]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl TryFrom<GridRepr> for Grid {
    type Error = GridError;

    fn try_from(r: GridRepr) -> Result<Self, Self::Error> {
        Grid::from_cells(r.rows, r.cols, r.cells)
    }
}

impl From<Grid> for GridRepr {
    fn from(g: Grid) -> Self {
        GridRepr {
            rows: g.rows,
            cols: g.cols,
            cells: g.cells,
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            cells: vec![Cell::Empty; DEFAULT_ROWS * DEFAULT_COLS],
        }
    }
}

impl Grid {
    /// An all-empty grid.
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        Self::from_cells(rows, cols, vec![Cell::Empty; rows * cols])
    }

    pub fn from_cells(rows: usize, cols: usize, cells: Vec<Cell>) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::ZeroSized { rows, cols });
        }
        if cells.len() != rows * cols {
            return Err(GridError::CellCount {
                rows,
                cols,
                expected: rows * cols,
                got: cells.len(),
            });
        }
        Ok(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub fn set(&mut self, index: usize, cell: Cell) -> Result<(), GridError> {
        let len = self.cells.len();
        let slot = self
            .cells
            .get_mut(index)
            .ok_or(GridError::OutOfRange { index, len })?;
        *slot = cell;
        Ok(())
    }

    /// `(row, col)` of a flat index.
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    pub fn index_of(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then_some(row * self.cols + col)
    }

    /// In-bounds orthogonal neighbors of `index` (up, down, left, right).
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let (row, col) = self.position(index);
        let up = row.checked_sub(1).and_then(|r| self.index_of(r, col));
        let down = self.index_of(row + 1, col);
        let left = col.checked_sub(1).and_then(|c| self.index_of(row, c));
        let right = self.index_of(row, col + 1);
        [up, down, left, right].into_iter().flatten()
    }

    /// Indices of every cell sharing `index`'s row or column (including itself).
    pub fn lines_through(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let (row, col) = self.position(index);
        let row_cells = (0..self.cols).map(move |c| row * self.cols + c);
        let col_cells = (0..self.rows).map(move |r| r * self.cols + col);
        row_cells.chain(col_cells)
    }

    pub fn count_building(&self, kind: BuildingKind) -> usize {
        self.cells
            .iter()
            .filter(|c| c.building() == Some(kind))
            .count()
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_empty()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            let line: Vec<String> = row.iter().map(|c| format!("{c:<9}")).collect();
            writeln!(f, "{}", line.join(" ").trim_end())?;
        }
        Ok(())
    }
}
