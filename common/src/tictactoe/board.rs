use crate::tictactoe::player::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const BOARD_SIZE: usize = 9;

// Every row, column and diagonal, indexed row-major from the top left cell
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Error, Debug, PartialEq)]
pub enum BoardError {
    #[error("Cell index {0} is outside the 9 cell board")]
    OutOfBounds(usize),
    #[error("Cell {index} is already taken by {symbol}")]
    Occupied { index: usize, symbol: Symbol },
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Cell {
    #[default]
    Empty,
    Marked(Symbol),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn symbol(&self) -> Option<Symbol> {
        match self {
            Cell::Empty => None,
            Cell::Marked(symbol) => Some(*symbol),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellIndex(usize);

impl CellIndex {
    pub fn new(index: usize) -> Result<Self, BoardError> {
        if index >= BOARD_SIZE {
            return Err(BoardError::OutOfBounds(index));
        }
        Ok(CellIndex(index))
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Board([Cell; BOARD_SIZE]);

impl Board {
    pub fn new(cells: [Cell; BOARD_SIZE]) -> Self {
        Board(cells)
    }

    pub fn cells(&self) -> &[Cell; BOARD_SIZE] {
        &self.0
    }

    pub fn cell(&self, index: CellIndex) -> Cell {
        self.0[index.get()]
    }

    pub fn is_empty_at(&self, index: CellIndex) -> bool {
        self.cell(index).is_empty()
    }

    // A marked cell is never overwritten, even with the same symbol
    pub fn place(&mut self, index: CellIndex, symbol: Symbol) -> Result<(), BoardError> {
        if let Cell::Marked(taken_by) = self.cell(index) {
            return Err(BoardError::Occupied {
                index: index.get(),
                symbol: taken_by,
            });
        }
        self.0[index.get()] = Cell::Marked(symbol);
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.0.iter().all(|c| !c.is_empty())
    }

    pub fn count_marked(&self) -> usize {
        self.0.iter().filter(|c| !c.is_empty()).count()
    }

    pub fn count_symbol(&self, symbol: Symbol) -> usize {
        self.0.iter().filter(|c| c.symbol() == Some(symbol)).count()
    }

    // Returns the symbol of the first line fully occupied by a single symbol
    pub fn line_owner(&self) -> Option<Symbol> {
        LINES.iter().find_map(|line| {
            let first = self.0[line[0]].symbol()?;
            line.iter()
                .all(|&idx| self.0[idx].symbol() == Some(first))
                .then_some(first)
        })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row_idx, row) in self.0.chunks(3).enumerate() {
            if row_idx > 0 {
                writeln!(f, "---+---+---")?;
            }
            let row: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(col_idx, cell)| match cell {
                    Cell::Empty => format!(" {} ", row_idx * 3 + col_idx),
                    Cell::Marked(symbol) => format!(" {} ", symbol),
                })
                .collect();
            writeln!(f, "{}", row.join("|"))?;
        }
        Ok(())
    }
}
