use crate::tictactoe::board::{BoardError, CellIndex};
use crate::tictactoe::player::Symbol;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub cell_index: usize,
    pub symbol: Symbol,
}

impl Move {
    pub fn new(cell_index: usize, symbol: Symbol) -> Self {
        Move { cell_index, symbol }
    }

    // The wire carries a raw index, so it has to be checked before touching a board
    pub fn cell(&self) -> Result<CellIndex, BoardError> {
        CellIndex::new(self.cell_index)
    }
}
