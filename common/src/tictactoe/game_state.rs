use crate::tictactoe::board::Board;
use crate::tictactoe::player::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Outcome {
    #[default]
    InProgress,
    Won(Symbol),
    Draw,
}

impl Outcome {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    // The announcement payload for a resolved outcome: Some(None) is a draw
    pub fn winner(&self) -> Option<Option<Symbol>> {
        match self {
            Outcome::InProgress => None,
            Outcome::Won(symbol) => Some(Some(*symbol)),
            Outcome::Draw => Some(None),
        }
    }

    pub fn from_winner(winner: Option<Symbol>) -> Self {
        match winner {
            Some(symbol) => Outcome::Won(symbol),
            None => Outcome::Draw,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::InProgress => write!(f, "in progress"),
            Outcome::Won(symbol) => write!(f, "{} wins", symbol),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

// Depends on nothing but the board, so both peers reach the same result
pub fn check_outcome(board: &Board) -> Outcome {
    if let Some(symbol) = board.line_owner() {
        Outcome::Won(symbol)
    } else if board.is_full() {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}
