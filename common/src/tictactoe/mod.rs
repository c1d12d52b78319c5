mod board;
mod game_state;
mod input;
mod player;

pub use board::{Board, BoardError, Cell, CellIndex, BOARD_SIZE, LINES};
pub use game_state::{check_outcome, Outcome};
pub use input::Move;
pub use player::Symbol;
