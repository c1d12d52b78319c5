pub mod messages;
mod tictactoe;

pub use tictactoe::*;
