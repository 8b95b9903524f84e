//! fe64: a UCI chess engine.
//!
//! - [`board`] - position, move generation, evaluation and search
//! - [`engine`] - background search jobs, clocks and time allocation
//! - [`tt`] - lockless transposition table
//! - [`uci`] - the UCI protocol front end

pub mod board;
pub mod engine;
pub mod tt;
pub mod uci;
mod zobrist;

pub use board::{Board, Color, Move, Piece, Square};
pub use engine::EngineController;
pub use tt::TranspositionTable;
