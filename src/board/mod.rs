//! Chess board representation and game logic.
//!
//! Bitboard position with magic-bitboard slider attacks, pseudo-legal move
//! generation filtered by a make-and-check legality test, static exchange
//! evaluation and a tapered hand-crafted evaluation.
//!
//! # Example
//! ```
//! use fe64::board::Board;
//!
//! fe64::board::attack_tables::init().unwrap();
//! let board = Board::new();
//! let moves = board.legal_moves();
//! assert_eq!(moves.len(), 20);
//! ```

pub mod attack_tables;
mod error;
mod eval;
mod fen;
mod make_move;
mod movegen;
mod notation;
mod perft;
pub mod search;
mod see;
mod state;
mod types;

#[cfg(test)]
mod tests;

pub use error::{AttackTableError, FenError, MoveParseError, Slider, SquareError};
pub use eval::{Evaluator, HandCraftedEvaluator, MAX_EVAL};
pub use fen::START_FEN;
pub use make_move::MoveFilter;
pub use state::{Board, Snapshot};
pub use types::{
    Bitboard, BitboardIter, CastlingRights, Color, ColoredPiece, Move, MoveFlags, MoveList,
    Piece, ScoredMove, ScoredMoveList, Square, MAX_MOVES, MAX_PLY,
};

pub(crate) use types::{
    CASTLE_BLACK_K, CASTLE_BLACK_Q, CASTLE_WHITE_K, CASTLE_WHITE_Q, PROMOTION_PIECES,
};
