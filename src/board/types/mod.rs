//! Core chess types.
//!
//! - `Piece`, `Color`, `ColoredPiece` - piece kinds, sides, and the 12 colored pieces
//! - `Square` - board square (a8 = 0 .. h1 = 63)
//! - `Bitboard` - 64-bit square set
//! - `Move`, `MoveList`, `ScoredMoveList` - packed moves and bounded move containers
//! - `CastlingRights` - 4-bit castling state

mod bitboard;
mod castling;
mod moves;
mod piece;
mod square;

pub use bitboard::{Bitboard, BitboardIter};
pub use castling::CastlingRights;
pub use moves::{Move, MoveFlags, MoveList, ScoredMove, ScoredMoveList, MAX_MOVES, MAX_PLY};
pub use piece::{Color, ColoredPiece, Piece};
pub use square::Square;

pub(crate) use castling::{CASTLE_BLACK_K, CASTLE_BLACK_Q, CASTLE_WHITE_K, CASTLE_WHITE_Q};
pub(crate) use piece::PROMOTION_PIECES;
