//! Move types and move lists.

use std::fmt;
use std::ops::{BitOr, Index};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::piece::{ColoredPiece, Piece};
use super::square::Square;

const SOURCE_MASK: u32 = 0x3F;
const TARGET_SHIFT: u32 = 6;
const PIECE_SHIFT: u32 = 12;
const PROMOTION_SHIFT: u32 = 16;
const FLAG_SHIFT: u32 = 20;

/// Special-move flags carried by a [`Move`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveFlags(u8);

impl MoveFlags {
    pub const QUIET: MoveFlags = MoveFlags(0);
    pub const CAPTURE: MoveFlags = MoveFlags(1 << 0);
    pub const DOUBLE_PUSH: MoveFlags = MoveFlags(1 << 1);
    pub const EN_PASSANT: MoveFlags = MoveFlags(1 << 2);
    pub const CASTLING: MoveFlags = MoveFlags(1 << 3);

    #[inline]
    #[must_use]
    pub const fn contains(self, other: MoveFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for MoveFlags {
    type Output = MoveFlags;

    fn bitor(self, rhs: Self) -> Self {
        MoveFlags(self.0 | rhs.0)
    }
}

/// Packed 24-bit move.
///
/// Encoding:
/// - bits 0-5:   source square
/// - bits 6-11:  target square
/// - bits 12-15: moving piece (colored index 0..12)
/// - bits 16-19: promotion piece kind (0 = none, otherwise `Piece::index`)
/// - bits 20-23: capture, double push, en passant, castling
///
/// A pawn can never promote to a pawn, so promotion value 0 is free to mean
/// "no promotion". The all-zero value is a8a8 and is used as the null move.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Move(u32);

impl Move {
    /// The "no move" sentinel. Printed as `0000`.
    pub const NULL: Move = Move(0);

    #[inline]
    #[must_use]
    pub const fn new(
        source: Square,
        target: Square,
        piece: ColoredPiece,
        promotion: Option<Piece>,
        flags: MoveFlags,
    ) -> Self {
        let promo = match promotion {
            Some(p) => p.index() as u32,
            None => 0,
        };
        Move(
            source.index() as u32
                | (target.index() as u32) << TARGET_SHIFT
                | (piece.index() as u32) << PIECE_SHIFT
                | promo << PROMOTION_SHIFT
                | (flags.0 as u32) << FLAG_SHIFT,
        )
    }

    #[inline]
    #[must_use]
    pub const fn source(self) -> Square {
        Square::from_index((self.0 & SOURCE_MASK) as usize)
    }

    #[inline]
    #[must_use]
    pub const fn target(self) -> Square {
        Square::from_index(((self.0 >> TARGET_SHIFT) & SOURCE_MASK) as usize)
    }

    #[inline]
    #[must_use]
    pub const fn piece(self) -> ColoredPiece {
        ColoredPiece::from_index(((self.0 >> PIECE_SHIFT) & 0xF) as usize)
    }

    #[inline]
    #[must_use]
    pub const fn promotion(self) -> Option<Piece> {
        match (self.0 >> PROMOTION_SHIFT) & 0xF {
            0 => None,
            p => Some(Piece::from_index(p as usize)),
        }
    }

    #[inline]
    #[must_use]
    pub const fn flags(self) -> MoveFlags {
        MoveFlags(((self.0 >> FLAG_SHIFT) & 0xF) as u8)
    }

    /// Returns true if this move captures a piece (including en passant)
    #[inline]
    #[must_use]
    pub const fn is_capture(self) -> bool {
        self.flags().contains(MoveFlags::CAPTURE)
    }

    #[inline]
    #[must_use]
    pub const fn is_double_push(self) -> bool {
        self.flags().contains(MoveFlags::DOUBLE_PUSH)
    }

    #[inline]
    #[must_use]
    pub const fn is_en_passant(self) -> bool {
        self.flags().contains(MoveFlags::EN_PASSANT)
    }

    #[inline]
    #[must_use]
    pub const fn is_castling(self) -> bool {
        self.flags().contains(MoveFlags::CASTLING)
    }

    #[inline]
    #[must_use]
    pub const fn is_promotion(self) -> bool {
        self.promotion().is_some()
    }

    /// Neither a capture nor a promotion.
    #[inline]
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        !self.is_capture() && !self.is_promotion()
    }

    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Raw packed value (for TT storage)
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Move(value & 0x00FF_FFFF)
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "Move(null)");
        }
        write!(f, "Move({} {}{}", self.piece(), self.source(), self.target())?;
        if let Some(promo) = self.promotion() {
            write!(f, "={}", promo.to_char().to_ascii_uppercase())?;
        }
        if self.is_capture() {
            write!(f, " cap")?;
        }
        if self.is_double_push() {
            write!(f, " double")?;
        }
        if self.is_castling() {
            write!(f, " castle")?;
        }
        if self.is_en_passant() {
            write!(f, " ep")?;
        }
        write!(f, ")")
    }
}

/// Long algebraic (UCI) notation: `e2e4`, `e7e8q`, or `0000` for the null move.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "0000");
        }
        write!(f, "{}{}", self.source(), self.target())?;
        if let Some(promo) = self.promotion() {
            write!(f, "{}", promo.to_char())?;
        }
        Ok(())
    }
}

/// Upper bound on moves in any reachable position (the known maximum is 218).
pub const MAX_MOVES: usize = 256;
/// Maximum search depth in plies; every ply-indexed table is this long.
pub const MAX_PLY: usize = 128;

/// List of moves with a fixed-size backing array.
#[derive(Clone, Debug)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: usize,
}

impl MoveList {
    #[must_use]
    pub fn new() -> Self {
        MoveList {
            moves: [Move::NULL; MAX_MOVES],
            len: 0,
        }
    }

    /// Append a move. Moves beyond capacity are dropped.
    #[inline]
    pub fn push(&mut self, mv: Move) {
        debug_assert!(self.len < MAX_MOVES, "move list overflow");
        if self.len < MAX_MOVES {
            self.moves[self.len] = mv;
            self.len += 1;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    #[must_use]
    pub fn contains(&self, mv: Move) -> bool {
        self.as_slice().contains(&mv)
    }

    #[must_use]
    pub fn first(&self) -> Option<Move> {
        self.as_slice().first().copied()
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl Default for MoveList {
    fn default() -> Self {
        MoveList::new()
    }
}

impl Index<usize> for MoveList {
    type Output = Move;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.as_slice()[idx]
    }
}

/// A scored move for move ordering.
#[derive(Clone, Copy, Debug)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: i32,
}

/// Fixed-size list of scored moves to avoid heap allocation.
#[derive(Clone, Debug)]
pub struct ScoredMoveList {
    moves: [ScoredMove; MAX_MOVES],
    len: usize,
}

impl ScoredMoveList {
    #[must_use]
    pub fn new() -> Self {
        ScoredMoveList {
            moves: [ScoredMove {
                mv: Move::NULL,
                score: 0,
            }; MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, mv: Move, score: i32) {
        debug_assert!(self.len < MAX_MOVES, "scored move list overflow");
        if self.len < MAX_MOVES {
            self.moves[self.len] = ScoredMove { mv, score };
            self.len += 1;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Partial sort: find the best move from index `start` onwards and swap it to position `start`.
    ///
    /// Incremental selection sort: O(n - start) per call, so moves past an
    /// early cutoff are never sorted.
    #[inline]
    pub fn pick_best(&mut self, start: usize) -> Option<ScoredMove> {
        if start >= self.len {
            return None;
        }

        let mut best_idx = start;
        let mut best_score = self.moves[start].score;
        for i in (start + 1)..self.len {
            if self.moves[i].score > best_score {
                best_score = self.moves[i].score;
                best_idx = i;
            }
        }

        if best_idx != start {
            self.moves.swap(start, best_idx);
        }

        Some(self.moves[start])
    }
}

impl Default for ScoredMoveList {
    fn default() -> Self {
        ScoredMoveList::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::Color;

    #[test]
    fn packing_is_lossless() {
        let piece = ColoredPiece::new(Color::Black, Piece::Pawn);
        let mv = Move::new(
            Square::from_coords(6, 1).unwrap_or(Square::A8),
            Square::H1,
            piece,
            Some(Piece::Knight),
            MoveFlags::CAPTURE,
        );
        assert_eq!(mv.source().to_string(), "g2");
        assert_eq!(mv.target(), Square::H1);
        assert_eq!(mv.piece(), piece);
        assert_eq!(mv.promotion(), Some(Piece::Knight));
        assert!(mv.is_capture());
        assert!(!mv.is_castling());
        assert_eq!(mv.to_string(), "g2h1n");
        assert_eq!(Move::from_raw(mv.raw()), mv);
    }

    #[test]
    fn null_move_prints_sentinel() {
        assert!(Move::NULL.is_null());
        assert_eq!(Move::NULL.to_string(), "0000");
    }

    #[test]
    fn pick_best_selects_highest_remaining() {
        let wp = ColoredPiece::new(Color::White, Piece::Pawn);
        let mut list = ScoredMoveList::new();
        for (i, score) in [5, 50, 10].into_iter().enumerate() {
            let mv = Move::new(Square::from_index(48 + i), Square::from_index(40 + i), wp, None, MoveFlags::QUIET);
            list.push(mv, score);
        }
        assert_eq!(list.pick_best(0).map(|m| m.score), Some(50));
        assert_eq!(list.pick_best(1).map(|m| m.score), Some(10));
        assert_eq!(list.pick_best(2).map(|m| m.score), Some(5));
        assert!(list.pick_best(3).is_none());
    }
}
