//! Pseudo-legal move generation.
//!
//! Moves that leave the mover's king attacked are generated too; the move
//! executor rejects them. Generation order is fixed (pawns, knights, bishops,
//! rooks, queens, king, castling; squares in index order) so perft counts and
//! search results are reproducible.

mod castling;
mod pawns;
mod pieces;

pub(crate) use castling::castling_rook_squares;

use super::{Board, MoveList};

/// Which moves a generation pass should emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GenKind {
    All,
    Captures,
}

impl Board {
    /// All pseudo-legal moves for the side to move.
    pub fn generate_moves(&self, moves: &mut MoveList) {
        moves.clear();
        self.generate(GenKind::All, moves);
    }

    /// Pseudo-legal captures (including en passant and capture-promotions).
    pub fn generate_captures(&self, moves: &mut MoveList) {
        moves.clear();
        self.generate(GenKind::Captures, moves);
    }

    fn generate(&self, kind: GenKind, moves: &mut MoveList) {
        self.generate_pawn_moves(kind, moves);
        self.generate_piece_moves(kind, moves);
        if kind == GenKind::All {
            self.generate_castling_moves(moves);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::board::{Board, MoveList};

    #[test]
    fn start_position_has_twenty_moves() {
        let mut moves = MoveList::new();
        Board::new().generate_moves(&mut moves);
        assert_eq!(moves.len(), 20);
        Board::new().generate_captures(&mut moves);
        assert!(moves.is_empty());
    }

    #[test]
    fn generation_order_is_stable() {
        let board = Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let mut a = MoveList::new();
        let mut b = MoveList::new();
        board.generate_moves(&mut a);
        board.generate_moves(&mut b);
        assert_eq!(a.as_slice(), b.as_slice());
    }
}
