use crate::zobrist::ZOBRIST;

use super::movegen::castling_rook_squares;
use super::{Board, Color, ColoredPiece, Move, MoveList, Piece};

/// Which moves `make_move` accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveFilter {
    AllMoves,
    /// Reject anything that is not a capture (quiescence search)
    CapturesOnly,
}

impl Board {
    /// Apply a pseudo-legal move generated for this position.
    ///
    /// Returns `false` and leaves the board unchanged if the move is filtered
    /// out or would leave the mover's king attacked.
    pub fn make_move(&mut self, mv: Move, filter: MoveFilter) -> bool {
        if filter == MoveFilter::CapturesOnly && !mv.is_capture() {
            return false;
        }

        let snapshot = self.snapshot();
        let keys = &*ZOBRIST;
        let us = self.side;
        let them = us.opponent();
        let from = mv.source();
        let to = mv.target();
        let mover = mv.piece();

        self.remove_piece(mover, from);
        self.put_piece(mover, to);
        self.hash ^= keys.piece(mover, from) ^ keys.piece(mover, to);

        if mv.is_en_passant() {
            if let Some(victim_sq) = to.offset(-us.pawn_push()) {
                let victim = ColoredPiece::new(them, Piece::Pawn);
                self.remove_piece(victim, victim_sq);
                self.hash ^= keys.piece(victim, victim_sq);
            }
        } else if mv.is_capture() {
            if let Some(kind) = self.piece_of(them, to) {
                let victim = ColoredPiece::new(them, kind);
                self.remove_piece(victim, to);
                self.hash ^= keys.piece(victim, to);
            }
        }

        if let Some(promo) = mv.promotion() {
            let promoted = ColoredPiece::new(us, promo);
            self.remove_piece(mover, to);
            self.put_piece(promoted, to);
            self.hash ^= keys.piece(mover, to) ^ keys.piece(promoted, to);
        }

        if let Some(ep) = self.en_passant.take() {
            self.hash ^= keys.en_passant(ep);
        }
        if mv.is_double_push() {
            // The square the pawn skipped over
            if let Some(ep) = to.offset(-us.pawn_push()) {
                self.en_passant = Some(ep);
                self.hash ^= keys.en_passant(ep);
            }
        }

        if mv.is_castling() {
            if let Some((rook_from, rook_to)) = castling_rook_squares(to) {
                let rook = ColoredPiece::new(us, Piece::Rook);
                self.remove_piece(rook, rook_from);
                self.put_piece(rook, rook_to);
                self.hash ^= keys.piece(rook, rook_from) ^ keys.piece(rook, rook_to);
            }
        }

        let rights = self.castling.after_move(from, to);
        if rights != self.castling {
            self.hash ^= keys.castling(self.castling) ^ keys.castling(rights);
            self.castling = rights;
        }

        if mover.piece == Piece::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }

        self.refresh_occupancy();
        self.side = them;
        self.hash ^= keys.black_to_move_key;

        let king_safe = self
            .king_square(us)
            .is_some_and(|king| !self.is_square_attacked(king, them));
        if !king_safe {
            self.restore(snapshot);
            return false;
        }
        true
    }

    /// Pass the turn. Callers snapshot and restore around it.
    pub fn make_null_move(&mut self) {
        let keys = &*ZOBRIST;
        if let Some(ep) = self.en_passant.take() {
            self.hash ^= keys.en_passant(ep);
        }
        self.side = self.side.opponent();
        self.hash ^= keys.black_to_move_key;
        self.halfmove_clock += 1;
    }

    /// Pseudo-legal moves filtered through the king-safety check.
    #[must_use]
    pub fn legal_moves(&self) -> MoveList {
        let mut pseudo = MoveList::new();
        self.generate_moves(&mut pseudo);
        let mut legal = MoveList::new();
        for &mv in pseudo.iter() {
            let mut probe = *self;
            if probe.make_move(mv, MoveFilter::AllMoves) {
                legal.push(mv);
            }
        }
        legal
    }

    /// True if the side to move has at least one legal move.
    #[must_use]
    pub fn has_legal_move(&self) -> bool {
        let mut pseudo = MoveList::new();
        self.generate_moves(&mut pseudo);
        pseudo.iter().any(|&mv| {
            let mut probe = *self;
            probe.make_move(mv, MoveFilter::AllMoves)
        })
    }

    #[must_use]
    pub fn is_checkmate(&self) -> bool {
        self.in_check() && !self.has_legal_move()
    }

    #[must_use]
    pub fn is_stalemate(&self) -> bool {
        !self.in_check() && !self.has_legal_move()
    }
}
