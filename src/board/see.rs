//! Static Exchange Evaluation (SEE).
//!
//! Evaluates the capture sequence on a move's target square, each side
//! recapturing with its least valuable attacker and free to stop when
//! continuing would lose material. Sliders uncovered behind a capturer
//! (x-rays) join the exchange as it proceeds.

use super::attack_tables::{bishop_attacks, rook_attacks};
use super::state::Board;
use super::types::{Bitboard, Color, Move, Piece};

/// Longest exchange considered (32 pieces on the board).
const MAX_EXCHANGE: usize = 32;

impl Board {
    /// Material balance of `mv` after best-play exchanges on its target square.
    ///
    /// Positive means the side to move comes out ahead. For a quiet move this
    /// measures whether the moved piece can be won.
    #[must_use]
    pub fn see(&self, mv: Move) -> i32 {
        let to = mv.target();
        let us = self.side;

        let victim_value = if mv.is_en_passant() {
            Piece::Pawn.see_value()
        } else {
            self.piece_of(us.opponent(), to)
                .map_or(0, Piece::see_value)
        };

        let mut occupancy = self.all_occupancy();
        if mv.is_en_passant() {
            if let Some(victim_sq) = to.offset(-us.pawn_push()) {
                occupancy = occupancy.without(victim_sq);
            }
        }

        let mut gain = [0i32; MAX_EXCHANGE];
        let mut depth = 0;
        gain[0] = victim_value;

        let mut attacker = mv.piece().piece;
        // The promoted piece stands on the square and is what gets recaptured
        if let Some(promoted) = mv.promotion() {
            gain[0] += promoted.see_value() - Piece::Pawn.see_value();
            attacker = promoted;
        }
        let mut from_bb = Bitboard::from_square(mv.source());
        let mut side = us;
        let mut attackers = self.attackers_to(to, occupancy);
        let diagonal = self.diagonal_sliders();
        let straight = self.straight_sliders();

        loop {
            depth += 1;
            // Score if the opponent now takes the piece that just captured
            gain[depth] = attacker.see_value() - gain[depth - 1];
            if (-gain[depth - 1]).max(gain[depth]) < 0 {
                break;
            }

            occupancy &= !from_bb;
            attackers &= !from_bb;
            attackers |= (bishop_attacks(to, occupancy) & diagonal)
                | (rook_attacks(to, occupancy) & straight);
            attackers &= occupancy;

            side = side.opponent();
            let side_attackers = attackers & self.occupancy(side);
            let Some((piece, bb)) = self.find_least_valuable_attacker(side_attackers, side) else {
                break;
            };
            // A king may only recapture onto an undefended square
            if piece == Piece::King
                && !(attackers & self.occupancy(side.opponent())).is_empty()
            {
                break;
            }
            attacker = piece;
            from_bb = bb;
            if depth + 1 >= MAX_EXCHANGE {
                break;
            }
        }

        while depth > 1 {
            depth -= 1;
            gain[depth - 1] = -(-gain[depth - 1]).max(gain[depth]);
        }
        gain[0]
    }

    /// True if `see(mv) >= threshold`.
    #[inline]
    #[must_use]
    pub fn see_ge(&self, mv: Move, threshold: i32) -> bool {
        self.see(mv) >= threshold
    }

    #[inline]
    fn diagonal_sliders(&self) -> Bitboard {
        self.pieces(Color::White, Piece::Bishop)
            | self.pieces(Color::White, Piece::Queen)
            | self.pieces(Color::Black, Piece::Bishop)
            | self.pieces(Color::Black, Piece::Queen)
    }

    #[inline]
    fn straight_sliders(&self) -> Bitboard {
        self.pieces(Color::White, Piece::Rook)
            | self.pieces(Color::White, Piece::Queen)
            | self.pieces(Color::Black, Piece::Rook)
            | self.pieces(Color::Black, Piece::Queen)
    }

    /// Least valuable piece of `color` in `attackers`, as a single-square bitboard.
    fn find_least_valuable_attacker(
        &self,
        attackers: Bitboard,
        color: Color,
    ) -> Option<(Piece, Bitboard)> {
        Piece::ALL.into_iter().find_map(|piece| {
            let candidates = attackers & self.pieces(color, piece);
            candidates.lsb().map(|sq| (piece, Bitboard::from_square(sq)))
        })
    }
}
