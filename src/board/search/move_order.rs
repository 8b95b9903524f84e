//! Move ordering utilities for search.

use super::constants::{
    BAD_CAPTURE_PENALTY, CAPTURE_BASE, COUNTER_SCORE, KILLER1_SCORE, KILLER2_SCORE, TT_MOVE_SCORE,
};
use super::SearchTables;
use crate::board::{Board, Move, MoveList, Piece, ScoredMoveList};

/// Most-valuable-victim / least-valuable-attacker key.
///
/// Victim dominates; among equal victims the cheaper attacker wins.
#[inline]
#[must_use]
pub fn mvv_lva(attacker: Piece, victim: Piece) -> i32 {
    (victim.index() as i32 + 1) * 100 + 5 - attacker.index() as i32
}

/// Piece removed by `mv`, if any. En passant always takes a pawn.
#[inline]
#[must_use]
pub fn captured_piece(board: &Board, mv: Move) -> Option<Piece> {
    if mv.is_en_passant() {
        Some(Piece::Pawn)
    } else if mv.is_capture() {
        board.piece_of(board.side_to_move().opponent(), mv.target())
    } else {
        None
    }
}

impl SearchTables {
    /// Ordering score for a capture: MVV-LVA refined by capture history,
    /// with losing exchanges pushed below the quiet moves.
    #[must_use]
    pub fn capture_score(&self, board: &Board, mv: Move) -> i32 {
        let attacker = mv.piece().piece;
        let victim = captured_piece(board, mv).unwrap_or(Piece::Pawn);
        let mut score = CAPTURE_BASE
            + mvv_lva(attacker, victim) * 16
            + self.capture_history.score(mv.piece(), mv.target(), victim) / 32;
        if let Some(promo) = mv.promotion() {
            score += promo.see_value();
        }
        if !board.see_ge(mv, 0) {
            score -= BAD_CAPTURE_PENALTY;
        }
        score
    }

    /// Assign an ordering score to every move in `moves`.
    ///
    /// `prev` is the move that led to this node, used for the counter-move
    /// lookup; pass [`Move::NULL`] at the root or after a null move.
    #[must_use]
    pub fn score_moves(
        &self,
        board: &Board,
        moves: &MoveList,
        tt_move: Move,
        ply: usize,
        prev: Move,
    ) -> ScoredMoveList {
        let [killer1, killer2] = self.killers.get(ply);
        let counter = self.counter_moves.get(prev);

        let mut scored = ScoredMoveList::new();
        for &mv in moves {
            let score = if !tt_move.is_null() && mv == tt_move {
                TT_MOVE_SCORE
            } else if mv.is_capture() {
                self.capture_score(board, mv)
            } else if let Some(promo) = mv.promotion() {
                CAPTURE_BASE + promo.see_value()
            } else if mv == killer1 {
                KILLER1_SCORE
            } else if mv == killer2 {
                KILLER2_SCORE
            } else if !counter.is_null() && mv == counter {
                COUNTER_SCORE
            } else {
                self.history.score(mv)
            };
            scored.push(mv, score);
        }
        scored
    }

    /// Ordering for quiescence: captures only, by MVV-LVA.
    #[must_use]
    pub fn score_captures(&self, board: &Board, moves: &MoveList) -> ScoredMoveList {
        let mut scored = ScoredMoveList::new();
        for &mv in moves {
            let victim = captured_piece(board, mv).unwrap_or(Piece::Pawn);
            let promo = mv.promotion().map_or(0, Piece::see_value);
            scored.push(mv, mvv_lva(mv.piece().piece, victim) + promo);
        }
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(board: &Board, uci: &str) -> Move {
        board.parse_move(uci).unwrap()
    }

    #[test]
    fn mvv_lva_prefers_big_victims_then_small_attackers() {
        assert!(mvv_lva(Piece::Pawn, Piece::Queen) > mvv_lva(Piece::Queen, Piece::Queen));
        assert!(mvv_lva(Piece::Queen, Piece::Rook) > mvv_lva(Piece::Pawn, Piece::Bishop));
        assert_eq!(mvv_lva(Piece::Pawn, Piece::Pawn), 105);
    }

    #[test]
    fn en_passant_captures_a_pawn() {
        let board = Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        let mv = find(&board, "e5d6");
        assert!(mv.is_en_passant());
        assert_eq!(captured_piece(&board, mv), Some(Piece::Pawn));
        assert_eq!(captured_piece(&board, find(&board, "e1d1")), None);
    }

    #[test]
    fn ordering_follows_priority_bands() {
        // Rxd5 wins a queen; Qxa5 gives the queen for a pawn
        let board = Board::from_fen("7k/8/1p6/p2q4/8/8/8/3RQK2 w - - 0 1");
        let mut tables = SearchTables::new();
        let killer = find(&board, "f1f2");
        let tt_move = find(&board, "f1e2");
        tables.killers.update(0, killer);

        let moves = board.legal_moves();
        let mut scored = tables.score_moves(&board, &moves, tt_move, 0, Move::NULL);
        let order: Vec<Move> = (0..moves.len())
            .filter_map(|i| scored.pick_best(i).map(|s| s.mv))
            .collect();

        assert_eq!(order[0], tt_move);
        assert_eq!(order[1], find(&board, "d1d5"));
        let killer_pos = order.iter().position(|&m| m == killer).unwrap();
        let bad_pos = order.iter().position(|&m| m == find(&board, "e1a5")).unwrap();
        assert!(killer_pos < bad_pos);
        assert_eq!(bad_pos, order.len() - 1);
    }

    #[test]
    fn quiet_promotions_rank_with_captures() {
        let board = Board::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1");
        let tables = SearchTables::new();
        let moves = board.legal_moves();
        let mut scored = tables.score_moves(&board, &moves, Move::NULL, 0, Move::NULL);
        let best = scored.pick_best(0).unwrap();
        assert_eq!(best.mv.to_string(), "a7a8q");
        assert!(best.score > KILLER1_SCORE);
    }
}
