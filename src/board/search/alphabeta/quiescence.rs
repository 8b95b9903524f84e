use super::SearchContext;
use crate::board::search::move_order::captured_piece;
use crate::board::{MoveFilter, MoveList, Piece, MAX_PLY};

impl SearchContext<'_> {
    /// Quiescence search: stand pat, then captures that do not lose material.
    pub(super) fn quiescence(&mut self, mut alpha: i32, beta: i32, ply: usize) -> i32 {
        self.pv_len[ply] = ply;
        self.visit(ply);
        if self.stopped {
            return 0;
        }

        let stand_pat = self.evaluate();
        if ply >= MAX_PLY - 1 || stand_pat >= beta {
            return stand_pat;
        }
        // Not even winning a queen would reach alpha
        if stand_pat + self.state.params.big_delta < alpha {
            return alpha;
        }
        alpha = alpha.max(stand_pat);

        let mut captures = MoveList::new();
        self.board.generate_captures(&mut captures);
        let mut scored = self.state.tables.score_captures(&self.board, &captures);
        let delta_margin = self.state.params.delta_margin;

        let mut best = stand_pat;
        let mut i = 0;
        while let Some(scored_move) = scored.pick_best(i) {
            i += 1;
            let mv = scored_move.mv;

            // Delta pruning per capture; promotions are never pruned
            if mv.promotion().is_none() {
                let gain = captured_piece(&self.board, mv).map_or(0, Piece::see_value);
                if stand_pat + gain + delta_margin < alpha {
                    continue;
                }
            }
            if !self.board.see_ge(mv, 0) {
                continue;
            }

            let snapshot = self.board.snapshot();
            if !self.board.make_move(mv, MoveFilter::CapturesOnly) {
                continue;
            }
            let score = -self.quiescence(-beta, -alpha, ply + 1);
            self.board.restore(snapshot);

            if self.stopped {
                return 0;
            }
            if score > best {
                best = score;
                if score > alpha {
                    alpha = score;
                    self.update_pv(ply, mv);
                    if score >= beta {
                        return score;
                    }
                }
            }
        }

        best
    }
}
