use super::{NodeContext, SearchContext};
use crate::board::search::constants::MATE_BOUND;
use crate::board::{Move, MoveFilter, MoveList};

impl SearchContext<'_> {
    /// Node-level pruning tried before any move is searched.
    ///
    /// Only called at non-PV nodes that are not in check and have no
    /// excluded move. Order: null move, razoring, reverse futility, ProbCut.
    pub(super) fn prune_before_move_loop(
        &mut self,
        node: &NodeContext,
        alpha: i32,
        beta: i32,
    ) -> Option<i32> {
        if let Some(score) = self.try_null_move(node, beta) {
            return Some(score);
        }
        if self.stopped {
            return None;
        }

        let params = &self.state.params;
        let depth = node.depth;
        let eval = node.static_eval;

        // Razoring: hopeless at shallow depth unless a capture saves it
        if depth <= params.razor_max_depth && eval + params.razor_margin * depth < alpha {
            let score = self.quiescence(alpha, beta, node.ply);
            if self.stopped {
                return None;
            }
            if score < alpha {
                return Some(score);
            }
        }

        // Reverse futility: far enough above beta that no move will drop it
        let params = &self.state.params;
        if depth <= params.rfp_max_depth && beta.abs() < MATE_BOUND {
            let margin = params.rfp_margin * (depth - i32::from(node.improving));
            if eval - margin >= beta {
                return Some(eval);
            }
        }

        self.try_probcut(node, beta)
    }

    /// Give the opponent a free move; if a reduced search still fails high
    /// the node is assumed to as well.
    fn try_null_move(&mut self, node: &NodeContext, beta: i32) -> Option<i32> {
        let params = &self.state.params;
        let ply = node.ply;
        let us = self.board.side_to_move();
        let after_null = ply > 0 && self.played[ply - 1].is_null();

        if ply == 0
            || after_null
            || node.depth < params.null_min_depth
            || node.static_eval < beta
            || self.board.non_pawn_material(us) == 0
        {
            return None;
        }

        let reduced = node.depth - 1 - params.null_reduction(node.depth);
        let snapshot = self.board.snapshot();
        self.board.make_null_move();
        self.played[ply] = Move::NULL;
        let score = -self.alphabeta(reduced, -beta, -beta + 1, ply + 1, Move::NULL);
        self.board.restore(snapshot);

        if self.stopped {
            return None;
        }
        if score >= beta {
            // Unproven mates from a null search are not trusted
            return Some(if score >= MATE_BOUND { beta } else { score });
        }
        None
    }

    /// Search good captures at reduced depth against a raised beta; a fail
    /// high there makes a fail high at full depth very likely.
    fn try_probcut(&mut self, node: &NodeContext, beta: i32) -> Option<i32> {
        let params = &self.state.params;
        if node.depth < params.probcut_min_depth || beta.abs() >= MATE_BOUND {
            return None;
        }
        let probcut_beta = beta + params.probcut_margin;
        let probe_depth = node.depth - params.probcut_reduction;
        let ply = node.ply;

        let mut captures = MoveList::new();
        self.board.generate_captures(&mut captures);
        let mut scored = self.state.tables.score_captures(&self.board, &captures);

        let mut i = 0;
        while let Some(scored_move) = scored.pick_best(i) {
            i += 1;
            let mv = scored_move.mv;
            if !self.board.see_ge(mv, 0) {
                continue;
            }
            let snapshot = self.board.snapshot();
            if !self.board.make_move(mv, MoveFilter::CapturesOnly) {
                continue;
            }
            self.played[ply] = mv;
            let score =
                -self.alphabeta(probe_depth, -probcut_beta, -probcut_beta + 1, ply + 1, Move::NULL);
            self.board.restore(snapshot);

            if self.stopped {
                return None;
            }
            if score >= probcut_beta {
                return Some(score);
            }
        }
        None
    }

    /// Move-level pruning, decided before the move is made.
    ///
    /// Callers only ask once a legal move has been searched and the best
    /// score is not a mated score.
    pub(super) fn prune_move(
        &self,
        node: &NodeContext,
        mv: Move,
        alpha: i32,
        quiets_tried: usize,
    ) -> bool {
        if node.is_pv || node.in_check {
            return false;
        }
        let params = &self.state.params;
        let depth = node.depth;

        if mv.is_quiet() {
            // Late move pruning
            if depth <= params.lmp_max_depth
                && quiets_tried >= params.lmp_limit(depth, node.improving)
            {
                return true;
            }
            // Futility pruning
            if depth <= params.futility_max_depth
                && node.static_eval + params.futility_base + params.futility_margin * depth
                    <= alpha
            {
                return true;
            }
            // History pruning
            if depth <= params.history_prune_depth
                && self.state.tables.history.score(mv) < -params.history_prune_margin * depth
            {
                return true;
            }
            false
        } else if mv.is_capture() {
            depth <= params.see_prune_max_depth
                && !self.board.see_ge(mv, -params.see_capture_margin * depth)
        } else {
            false
        }
    }
}
