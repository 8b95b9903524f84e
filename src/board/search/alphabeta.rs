//! Core search implementation.
//!
//! This module implements:
//! - PVS alpha-beta over a copy of the root position (snapshot/restore per move)
//! - Repetition and fifty-move draws, mate distance pruning
//! - TT cutoffs at non-PV nodes
//! - Null move, razoring, reverse futility and ProbCut (see `pruning`)
//! - Internal iterative deepening and singular extension
//! - Late move reductions, late move / futility / history / SEE pruning
//! - Quiescence search (see `quiescence`)
//! - Iterative deepening with aspiration windows (see `iterative`)

mod iterative;
mod pruning;
mod quiescence;

use once_cell::sync::Lazy;

use crate::board::{Board, Move, MoveFilter, MoveList, MAX_PLY};
use crate::engine::clock::SearchClock;
use crate::tt::BoundType;

use super::constants::{
    COUNTER_SCORE, INF, KILLER1_SCORE, KILLER2_SCORE, LMR_TABLE_MAX_DEPTH, LMR_TABLE_MAX_IDX,
    MATE, MATE_BOUND, NODE_POLL_MASK,
};
use super::move_order::captured_piece;
use super::{history_bonus, SearchConfig, SearchInfoCallback, SearchState};

/// Precomputed LMR table: `floor(0.5 + ln(depth) * ln(moves) / 2.5)`.
#[allow(clippy::cast_precision_loss)]
static LMR_TABLE: Lazy<[[u8; LMR_TABLE_MAX_IDX]; LMR_TABLE_MAX_DEPTH]> = Lazy::new(|| {
    let mut t = [[0u8; LMR_TABLE_MAX_IDX]; LMR_TABLE_MAX_DEPTH];
    for (depth, row) in t.iter_mut().enumerate().skip(1) {
        for (idx, cell) in row.iter_mut().enumerate().skip(1) {
            let val = (0.5 + (depth as f64).ln() * (idx as f64).ln() / 2.5).floor();
            *cell = val.max(0.0) as u8;
        }
    }
    t
});

#[inline]
fn base_reduction(depth: i32, move_number: usize) -> i32 {
    let d = (depth.max(0) as usize).min(LMR_TABLE_MAX_DEPTH - 1);
    let m = move_number.min(LMR_TABLE_MAX_IDX - 1);
    i32::from(LMR_TABLE[d][m])
}

/// Per-node facts shared by the pruning helpers and the move loop.
#[derive(Clone, Copy)]
#[allow(clippy::struct_excessive_bools)]
pub(super) struct NodeContext {
    ply: usize,
    depth: i32,
    is_pv: bool,
    in_check: bool,
    improving: bool,
    static_eval: i32,
    excluded: Move,
    tt_move: Move,
    /// Extra depth for the TT move, set by the singular test
    singular_extension: i32,
}

/// Search context for a single `search` call.
pub(super) struct SearchContext<'a> {
    board: Board,
    state: &'a mut SearchState,
    clock: &'a SearchClock,
    game_history: &'a [u64],
    max_depth: Option<u32>,
    node_limit: u64,
    info_callback: Option<SearchInfoCallback>,
    nodes: u64,
    seldepth: usize,
    stopped: bool,
    /// Depth of the current iteration, bounds extensions
    root_depth: i32,
    /// Hash of the position at each ply of the current line
    line: [u64; MAX_PLY],
    /// Static eval at each ply for improving detection
    static_eval: [i32; MAX_PLY],
    /// Move played from each ply (`Move::NULL` for a null move)
    played: [Move; MAX_PLY],
    /// Triangular principal variation table
    pv: Box<[[Move; MAX_PLY]; MAX_PLY]>,
    pv_len: [usize; MAX_PLY],
}

impl<'a> SearchContext<'a> {
    pub(super) fn new(
        board: &Board,
        game_history: &'a [u64],
        state: &'a mut SearchState,
        config: &SearchConfig,
        clock: &'a SearchClock,
    ) -> Self {
        SearchContext {
            board: *board,
            state,
            clock,
            game_history,
            max_depth: config.max_depth,
            node_limit: config.node_limit,
            info_callback: config.info_callback.clone(),
            nodes: 0,
            seldepth: 0,
            stopped: false,
            root_depth: 1,
            line: [0; MAX_PLY],
            static_eval: [0; MAX_PLY],
            played: [Move::NULL; MAX_PLY],
            pv: Box::new([[Move::NULL; MAX_PLY]; MAX_PLY]),
            pv_len: [0; MAX_PLY],
        }
    }

    /// Evaluate position from side-to-move's perspective
    #[inline]
    fn evaluate(&self) -> i32 {
        self.state.evaluator().evaluate(&self.board)
    }

    /// Count a node and, at the poll cadence, check the clock and node limit.
    #[inline]
    fn visit(&mut self, ply: usize) {
        self.nodes += 1;
        self.seldepth = self.seldepth.max(ply);
        if self.nodes & NODE_POLL_MASK == 0 {
            let over_nodes = self.node_limit > 0 && self.nodes >= self.node_limit;
            if over_nodes || self.clock.should_stop() {
                self.stopped = true;
            }
        }
    }

    /// True if the position at `ply` occurred before, in this line or in the game.
    ///
    /// Only positions within the halfmove window can repeat, and only those
    /// with the same side to move, so distances 2, 4, ... are checked.
    fn is_repetition(&self, ply: usize) -> bool {
        let hash = self.line[ply];
        let window = self.board.halfmove_clock() as usize;
        let mut distance = 2;
        while distance <= window {
            let earlier = if distance <= ply {
                self.line[ply - distance]
            } else {
                let back = distance - ply;
                if back > self.game_history.len() {
                    return false;
                }
                self.game_history[self.game_history.len() - back]
            };
            if earlier == hash {
                return true;
            }
            distance += 2;
        }
        false
    }

    fn update_pv(&mut self, ply: usize, mv: Move) {
        let child_len = self.pv_len[ply + 1].max(ply + 1);
        self.pv[ply][ply] = mv;
        for i in (ply + 1)..child_len {
            self.pv[ply][i] = self.pv[ply + 1][i];
        }
        self.pv_len[ply] = child_len;
    }

    /// Alpha-beta search with all pruning and extension techniques.
    ///
    /// `excluded` is skipped in the move loop (singular extension search);
    /// pass `Move::NULL` otherwise.
    pub(super) fn alphabeta(
        &mut self,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
        ply: usize,
        excluded: Move,
    ) -> i32 {
        self.pv_len[ply] = ply;

        if depth <= 0 {
            return self.quiescence(alpha, beta, ply);
        }

        self.visit(ply);
        if self.stopped {
            return 0;
        }
        if ply >= MAX_PLY - 1 {
            return self.evaluate();
        }

        let hash = self.board.hash();
        self.line[ply] = hash;
        let is_root = ply == 0;

        if !is_root {
            if self.board.halfmove_clock() >= 100 || self.is_repetition(ply) {
                return self.state.params.draw_score(ply);
            }

            // Mate distance pruning
            alpha = alpha.max(-MATE + ply as i32);
            beta = beta.min(MATE - ply as i32 - 1);
            if alpha >= beta {
                return alpha;
            }
        }

        let is_pv = beta - alpha > 1;
        let has_exclusion = !excluded.is_null();

        if !is_pv && !is_root && !has_exclusion {
            if let Some(score) = self.state.tt.probe(hash, alpha, beta, depth, ply) {
                self.state.stats.tt_hits += 1;
                return score;
            }
        }
        let mut tt_move = self.state.tt.best_move(hash).unwrap_or(Move::NULL);

        let in_check = self.board.in_check();
        let static_eval = if in_check { -INF } else { self.evaluate() };
        self.static_eval[ply] = static_eval;
        let improving = !in_check && (ply < 2 || static_eval > self.static_eval[ply - 2]);

        let mut node = NodeContext {
            ply,
            depth,
            is_pv,
            in_check,
            improving,
            static_eval,
            excluded,
            tt_move,
            singular_extension: 0,
        };

        if !is_pv && !in_check && !has_exclusion {
            if let Some(score) = self.prune_before_move_loop(&node, alpha, beta) {
                return score;
            }
            if self.stopped {
                return 0;
            }
        }

        // Internal iterative deepening: find a move to search first
        let params = &self.state.params;
        if tt_move.is_null() && !in_check && depth >= params.iid_min_depth {
            let iid_depth = depth - params.iid_reduction;
            self.alphabeta(iid_depth, alpha, beta, ply, excluded);
            if self.stopped {
                return 0;
            }
            tt_move = self.state.tt.best_move(hash).unwrap_or(Move::NULL);
            node.tt_move = tt_move;
        }

        if !is_root && !has_exclusion && !in_check && !tt_move.is_null() {
            if let Some(cut) = self.singular_test(&mut node, beta) {
                return cut;
            }
            if self.stopped {
                return 0;
            }
        }

        self.search_moves(&node, alpha, beta)
    }

    /// Singular extension test for the TT move.
    ///
    /// Sets `node.singular_extension` when every alternative fails low
    /// against a margin below the TT score. Returns a score when even the
    /// alternatives beat beta (multi-cut).
    fn singular_test(&mut self, node: &mut NodeContext, beta: i32) -> Option<i32> {
        let params = &self.state.params;
        let depth = node.depth;
        if depth < params.singular_min_depth {
            return None;
        }
        let entry = self.state.tt.entry(self.board.hash(), node.ply)?;
        if entry.bound == BoundType::UpperBound
            || entry.depth < depth - params.singular_tt_depth_margin
            || entry.score.abs() >= MATE_BOUND
        {
            return None;
        }

        let singular_beta = entry.score - 2 * depth;
        let singular_depth = (depth - 1) / 2;
        let score = self.alphabeta(
            singular_depth,
            singular_beta - 1,
            singular_beta,
            node.ply,
            node.tt_move,
        );
        // The excluded search reused this ply's slots
        self.static_eval[node.ply] = node.static_eval;
        self.line[node.ply] = self.board.hash();

        if self.stopped {
            return None;
        }
        if score < singular_beta {
            node.singular_extension = 1;
            None
        } else if singular_beta >= beta {
            Some(singular_beta)
        } else {
            None
        }
    }

    /// Search the ordered move list and return the best score.
    #[allow(clippy::too_many_lines)]
    fn search_moves(&mut self, node: &NodeContext, mut alpha: i32, beta: i32) -> i32 {
        let ply = node.ply;
        let depth = node.depth;
        let hash = self.board.hash();
        let prev = if ply > 0 { self.played[ply - 1] } else { Move::NULL };

        let mut moves = MoveList::new();
        self.board.generate_moves(&mut moves);
        let mut scored = self
            .state
            .tables
            .score_moves(&self.board, &moves, node.tt_move, ply, prev);

        let mut best_score = -INF;
        let mut best_move = Move::NULL;
        let mut legal = 0usize;
        let mut quiets_tried = MoveList::new();
        let mut captures_tried = MoveList::new();

        let mut i = 0;
        while let Some(scored_move) = scored.pick_best(i) {
            i += 1;
            let mv = scored_move.mv;
            if mv == node.excluded {
                continue;
            }
            let is_quiet = mv.is_quiet();

            if legal > 0
                && best_score > -MATE_BOUND
                && self.prune_move(node, mv, alpha, quiets_tried.len())
            {
                continue;
            }

            let snapshot = self.board.snapshot();
            if !self.board.make_move(mv, MoveFilter::AllMoves) {
                continue;
            }
            legal += 1;
            self.played[ply] = mv;

            let gives_check = self.board.in_check();
            let mut extension = 0;
            if (ply as i32) < 2 * self.root_depth {
                let promotes_next = mv.piece().piece == crate::board::Piece::Pawn
                    && mv.target().row() == mv.piece().color.pre_promotion_row();
                if gives_check || promotes_next {
                    extension = 1;
                }
                if mv == node.tt_move {
                    extension = extension.max(node.singular_extension);
                }
            }
            let new_depth = depth - 1 + extension;

            let score = if legal == 1 {
                -self.alphabeta(new_depth, -beta, -alpha, ply + 1, Move::NULL)
            } else {
                let reduction = self.reduction(
                    node,
                    mv,
                    legal,
                    scored_move.score,
                    is_quiet && !gives_check,
                    new_depth,
                );
                let mut s =
                    -self.alphabeta(new_depth - reduction, -alpha - 1, -alpha, ply + 1, Move::NULL);
                if reduction > 0 && s > alpha {
                    s = -self.alphabeta(new_depth, -alpha - 1, -alpha, ply + 1, Move::NULL);
                }
                if s > alpha && s < beta {
                    s = -self.alphabeta(new_depth, -beta, -alpha, ply + 1, Move::NULL);
                }
                s
            };

            self.board.restore(snapshot);
            if self.stopped {
                return 0;
            }

            if score > best_score {
                best_score = score;
                if score > alpha {
                    best_move = mv;
                    alpha = score;
                    self.update_pv(ply, mv);
                    if score >= beta {
                        self.on_beta_cutoff(node, mv, prev, &quiets_tried, &captures_tried);
                        if node.excluded.is_null() {
                            self.state
                                .tt
                                .store(hash, depth, score, BoundType::LowerBound, Some(mv), ply);
                        }
                        return score;
                    }
                }
            }

            if is_quiet {
                quiets_tried.push(mv);
            } else if mv.is_capture() {
                captures_tried.push(mv);
            }
        }

        if legal == 0 {
            return if !node.excluded.is_null() {
                alpha
            } else if node.in_check {
                -MATE + ply as i32
            } else {
                self.state.params.draw_score(ply)
            };
        }

        if node.excluded.is_null() {
            let (bound, stored_move) = if best_move.is_null() {
                (BoundType::UpperBound, None)
            } else {
                (BoundType::Exact, Some(best_move))
            };
            self.state
                .tt
                .store(hash, depth, best_score, bound, stored_move, ply);
        }
        best_score
    }

    /// Late move reduction for the `legal`-th move, never more than
    /// `new_depth - 1`.
    fn reduction(
        &self,
        node: &NodeContext,
        mv: Move,
        legal: usize,
        order_score: i32,
        reducible: bool,
        new_depth: i32,
    ) -> i32 {
        let params = &self.state.params;
        if !reducible
            || node.in_check
            || node.depth < params.lmr_min_depth
            || legal <= params.lmr_min_moves
            || new_depth < 2
        {
            return 0;
        }

        let mut r = base_reduction(node.depth, legal);
        if node.is_pv {
            r -= 1;
        }
        if !node.improving {
            r += 1;
        }
        if matches!(order_score, KILLER1_SCORE | KILLER2_SCORE | COUNTER_SCORE) {
            r -= 1;
        }
        r -= self.state.tables.history.score(mv) / params.lmr_history_divisor;
        r.clamp(0, new_depth - 1)
    }

    /// Update killers, counter moves and histories after `mv` failed high.
    fn on_beta_cutoff(
        &mut self,
        node: &NodeContext,
        mv: Move,
        prev: Move,
        quiets_tried: &MoveList,
        captures_tried: &MoveList,
    ) {
        let bonus = history_bonus(node.depth);
        let tables = &mut self.state.tables;

        if mv.is_quiet() {
            tables.killers.update(node.ply, mv);
            tables.counter_moves.set(prev, mv);
            tables.history.update(mv, bonus);
            for &quiet in quiets_tried {
                tables.history.update(quiet, -bonus);
            }
        } else if let Some(victim) = captured_piece(&self.board, mv) {
            tables
                .capture_history
                .update(mv.piece(), mv.target(), victim, bonus);
        }

        for &capture in captures_tried {
            if let Some(victim) = captured_piece(&self.board, capture) {
                tables
                    .capture_history
                    .update(capture.piece(), capture.target(), victim, -bonus);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lmr_table_grows_with_depth_and_move_number() {
        assert_eq!(base_reduction(1, 1), 0);
        assert!(base_reduction(10, 20) > base_reduction(3, 4));
        assert!(base_reduction(63, 63) >= base_reduction(20, 20));
        assert_eq!(base_reduction(500, 500), base_reduction(63, 63));
    }
}
