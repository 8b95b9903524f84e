use super::SearchContext;
use crate::board::search::constants::{INF, MATE, MATE_BOUND, MAX_SEARCH_DEPTH};
use crate::board::search::{mate_in, SearchIterationInfo, SearchResult};
use crate::board::{Move, MoveFilter, MoveList};

impl SearchContext<'_> {
    /// Iterative deepening over `root_moves` (the legal moves at the root,
    /// never empty).
    ///
    /// A depth only updates the result once its root search completes. If
    /// the very first depth is cut short, the best root move seen so far
    /// (or the first legal move) is returned.
    pub(in crate::board::search) fn iterative_deepening(
        &mut self,
        root_moves: &MoveList,
    ) -> SearchResult {
        let max_depth = self
            .max_depth
            .map_or(MAX_SEARCH_DEPTH, |d| d.clamp(1, MAX_SEARCH_DEPTH)) as i32;
        let fallback = root_moves.first();

        let mut result = SearchResult {
            best_move: fallback,
            ponder_move: None,
            score: 0,
            depth: 0,
            nodes: 0,
        };
        let mut root_pv: Vec<Move> = Vec::new();
        let mut score = 0;

        for depth in 1..=max_depth {
            self.root_depth = depth;
            self.seldepth = 0;

            let iteration_score = self.aspiration(depth, score);
            if self.stopped {
                if result.depth == 0 && self.pv_len[0] > 0 {
                    // Depth 1 was cut short; keep its best move so far
                    result.best_move = Some(self.pv[0][0]);
                }
                break;
            }

            score = iteration_score;
            root_pv = self.pv[0][..self.pv_len[0]].to_vec();
            if root_pv.first().map_or(true, |mv| !root_moves.contains(*mv)) {
                root_pv = self
                    .state
                    .tt
                    .best_move(self.board.hash())
                    .filter(|mv| root_moves.contains(*mv))
                    .into_iter()
                    .collect();
            }

            result.best_move = root_pv.first().copied().or(fallback);
            result.score = score;
            result.depth = depth as u32;
            self.report(depth, score, &root_pv);

            if self.should_stop_deepening(depth, score) {
                break;
            }
        }

        result.ponder_move = result
            .best_move
            .and_then(|best| self.ponder_move(best, &root_pv));
        result.nodes = self.nodes;
        self.state.stats.nodes = self.nodes;
        self.state.stats.seldepth = self.seldepth as u32;
        result
    }

    /// Root search with an aspiration window around `previous`.
    fn aspiration(&mut self, depth: i32, previous: i32) -> i32 {
        let params = &self.state.params;
        if depth < params.aspiration_min_depth || previous.abs() >= MATE_BOUND {
            return self.alphabeta(depth, -INF, INF, 0, Move::NULL);
        }

        let max_window = params.aspiration_max_window;
        let mut delta = params.aspiration_window;
        let mut alpha = (previous - delta).max(-INF);
        let mut beta = (previous + delta).min(INF);

        loop {
            let score = self.alphabeta(depth, alpha, beta, 0, Move::NULL);
            if self.stopped {
                return score;
            }

            if score <= alpha {
                beta = (alpha + beta) / 2;
                alpha = (score - delta).max(-INF);
            } else if score >= beta {
                beta = (score + delta).min(INF);
            } else {
                return score;
            }

            delta *= 2;
            if delta > max_window {
                alpha = -INF;
                beta = INF;
            }
        }
    }

    /// Decide whether another iteration is worth starting.
    fn should_stop_deepening(&self, depth: i32, score: i32) -> bool {
        // A mate within the searched horizon will not get shorter
        if score.abs() >= MATE_BOUND && MATE - score.abs() <= depth {
            return true;
        }
        let params = &self.state.params;
        let percent = if depth >= params.soft_stop_deep_depth {
            params.soft_stop_deep_percent
        } else {
            params.soft_stop_percent
        };
        self.clock.soft_expired(percent)
    }

    /// Expected reply to `best`: the second PV move, else the TT move of
    /// the position after `best`.
    fn ponder_move(&self, best: Move, root_pv: &[Move]) -> Option<Move> {
        let mut after = self.board;
        if !after.make_move(best, MoveFilter::AllMoves) {
            return None;
        }
        let replies = after.legal_moves();
        root_pv
            .get(1)
            .copied()
            .or_else(|| self.state.tt.best_move(after.hash()))
            .filter(|mv| replies.contains(*mv))
    }

    /// Publish a completed iteration.
    fn report(&self, depth: i32, score: i32, pv: &[Move]) {
        let time_ms = self.clock.elapsed_ms();
        let nps = if time_ms > 0 {
            self.nodes * 1000 / time_ms
        } else {
            0
        };
        let info = SearchIterationInfo {
            depth: depth as u32,
            seldepth: self.seldepth as u32,
            score,
            mate_in: mate_in(score),
            nodes: self.nodes,
            nps,
            time_ms,
            hashfull: self.state.hashfull_per_mille(),
            pv: pv.to_vec(),
        };

        log::debug!(
            "depth {} seldepth {} score {} nodes {} time {}ms tt_hits {} pv {}",
            info.depth,
            info.seldepth,
            info.score,
            info.nodes,
            info.time_ms,
            self.state.stats.tt_hits,
            pv.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        );

        if let Some(callback) = &self.info_callback {
            callback(&info);
        }
    }
}
