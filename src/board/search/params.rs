/// Pruning margins, reduction constants and draw scoring used by the search.
#[derive(Clone, Debug)]
pub struct SearchParams {
    /// Centipawns a draw is worth to the side that is *not* to move at the root
    pub contempt: i32,
    pub aspiration_min_depth: i32,
    pub aspiration_window: i32,
    /// Past this width the window opens fully
    pub aspiration_max_window: i32,
    pub null_min_depth: i32,
    pub null_base_reduction: i32,
    pub null_depth_divisor: i32,
    pub razor_max_depth: i32,
    pub razor_margin: i32,
    pub rfp_max_depth: i32,
    pub rfp_margin: i32,
    pub futility_max_depth: i32,
    pub futility_base: i32,
    pub futility_margin: i32,
    pub lmp_max_depth: i32,
    pub lmp_base: i32,
    pub history_prune_depth: i32,
    pub history_prune_margin: i32,
    pub see_prune_max_depth: i32,
    pub see_capture_margin: i32,
    pub iid_min_depth: i32,
    pub iid_reduction: i32,
    pub singular_min_depth: i32,
    pub singular_tt_depth_margin: i32,
    pub probcut_min_depth: i32,
    pub probcut_margin: i32,
    pub probcut_reduction: i32,
    pub lmr_min_depth: i32,
    pub lmr_min_moves: usize,
    /// History score worth one ply of LMR adjustment
    pub lmr_history_divisor: i32,
    /// Qsearch delta pruning: node-level and per-capture margins
    pub big_delta: i32,
    pub delta_margin: i32,
    /// Percent of the soft budget after which no new depth starts
    pub soft_stop_percent: u64,
    /// Same, once depth >= `soft_stop_deep_depth`
    pub soft_stop_deep_percent: u64,
    pub soft_stop_deep_depth: i32,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            contempt: 10,
            aspiration_min_depth: 5,
            aspiration_window: 25,
            aspiration_max_window: 1000,
            null_min_depth: 3,
            null_base_reduction: 3,
            null_depth_divisor: 6,
            razor_max_depth: 3,
            razor_margin: 250,
            rfp_max_depth: 8,
            rfp_margin: 80,
            futility_max_depth: 6,
            futility_base: 100,
            futility_margin: 90,
            lmp_max_depth: 8,
            lmp_base: 3,
            history_prune_depth: 3,
            history_prune_margin: 4000,
            see_prune_max_depth: 8,
            see_capture_margin: 100,
            iid_min_depth: 5,
            iid_reduction: 3,
            singular_min_depth: 8,
            singular_tt_depth_margin: 3,
            probcut_min_depth: 5,
            probcut_margin: 100,
            probcut_reduction: 4,
            lmr_min_depth: 3,
            lmr_min_moves: 3,
            lmr_history_divisor: 8192,
            big_delta: 975,
            delta_margin: 200,
            soft_stop_percent: 80,
            soft_stop_deep_percent: 60,
            soft_stop_deep_depth: 8,
        }
    }
}

impl SearchParams {
    /// Score of a drawn position `ply` plies below the root.
    ///
    /// Even plies have the root side to move, so they see `-contempt`.
    #[must_use]
    pub fn draw_score(&self, ply: usize) -> i32 {
        if ply % 2 == 0 {
            -self.contempt
        } else {
            self.contempt
        }
    }

    /// Late move pruning threshold: quiets tried beyond this are skipped.
    #[must_use]
    pub fn lmp_limit(&self, depth: i32, improving: bool) -> usize {
        let limit = (self.lmp_base + depth * depth).max(0) as usize;
        if improving {
            limit
        } else {
            limit / 2
        }
    }

    #[must_use]
    pub fn null_reduction(&self, depth: i32) -> i32 {
        self.null_base_reduction + depth / self.null_depth_divisor.max(1)
    }
}
