//! Search module implementing alpha-beta with iterative deepening.
//!
//! Features:
//! - Iterative deepening with aspiration windows
//! - PVS alpha-beta with null move, razoring, reverse futility and ProbCut
//! - Late move reductions and late move / futility / history / SEE pruning
//! - Check, pawn-push and singular extensions
//! - Quiescence search with stand-pat, delta pruning and SEE filtering
//! - Move ordering (TT move, captures, killers, counter moves, history)
//! - Repetition and fifty-move draws with contempt

mod alphabeta;
mod constants;
mod move_order;
mod params;

use std::sync::Arc;

use crate::engine::clock::SearchClock;
use crate::tt::{TranspositionTable, DEFAULT_HASH_MB};

use super::eval::{Evaluator, HandCraftedEvaluator};
use super::{Board, ColoredPiece, Move, Piece, Square, MAX_PLY};
use alphabeta::SearchContext;
use constants::{HISTORY_BONUS_MAX, HISTORY_MAX};

pub use constants::{INF, MATE, MATE_BOUND, MAX_SEARCH_DEPTH};
pub use move_order::{captured_piece, mvv_lva};
pub use params::SearchParams;

/// Statistics tracked during search
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub seldepth: u32,
    pub tt_hits: u64,
}

impl SearchStats {
    pub fn reset(&mut self) {
        *self = SearchStats::default();
    }
}

/// Two quiet moves per ply that recently caused a beta cutoff.
pub struct KillerTable {
    slots: [[Move; 2]; MAX_PLY],
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KillerTable {
    #[must_use]
    pub fn new() -> Self {
        KillerTable {
            slots: [[Move::NULL; 2]; MAX_PLY],
        }
    }

    #[must_use]
    pub fn get(&self, ply: usize) -> [Move; 2] {
        self.slots.get(ply).copied().unwrap_or([Move::NULL; 2])
    }

    pub fn update(&mut self, ply: usize, mv: Move) {
        let Some(row) = self.slots.get_mut(ply) else {
            return;
        };
        if row[0] != mv {
            row[1] = row[0];
            row[0] = mv;
        }
    }

    pub fn reset(&mut self) {
        self.slots = [[Move::NULL; 2]; MAX_PLY];
    }
}

/// Bounded history bonus for a cutoff at `depth`.
#[inline]
#[must_use]
pub fn history_bonus(depth: i32) -> i32 {
    (depth * depth).min(HISTORY_BONUS_MAX)
}

/// Gravity update: entries approach `±HISTORY_MAX` but never pass it.
#[inline]
fn apply_gravity(entry: &mut i32, bonus: i32) {
    let bonus = bonus.clamp(-HISTORY_MAX, HISTORY_MAX);
    *entry += bonus - *entry * bonus.abs() / HISTORY_MAX;
}

/// Quiet-move history: piece-to table plus a per-color butterfly table.
pub struct HistoryTable {
    piece_to: [[i32; 64]; 12],
    butterfly: Box<[[[i32; 64]; 64]; 2]>,
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryTable {
    #[must_use]
    pub fn new() -> Self {
        HistoryTable {
            piece_to: [[0; 64]; 12],
            butterfly: Box::new([[[0; 64]; 64]; 2]),
        }
    }

    #[must_use]
    pub fn score(&self, mv: Move) -> i32 {
        let piece = mv.piece();
        let to = mv.target().index();
        self.piece_to[piece.index()][to]
            + self.butterfly[piece.color.index()][mv.source().index()][to]
    }

    /// Reward (positive `bonus`) or penalize (negative) a quiet move.
    pub fn update(&mut self, mv: Move, bonus: i32) {
        let piece = mv.piece();
        let to = mv.target().index();
        apply_gravity(&mut self.piece_to[piece.index()][to], bonus);
        apply_gravity(
            &mut self.butterfly[piece.color.index()][mv.source().index()][to],
            bonus,
        );
    }

    /// Halve every entry so older searches count for less.
    pub fn age(&mut self) {
        for entry in self.piece_to.iter_mut().flatten() {
            *entry /= 2;
        }
        for entry in self.butterfly.iter_mut().flatten().flatten() {
            *entry /= 2;
        }
    }

    pub fn reset(&mut self) {
        self.piece_to = [[0; 64]; 12];
        *self.butterfly = [[[0; 64]; 64]; 2];
    }
}

/// Quiet reply that refuted a given move, keyed by that move's piece and target.
pub struct CounterMoveTable {
    entries: [[Move; 64]; 12],
}

impl Default for CounterMoveTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterMoveTable {
    #[must_use]
    pub fn new() -> Self {
        CounterMoveTable {
            entries: [[Move::NULL; 64]; 12],
        }
    }

    #[must_use]
    pub fn get(&self, prev: Move) -> Move {
        if prev.is_null() {
            return Move::NULL;
        }
        self.entries[prev.piece().index()][prev.target().index()]
    }

    pub fn set(&mut self, prev: Move, reply: Move) {
        if !prev.is_null() {
            self.entries[prev.piece().index()][prev.target().index()] = reply;
        }
    }

    pub fn reset(&mut self) {
        self.entries = [[Move::NULL; 64]; 12];
    }
}

/// Capture history, indexed by `[moving piece][target][victim]`.
pub struct CaptureHistory {
    entries: Box<[[[i32; 6]; 64]; 12]>,
}

impl Default for CaptureHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureHistory {
    #[must_use]
    pub fn new() -> Self {
        CaptureHistory {
            entries: Box::new([[[0; 6]; 64]; 12]),
        }
    }

    #[must_use]
    pub fn score(&self, piece: ColoredPiece, to: Square, victim: Piece) -> i32 {
        self.entries[piece.index()][to.index()][victim.index()]
    }

    pub fn update(&mut self, piece: ColoredPiece, to: Square, victim: Piece, bonus: i32) {
        apply_gravity(
            &mut self.entries[piece.index()][to.index()][victim.index()],
            bonus,
        );
    }

    pub fn age(&mut self) {
        for entry in self.entries.iter_mut().flatten().flatten() {
            *entry /= 2;
        }
    }

    pub fn reset(&mut self) {
        *self.entries = [[[0; 6]; 64]; 12];
    }
}

/// Move-ordering tables that persist across searches of one game.
#[derive(Default)]
pub struct SearchTables {
    pub killers: KillerTable,
    pub history: HistoryTable,
    pub counter_moves: CounterMoveTable,
    pub capture_history: CaptureHistory,
}

impl SearchTables {
    #[must_use]
    pub fn new() -> Self {
        SearchTables::default()
    }

    pub fn reset(&mut self) {
        self.killers.reset();
        self.history.reset();
        self.counter_moves.reset();
        self.capture_history.reset();
    }
}

/// Search state persisted across searches
pub struct SearchState {
    pub tt: TranspositionTable,
    pub tables: SearchTables,
    pub stats: SearchStats,
    pub params: SearchParams,
    evaluator: Box<dyn Evaluator>,
}

impl SearchState {
    #[must_use]
    pub fn new(tt_mb: usize) -> Self {
        SearchState::with_evaluator(tt_mb, Box::new(HandCraftedEvaluator))
    }

    /// A state that scores leaves with `evaluator` instead of the built-in one.
    #[must_use]
    pub fn with_evaluator(tt_mb: usize, evaluator: Box<dyn Evaluator>) -> Self {
        SearchState {
            tt: TranspositionTable::new(tt_mb),
            tables: SearchTables::new(),
            stats: SearchStats::default(),
            params: SearchParams::default(),
            evaluator,
        }
    }

    #[must_use]
    pub fn evaluator(&self) -> &dyn Evaluator {
        self.evaluator.as_ref()
    }

    /// Prepare for a new `go`: age histories, forget killers.
    pub fn new_search(&mut self) {
        self.stats.reset();
        self.tables.killers.reset();
        self.tables.history.age();
        self.tables.capture_history.age();
    }

    /// Forget everything learned in the previous game.
    pub fn new_game(&mut self) {
        self.stats.reset();
        self.tables.reset();
        self.tt.clear();
    }

    /// Reallocate the transposition table; its contents are discarded.
    pub fn resize_tt(&mut self, tt_mb: usize) {
        self.tt.resize(tt_mb);
    }

    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        self.tt.hashfull_per_mille()
    }
}

impl Default for SearchState {
    fn default() -> Self {
        SearchState::new(DEFAULT_HASH_MB)
    }
}

/// Callback type for iteration info.
pub type SearchInfoCallback = Arc<dyn Fn(&SearchIterationInfo) + Send + Sync>;

/// Configuration for a search operation.
///
/// Time limits are not part of the config; they come from the
/// [`SearchClock`] passed alongside it.
#[derive(Clone, Default)]
pub struct SearchConfig {
    /// Maximum depth to search (None = until stopped)
    pub max_depth: Option<u32>,
    /// Node limit (0 = unlimited)
    pub node_limit: u64,
    /// Optional callback for iteration info
    pub info_callback: Option<SearchInfoCallback>,
}

impl SearchConfig {
    /// Create a depth-limited search config
    #[must_use]
    pub fn depth(max_depth: u32) -> Self {
        SearchConfig {
            max_depth: Some(max_depth),
            ..Default::default()
        }
    }

    /// Set node limit
    #[must_use]
    pub fn with_nodes(mut self, node_limit: u64) -> Self {
        self.node_limit = node_limit;
        self
    }

    /// Attach a callback for iteration info reporting.
    #[must_use]
    pub fn with_info_callback(mut self, callback: SearchInfoCallback) -> Self {
        self.info_callback = Some(callback);
        self
    }
}

/// Information about a completed search iteration.
#[derive(Debug, Clone)]
pub struct SearchIterationInfo {
    pub depth: u32,
    pub seldepth: u32,
    pub score: i32,
    /// Moves to mate, negative when being mated
    pub mate_in: Option<i32>,
    pub nodes: u64,
    pub nps: u64,
    pub time_ms: u64,
    pub hashfull: u32,
    pub pv: Vec<Move>,
}

/// Result of a search containing best move and ponder move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// `None` only when the root has no legal move
    pub best_move: Option<Move>,
    /// The expected opponent reply (for pondering)
    pub ponder_move: Option<Move>,
    pub score: i32,
    /// Deepest fully completed iteration
    pub depth: u32,
    pub nodes: u64,
}

/// Signed moves-to-mate for a mate score, `None` otherwise.
#[must_use]
pub fn mate_in(score: i32) -> Option<i32> {
    if score >= MATE_BOUND {
        Some((MATE - score + 1) / 2)
    } else if score <= -MATE_BOUND {
        Some(-((MATE + score + 1) / 2))
    } else {
        None
    }
}

/// Search `board` and return the best move found.
///
/// `game_history` holds the hashes of the positions played before `board`
/// in this game, oldest first, and is used for repetition detection. The
/// search runs until the depth or node limit in `config` is reached or
/// `clock` says to stop; only fully completed depths update the result.
///
/// # Example
/// ```
/// use fe64::board::search::{search, SearchConfig, SearchState};
/// use fe64::board::Board;
/// use fe64::engine::SearchClock;
///
/// let board = Board::new();
/// let mut state = SearchState::new(16);
/// let result = search(&board, &[], &mut state, &SearchConfig::depth(3), &SearchClock::unlimited());
/// assert!(result.best_move.is_some());
/// ```
pub fn search(
    board: &Board,
    game_history: &[u64],
    state: &mut SearchState,
    config: &SearchConfig,
    clock: &SearchClock,
) -> SearchResult {
    let root_moves = board.legal_moves();
    if root_moves.is_empty() {
        let score = if board.in_check() {
            -MATE
        } else {
            state.params.draw_score(0)
        };
        return SearchResult {
            best_move: None,
            ponder_move: None,
            score,
            depth: 0,
            nodes: 0,
        };
    }

    state.new_search();
    let mut ctx = SearchContext::new(board, game_history, state, config, clock);
    ctx.iterative_deepening(&root_moves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn quiet(board: &Board, uci: &str) -> Move {
        board.parse_move(uci).unwrap()
    }

    #[test]
    fn killers_shift_without_duplicates() {
        let board = Board::new();
        let a = quiet(&board, "g1f3");
        let b = quiet(&board, "b1c3");
        let mut killers = KillerTable::new();
        killers.update(3, a);
        killers.update(3, a);
        assert_eq!(killers.get(3), [a, Move::NULL]);
        killers.update(3, b);
        assert_eq!(killers.get(3), [b, a]);
        assert_eq!(killers.get(MAX_PLY + 5), [Move::NULL; 2]);
    }

    #[test]
    fn history_gravity_stays_bounded() {
        let board = Board::new();
        let mv = quiet(&board, "e2e4");
        let mut history = HistoryTable::new();
        for _ in 0..10_000 {
            history.update(mv, history_bonus(40));
        }
        assert!(history.score(mv) <= 2 * HISTORY_MAX);
        assert!(history.score(mv) > 0);
        for _ in 0..10_000 {
            history.update(mv, -history_bonus(40));
        }
        assert!(history.score(mv) >= -2 * HISTORY_MAX);
        assert!(history.score(mv) < 0);
    }

    #[test]
    fn aging_halves_history() {
        let board = Board::new();
        let mv = quiet(&board, "d2d4");
        let mut history = HistoryTable::new();
        history.update(mv, 400);
        let before = history.score(mv);
        history.age();
        assert_eq!(history.score(mv), before / 2);
        history.reset();
        assert_eq!(history.score(mv), 0);
    }

    #[test]
    fn counter_moves_ignore_null_previous() {
        let board = Board::new();
        let prev = quiet(&board, "e2e4");
        let reply = quiet(&board, "g1f3");
        let mut counters = CounterMoveTable::new();
        counters.set(prev, reply);
        assert_eq!(counters.get(prev), reply);
        counters.set(Move::NULL, reply);
        assert_eq!(counters.get(Move::NULL), Move::NULL);
    }

    #[test]
    fn mate_in_counts_full_moves() {
        assert_eq!(mate_in(MATE - 1), Some(1));
        assert_eq!(mate_in(MATE - 3), Some(2));
        assert_eq!(mate_in(-(MATE - 2)), Some(-1));
        assert_eq!(mate_in(150), None);
    }

    #[test]
    fn new_game_clears_learned_state() {
        let board = Board::new();
        let mv = quiet(&board, "e2e4");
        let mut state = SearchState::new(1);
        state.tables.history.update(mv, 300);
        state.tables.killers.update(0, mv);
        state.tt.store(board.hash(), 3, 10, crate::tt::BoundType::Exact, Some(mv), 0);

        state.new_search();
        assert_eq!(state.tables.killers.get(0), [Move::NULL; 2]);
        assert!(state.tables.history.score(mv) > 0);
        assert!(state.tt.best_move(board.hash()).is_some());

        state.new_game();
        assert_eq!(state.tables.history.score(mv), 0);
        assert!(state.tt.best_move(board.hash()).is_none());
    }
}
