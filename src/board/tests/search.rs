//! Search algorithm tests.
//!
//! End-to-end checks of mate finding, draw scoring, limits and reporting.

use std::sync::{Arc, Mutex};

use crate::board::search::{
    mate_in, search, SearchConfig, SearchIterationInfo, SearchResult, SearchState, MATE, MATE_BOUND,
};
use crate::board::{Board, Evaluator, MoveFilter};
use crate::engine::SearchClock;

fn run(fen: &str, depth: u32) -> SearchResult {
    let board = Board::try_from_fen(fen).unwrap();
    let mut state = SearchState::new(4);
    search(&board, &[], &mut state, &SearchConfig::depth(depth), &SearchClock::unlimited())
}

fn best(result: &SearchResult) -> String {
    result.best_move.map(|mv| mv.to_string()).unwrap_or_default()
}

// ============================================================================
// Terminal positions and mates
// ============================================================================

#[test]
fn finds_mate_in_one() {
    let result = run("6k1/5ppp/8/8/8/8/8/4Q2K w - - 0 1", 4);
    assert_eq!(best(&result), "e1e8");
    assert_eq!(result.score, MATE - 1);
    assert_eq!(mate_in(result.score), Some(1));
}

#[test]
fn finds_mate_in_two() {
    // Kb6 Kb8 Rh8#
    let result = run("k7/8/2K5/8/8/8/8/7R w - - 0 1", 8);
    assert!(result.score >= MATE_BOUND, "score {}", result.score);
    assert_eq!(result.score, MATE - 3);
    assert_eq!(mate_in(result.score), Some(2));
}

#[test]
fn checkmated_root_has_no_move() {
    let result = run("rnb1kbnr/pppp1ppp/4p3/8/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3", 4);
    assert_eq!(result.best_move, None);
    assert_eq!(result.score, -MATE);
}

#[test]
fn stalemated_root_scores_contempt() {
    let result = run("k7/8/1QK5/8/8/8/8/8 b - - 0 1", 4);
    assert_eq!(result.best_move, None);
    assert_eq!(result.score, -SearchState::default().params.contempt);
}

// ============================================================================
// Tactics
// ============================================================================

#[test]
fn captures_hanging_queen() {
    let result = run("8/8/4k3/3q4/8/2N1K3/8/8 w - - 0 1", 5);
    assert_eq!(best(&result), "c3d5");
}

#[test]
fn finds_knight_fork() {
    let result = run("8/8/4k3/3q4/8/4K3/6N1/8 w - - 0 1", 6);
    assert_eq!(best(&result), "g2f4");
}

#[test]
fn promotes_the_passed_pawn() {
    let result = run("8/3P2k1/8/8/8/8/8/4K3 w - - 0 1", 4);
    assert_eq!(best(&result), "d7d8q");
}

// ============================================================================
// Draws
// ============================================================================

#[test]
fn fifty_move_rule_scores_a_draw() {
    // Every white move is quiet and completes the hundredth halfmove
    let result = run("4k3/8/8/8/8/8/8/3QK3 w - - 99 60", 3);
    assert_eq!(result.score, -SearchState::default().params.contempt);
}

#[test]
fn game_history_repetition_is_a_draw() {
    let mut board = Board::new();
    let mut history = vec![board.hash()];
    history.extend(board.play_moves(["g1f3", "g8f6", "f3g1", "f6g8"]));
    history.pop();

    // With negative contempt a draw looks better than any normal move
    let mut state = SearchState::new(4);
    state.params.contempt = -100;
    let result = search(&board, &history, &mut state, &SearchConfig::depth(3), &SearchClock::unlimited());
    assert!(result.score >= 100, "score {}", result.score);

    // With positive contempt the repeating knight move is avoided
    let mut state = SearchState::new(4);
    let result = search(&board, &history, &mut state, &SearchConfig::depth(3), &SearchClock::unlimited());
    assert_ne!(best(&result), "g1f3");
}

// ============================================================================
// Limits and reporting
// ============================================================================

#[test]
fn node_limit_ends_the_search() {
    let board = Board::new();
    let mut state = SearchState::new(4);
    let config = SearchConfig::depth(40).with_nodes(5000);
    let result = search(&board, &[], &mut state, &config, &SearchClock::unlimited());
    assert!(result.best_move.is_some());
    assert!(result.depth < 40);
    // Limits are polled every 2048 nodes
    assert!(result.nodes < 5000 + 2048, "nodes {}", result.nodes);
}

#[test]
fn stopped_clock_still_yields_a_legal_move() {
    let board = Board::new();
    let mut state = SearchState::new(4);
    let clock = SearchClock::unlimited();
    clock.stop();
    let result = search(&board, &[], &mut state, &SearchConfig::depth(30), &clock);
    let mv = result.best_move.unwrap();
    assert!(board.legal_moves().contains(mv));
    assert!(result.depth < 30);
}

#[test]
fn ponder_move_is_legal_reply() {
    let board = Board::new();
    let mut state = SearchState::new(4);
    let result = search(&board, &[], &mut state, &SearchConfig::depth(5), &SearchClock::unlimited());
    let best_move = result.best_move.unwrap();
    let ponder = result.ponder_move.expect("ponder move at depth 5");

    let mut after = board;
    assert!(after.make_move(best_move, MoveFilter::AllMoves));
    assert!(after.legal_moves().contains(ponder));
}

#[test]
fn reports_every_completed_depth() {
    let infos: Arc<Mutex<Vec<SearchIterationInfo>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&infos);
    let config = SearchConfig::depth(4).with_info_callback(Arc::new(move |info: &SearchIterationInfo| {
        sink.lock().unwrap().push(info.clone());
    }));

    let board = Board::new();
    let mut state = SearchState::new(4);
    let result = search(&board, &[], &mut state, &config, &SearchClock::unlimited());

    let infos = infos.lock().unwrap();
    let depths: Vec<u32> = infos.iter().map(|info| info.depth).collect();
    assert_eq!(depths, vec![1, 2, 3, 4]);
    let last = infos.last().unwrap();
    assert_eq!(last.pv.first().copied(), result.best_move);
    assert_eq!(last.score, result.score);
    assert!(last.seldepth >= last.depth);
    assert!(infos.windows(2).all(|w| w[0].nodes <= w[1].nodes));
}

#[test]
fn search_is_deterministic() {
    let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
    let a = run(fen, 5);
    let b = run(fen, 5);
    assert_eq!(a, b);
}

#[test]
fn tt_holds_root_move_after_search() {
    let board = Board::new();
    let mut state = SearchState::new(4);
    let result = search(&board, &[], &mut state, &SearchConfig::depth(4), &SearchClock::unlimited());
    assert_eq!(state.tt.best_move(board.hash()), result.best_move);
    assert!(state.stats.nodes > 0);
}

// ============================================================================
// Pluggable evaluation
// ============================================================================

struct Flat;

impl Evaluator for Flat {
    fn evaluate(&self, _board: &Board) -> i32 {
        0
    }
}

#[test]
fn custom_evaluator_still_finds_mate() {
    let board = Board::try_from_fen("6k1/5ppp/8/8/8/8/8/4Q2K w - - 0 1").unwrap();
    let mut state = SearchState::with_evaluator(4, Box::new(Flat));
    let result = search(&board, &[], &mut state, &SearchConfig::depth(3), &SearchClock::unlimited());
    assert_eq!(best(&result), "e1e8");

    // Without mate every line is level
    let result = search(&Board::new(), &[], &mut state, &SearchConfig::depth(3), &SearchClock::unlimited());
    assert_eq!(result.score, 0);
}
