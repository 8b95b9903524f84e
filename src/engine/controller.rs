//! Engine controller implementation.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::board::search::{search, SearchConfig, SearchInfoCallback, SearchResult, SearchState};
use crate::board::Board;

use super::clock::{SearchClock, StopToken};
use super::time::{SearchLimits, TimeConfig};

/// Search thread stack size (32 MB)
const SEARCH_STACK_SIZE: usize = 32 * 1024 * 1024;

/// Maximum sleep duration when polling time limits (avoids excessive CPU wake-ups)
const MAX_POLL_SLEEP_MS: u64 = 5;

/// Poll interval when holding a finished result for `stop`/`ponderhit`
const PONDER_POLL_MS: u64 = 10;

/// Active search job state
pub struct SearchJob {
    /// Clock shared with the search and the watchdog
    pub clock: Arc<SearchClock>,
    /// Handle to the search thread
    handle: JoinHandle<()>,
    /// Handle to the thread enforcing the hard deadline
    watchdog: JoinHandle<()>,
}

impl SearchJob {
    /// Stop the search and wait for the thread to finish
    pub fn stop_and_wait(self) {
        self.clock.stop();
        self.wait();
    }

    /// Wait for the search to finish on its own.
    pub fn wait(self) {
        if self.handle.join().is_err() {
            log::warn!("search thread panicked");
        }
        // The search thread always trips the stop token on exit
        if self.watchdog.join().is_err() {
            log::warn!("watchdog thread panicked");
        }
    }

    /// Signal stop without waiting
    pub fn signal_stop(&self) {
        self.clock.stop();
    }

    /// Handle ponderhit - transition from pondering to real search
    pub fn ponderhit(&self) {
        if self.clock.ponderhit() {
            log::debug!("ponderhit: budget {:?}", self.clock.budget());
        }
    }
}

/// Engine controller managing search and game state
pub struct EngineController {
    /// Current board position
    board: Board,
    /// Hashes of the positions played before `board`, oldest first
    history: Vec<u64>,
    /// Search state (transposition table, killers, etc.)
    search_state: Arc<Mutex<SearchState>>,
    /// Active search job (if any)
    current_job: Option<SearchJob>,
    /// Optional callback for per-iteration search info
    info_callback: Option<SearchInfoCallback>,
    time_config: TimeConfig,
}

impl EngineController {
    /// Create a new engine controller
    #[must_use]
    pub fn new(tt_mb: usize) -> Self {
        EngineController {
            board: Board::new(),
            history: Vec::new(),
            search_state: Arc::new(Mutex::new(SearchState::new(tt_mb))),
            current_job: None,
            info_callback: None,
            time_config: TimeConfig::default(),
        }
    }

    /// Get a reference to the current board
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn game_history(&self) -> &[u64] {
        &self.history
    }

    /// Set the position to search, with the hashes of the positions that
    /// preceded it in the game (for repetition detection).
    pub fn set_position(&mut self, board: Board, history: Vec<u64>) {
        self.stop_search();
        self.board = board;
        self.history = history;
    }

    /// Get a reference to the search state
    #[must_use]
    pub fn search_state(&self) -> &Arc<Mutex<SearchState>> {
        &self.search_state
    }

    #[must_use]
    pub fn time_config(&self) -> &TimeConfig {
        &self.time_config
    }

    pub fn set_move_overhead(&mut self, ms: u64) {
        self.time_config.move_overhead_ms = ms;
    }

    /// Reset the board to the starting position and forget the last game
    pub fn new_game(&mut self) {
        self.stop_search();
        self.board = Board::new();
        self.history.clear();
        self.search_state.lock().new_game();
    }

    /// Stop any active search
    pub fn stop_search(&mut self) {
        if let Some(job) = self.current_job.take() {
            job.stop_and_wait();
        }
    }

    /// Block until the active search (if any) finishes by itself.
    pub fn wait(&mut self) {
        if let Some(job) = self.current_job.take() {
            job.wait();
        }
    }

    /// Signal stop to active search (non-blocking)
    pub fn signal_stop(&mut self) {
        if let Some(job) = &self.current_job {
            job.signal_stop();
        }
    }

    /// Handle ponderhit
    pub fn ponderhit(&mut self) {
        if let Some(job) = &self.current_job {
            job.ponderhit();
        }
    }

    fn build_search_config(&self, limits: &SearchLimits) -> SearchConfig {
        let mut config = match limits.depth {
            Some(depth) => SearchConfig::depth(depth),
            None => SearchConfig::default(),
        };
        if limits.nodes > 0 {
            config = config.with_nodes(limits.nodes);
        }
        if let Some(cb) = &self.info_callback {
            config = config.with_info_callback(cb.clone());
        }
        config
    }

    /// Stop the search once the clock's hard deadline passes.
    ///
    /// The deadline is re-read every poll because `ponderhit` installs one
    /// mid-search. Exits when the stop token is set by anyone.
    fn spawn_watchdog(clock: Arc<SearchClock>) -> JoinHandle<()> {
        thread::spawn(move || loop {
            if clock.is_stopped() {
                break;
            }
            let mut sleep_for = Duration::from_millis(MAX_POLL_SLEEP_MS);
            if let Some(deadline) = clock.hard_deadline() {
                let now = Instant::now();
                if now >= deadline {
                    clock.stop();
                    break;
                }
                sleep_for = sleep_for.min(deadline - now);
            }
            thread::sleep(sleep_for);
        })
    }

    /// Start a search with the given limits.
    ///
    /// The `on_complete` callback is called exactly once with the result.
    /// For pondering and infinite searches it is held back until `stop`
    /// (or, for pondering, `ponderhit` followed by the search finishing).
    pub fn start_search<F>(&mut self, limits: SearchLimits, on_complete: F)
    where
        F: FnOnce(SearchResult) + Send + 'static,
    {
        self.stop_search();

        let stop = StopToken::new();
        let clock = Arc::new(if limits.ponder {
            SearchClock::pondering(stop, limits.budget)
        } else {
            SearchClock::new(stop, limits.budget)
        });
        let config = self.build_search_config(&limits);

        let search_board = self.board;
        let history = self.history.clone();
        let search_state = Arc::clone(&self.search_state);
        let search_clock = Arc::clone(&clock);
        let hold_result = limits.infinite;

        let watchdog = Self::spawn_watchdog(Arc::clone(&clock));
        let handle = thread::Builder::new()
            .name("search".to_string())
            .stack_size(SEARCH_STACK_SIZE)
            .spawn(move || {
                let result = {
                    let mut guard = search_state.lock();
                    search(&search_board, &history, &mut guard, &config, &search_clock)
                };

                // Wait while pondering or infinite (unless stopped)
                while (hold_result || search_clock.is_pondering()) && !search_clock.is_stopped() {
                    thread::sleep(Duration::from_millis(PONDER_POLL_MS));
                }
                search_clock.stop();

                on_complete(result);
            })
            .expect("failed to spawn search thread");

        self.current_job = Some(SearchJob {
            clock,
            handle,
            watchdog,
        });
    }

    /// Execute a closure with mutable access to the search state.
    ///
    /// Stops any running search first.
    pub fn with_search_state<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut SearchState) -> R,
    {
        self.stop_search();
        f(&mut self.search_state.lock())
    }

    /// Resize the transposition table
    pub fn resize_hash(&mut self, mb: usize) {
        self.with_search_state(|state| state.resize_tt(mb));
    }

    /// Empty the transposition table
    pub fn clear_hash(&mut self) {
        self.with_search_state(|state| state.tt.clear());
    }

    pub fn set_contempt(&mut self, contempt: i32) {
        self.with_search_state(|state| state.params.contempt = contempt);
    }

    /// Set callback for iteration info reporting.
    pub fn set_info_callback(&mut self, cb: Option<SearchInfoCallback>) {
        self.info_callback = cb;
    }
}

impl Drop for EngineController {
    fn drop(&mut self) {
        self.stop_search();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::clock::TimeBudget;
    use std::sync::mpsc;

    fn run(controller: &mut EngineController, limits: SearchLimits) -> mpsc::Receiver<SearchResult> {
        let (tx, rx) = mpsc::channel();
        controller.start_search(limits, move |result| {
            let _ = tx.send(result);
        });
        rx
    }

    #[test]
    fn depth_search_reports_once() {
        let mut controller = EngineController::new(8);
        let rx = run(&mut controller, SearchLimits::depth(3));
        let result = rx.recv_timeout(Duration::from_secs(30)).unwrap();
        assert!(result.best_move.is_some());
        assert_eq!(result.depth, 3);
        controller.wait();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn movetime_search_respects_hard_deadline() {
        let mut controller = EngineController::new(8);
        let limits = SearchLimits {
            budget: Some(TimeBudget::fixed(100)),
            ..Default::default()
        };
        let start = Instant::now();
        let rx = run(&mut controller, limits);
        let result = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(result.best_move.is_some());
        assert!(start.elapsed() < Duration::from_millis(1000));
    }

    #[test]
    fn infinite_search_waits_for_stop() {
        let mut controller = EngineController::new(8);
        let limits = SearchLimits {
            depth: Some(1),
            infinite: true,
            ..Default::default()
        };
        let rx = run(&mut controller, limits);
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        controller.signal_stop();
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(result.best_move.is_some());
    }

    #[test]
    fn ponderhit_starts_the_budget() {
        let mut controller = EngineController::new(8);
        let limits = SearchLimits {
            budget: Some(TimeBudget::fixed(50)),
            ponder: true,
            ..Default::default()
        };
        let rx = run(&mut controller, limits);
        // No deadline while pondering
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
        controller.ponderhit();
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(result.best_move.is_some());
    }

    #[test]
    fn new_game_resets_position_and_history() {
        let mut controller = EngineController::new(1);
        let mut board = Board::new();
        let history = board.play_moves(["e2e4", "e7e5"]);
        controller.set_position(board, history);
        assert_eq!(controller.game_history().len(), 2);

        controller.new_game();
        assert_eq!(controller.board().to_fen(), Board::new().to_fen());
        assert!(controller.game_history().is_empty());
    }

    #[test]
    fn wait_survives_a_panicked_watchdog() {
        let job = SearchJob {
            clock: Arc::new(SearchClock::unlimited()),
            handle: thread::spawn(|| {}),
            watchdog: thread::spawn(|| panic!("watchdog failure")),
        };
        job.wait();
    }
}
