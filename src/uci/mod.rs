//! Universal Chess Interface (UCI) protocol implementation.
//!
//! Handles communication with chess GUIs following the UCI specification.
//! Searches run on the engine controller's background thread, so `stop`,
//! `ponderhit` and `isready` are answered while a search is in progress.

use std::fmt;
use std::io::{self, BufRead};
use std::sync::Arc;
use std::time::Instant;

use crate::board::search::SearchInfoCallback;
use crate::board::{Board, FenError, MoveFilter, MoveParseError};
use crate::engine::{EngineController, SearchLimits};
use crate::tt::DEFAULT_HASH_MB;

pub mod command;
pub mod options;
pub mod print;

use command::{parse_uci_command, UciCommand};
use options::{parse_setoption, UciOptionAction, UciOptions};

/// Error type for UCI position command parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciError {
    /// Invalid FEN string
    InvalidFen(FenError),
    /// Invalid move in the move list
    InvalidMove { move_str: String, error: MoveParseError },
    /// Missing required parts in the command
    MissingParts,
}

impl fmt::Display for UciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciError::InvalidFen(e) => write!(f, "Invalid FEN: {e}"),
            UciError::InvalidMove { move_str, error } => {
                write!(f, "Invalid move '{move_str}': {error}")
            }
            UciError::MissingParts => write!(f, "Missing required parts in position command"),
        }
    }
}

impl std::error::Error for UciError {}

impl From<FenError> for UciError {
    fn from(e: FenError) -> Self {
        UciError::InvalidFen(e)
    }
}

/// Split a `position` command into its FEN (`None` for `startpos`) and the
/// trailing move list.
fn split_position<'a>(parts: &'a [&'a str]) -> Result<(Option<String>, &'a [&'a str]), UciError> {
    let (fen, rest) = match parts.get(1) {
        Some(&"startpos") => (None, &parts[2..]),
        Some(&"fen") => {
            let fields = &parts[2..];
            let end = fields
                .iter()
                .position(|p| *p == "moves")
                .unwrap_or(fields.len());
            if end == 0 {
                return Err(UciError::MissingParts);
            }
            (Some(fields[..end].join(" ")), &fields[end..])
        }
        _ => return Err(UciError::MissingParts),
    };

    let moves = match rest.split_first() {
        Some((&"moves", moves)) => moves,
        _ => &[][..],
    };
    Ok((fen, moves))
}

/// Parse a UCI position command, returning an error on failure.
///
/// Supports both "position startpos" and "position fen <fen>" formats,
/// optionally followed by "moves <move1> <move2> ...". On success returns
/// the final position and the hashes of every position before it, oldest
/// first.
pub fn try_parse_position(parts: &[&str]) -> Result<(Board, Vec<u64>), UciError> {
    let (fen, moves) = split_position(parts)?;
    let mut board = match fen {
        Some(fen) => Board::try_from_fen(&fen)?,
        None => Board::new(),
    };

    let mut history = Vec::with_capacity(moves.len());
    for text in moves {
        let mv = board.parse_move(text).map_err(|error| UciError::InvalidMove {
            move_str: (*text).to_string(),
            error,
        })?;
        history.push(board.hash());
        board.make_move(mv, MoveFilter::AllMoves);
    }

    Ok((board, history))
}

/// Parse a UCI position command without failing.
///
/// A malformed command or FEN yields the starting position; the move list
/// is replayed up to the first move that is not legal.
#[must_use]
pub fn parse_position(parts: &[&str]) -> (Board, Vec<u64>) {
    let (board, moves) = match split_position(parts) {
        Ok((Some(fen), moves)) => (Board::from_fen(&fen), moves),
        Ok((None, moves)) => (Board::new(), moves),
        Err(err) => {
            log::warn!("{err}; using the start position");
            (Board::new(), &[][..])
        }
    };

    let mut board = board;
    let mut history = vec![board.hash()];
    history.extend(board.play_moves(moves.iter().copied()));
    // The last hash is the root itself
    history.pop();
    (board, history)
}

/// One protocol session: the engine plus the option values the GUI set.
pub struct UciSession {
    controller: EngineController,
    options: UciOptions,
    /// The running search only reports on `stop` (infinite or ponder)
    holding_result: bool,
}

impl Default for UciSession {
    fn default() -> Self {
        Self::new()
    }
}

impl UciSession {
    #[must_use]
    pub fn new() -> Self {
        let mut controller = EngineController::new(DEFAULT_HASH_MB);
        let callback: SearchInfoCallback = Arc::new(print::print_info);
        controller.set_info_callback(Some(callback));
        UciSession {
            controller,
            options: UciOptions::new(DEFAULT_HASH_MB),
            holding_result: false,
        }
    }

    #[must_use]
    pub fn controller(&self) -> &EngineController {
        &self.controller
    }

    /// Handle one input line. Returns `false` once the session should end.
    pub fn handle_line(&mut self, line: &str) -> bool {
        let Some(command) = parse_uci_command(line) else {
            return true;
        };

        match command {
            UciCommand::Uci => self.options.print(),
            UciCommand::IsReady => print::send("readyok"),
            UciCommand::UciNewGame => self.controller.new_game(),
            UciCommand::Position(parts) => {
                let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
                let (board, history) = parse_position(&parts);
                self.controller.set_position(board, history);
            }
            UciCommand::Go(go) => {
                let board = *self.controller.board();
                let limits = SearchLimits::from_go(
                    &go,
                    board.side_to_move(),
                    board.game_phase(),
                    self.controller.time_config(),
                );
                log::debug!("go: {limits:?}");
                self.holding_result = limits.infinite || limits.ponder;
                self.controller
                    .start_search(limits, |result| print::print_bestmove(&result));
            }
            UciCommand::Stop => self.controller.stop_search(),
            UciCommand::PonderHit => {
                self.holding_result = false;
                self.controller.ponderhit();
            }
            UciCommand::SetOption(parts) => {
                let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
                if let Some((name, value)) = parse_setoption(&parts) {
                    if let Some(action) = self.options.apply_setoption(&name, value.as_deref()) {
                        self.apply_option(action);
                    }
                }
            }
            UciCommand::Perft(depth) => {
                self.controller.stop_search();
                let mut board = *self.controller.board();
                let start = Instant::now();
                let divide = board.perft_divide(depth);
                print::print_perft(&divide, start.elapsed());
            }
            UciCommand::Eval => {
                let score = self.controller.board().evaluate();
                print::send(&format!("Evaluation: {score} cp (side to move)"));
            }
            UciCommand::Display => print::print_board(self.controller.board()),
            UciCommand::Quit => {
                self.controller.stop_search();
                return false;
            }
            UciCommand::Unknown(text) => log::debug!("unknown command: {text}"),
        }
        true
    }

    fn apply_option(&mut self, action: UciOptionAction) {
        match action {
            UciOptionAction::ResizeHash(mb) => self.controller.resize_hash(mb),
            UciOptionAction::ClearHash => self.controller.clear_hash(),
            UciOptionAction::SetContempt(cp) => self.controller.set_contempt(cp),
            UciOptionAction::SetMoveOverhead(ms) => self.controller.set_move_overhead(ms),
        }
    }

    /// Input closed: let a bounded search finish and report, end a held one.
    pub fn finish(&mut self) {
        if self.holding_result {
            self.controller.stop_search();
        } else {
            self.controller.wait();
        }
    }
}

/// Read commands from stdin until `quit` or end of input.
pub fn run_uci_loop() {
    let stdin = io::stdin();
    let mut session = UciSession::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                log::warn!("failed to read input: {err}");
                break;
            }
        };
        if !session.handle_line(&line) {
            return;
        }
    }
    session.finish();
}
