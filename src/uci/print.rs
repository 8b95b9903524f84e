use std::io::{self, Write};
use std::time::Duration;

use crate::board::search::{SearchIterationInfo, SearchResult};
use crate::board::{Board, Move};

/// Write one protocol line to stdout and flush it.
pub fn send(line: &str) {
    let mut stdout = io::stdout().lock();
    // A closed stdout means the GUI is gone; the read loop ends on its own
    let _ = writeln!(stdout, "{line}");
    let _ = stdout.flush();
}

#[must_use]
pub fn format_info(info: &SearchIterationInfo) -> String {
    let score = match info.mate_in {
        Some(moves) => format!("mate {moves}"),
        None => format!("cp {}", info.score),
    };
    let mut line = format!(
        "info depth {} seldepth {} score {} nodes {} nps {} time {} hashfull {}",
        info.depth, info.seldepth, score, info.nodes, info.nps, info.time_ms, info.hashfull
    );
    if !info.pv.is_empty() {
        line.push_str(" pv ");
        line.push_str(&join_moves(&info.pv));
    }
    line
}

#[must_use]
pub fn format_bestmove(result: &SearchResult) -> String {
    match (result.best_move, result.ponder_move) {
        (Some(best), Some(ponder)) => format!("bestmove {best} ponder {ponder}"),
        (Some(best), None) => format!("bestmove {best}"),
        (None, _) => format!("bestmove {}", Move::NULL),
    }
}

pub fn print_info(info: &SearchIterationInfo) {
    send(&format_info(info));
}

pub fn print_bestmove(result: &SearchResult) {
    send(&format_bestmove(result));
}

pub fn print_perft(divide: &[(Move, u64)], elapsed: Duration) {
    let mut total = 0;
    for (mv, nodes) in divide {
        send(&format!("{mv}: {nodes}"));
        total += nodes;
    }
    send("");
    send(&format!("Nodes searched: {total}"));
    log::debug!("perft finished in {} ms", elapsed.as_millis());
}

pub fn print_board(board: &Board) {
    send(&format!("Fen: {}", board.to_fen()));
    send(&format!("Key: {:016X}", board.hash()));
    if board.in_check() {
        send("Side to move is in check");
    }
}

fn join_moves(moves: &[Move]) -> String {
    moves
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(score: i32, mate_in: Option<i32>, pv: Vec<Move>) -> SearchIterationInfo {
        SearchIterationInfo {
            depth: 6,
            seldepth: 9,
            score,
            mate_in,
            nodes: 12345,
            nps: 600_000,
            time_ms: 20,
            hashfull: 3,
            pv,
        }
    }

    #[test]
    fn centipawn_info_line() {
        let board = Board::new();
        let e4 = board.parse_move("e2e4").unwrap();
        assert_eq!(
            format_info(&info(31, None, vec![e4])),
            "info depth 6 seldepth 9 score cp 31 nodes 12345 nps 600000 time 20 hashfull 3 pv e2e4"
        );
    }

    #[test]
    fn mate_info_line() {
        let line = format_info(&info(48_999, Some(1), Vec::new()));
        assert!(line.contains("score mate 1 "));
        assert!(!line.contains(" pv"));
        let line = format_info(&info(-48_998, Some(-1), Vec::new()));
        assert!(line.contains("score mate -1 "));
    }

    #[test]
    fn bestmove_lines() {
        let board = Board::new();
        let e4 = board.parse_move("e2e4").unwrap();
        let mut after = board;
        after.play_moves(["e2e4"]);
        let e5 = after.parse_move("e7e5").unwrap();

        let mut result = SearchResult {
            best_move: Some(e4),
            ponder_move: Some(e5),
            score: 0,
            depth: 1,
            nodes: 1,
        };
        assert_eq!(format_bestmove(&result), "bestmove e2e4 ponder e7e5");
        result.ponder_move = None;
        assert_eq!(format_bestmove(&result), "bestmove e2e4");
        result.best_move = None;
        assert_eq!(format_bestmove(&result), "bestmove 0000");
    }
}
