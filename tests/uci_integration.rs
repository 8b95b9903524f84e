use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use fe64::board::attack_tables;
use fe64::uci::parse_position;

fn spawn_engine() -> Child {
    let exe = env!("CARGO_BIN_EXE_fe64");
    Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to spawn engine binary")
}

/// Read lines until one starts with `prefix`, returning everything read.
fn read_until(reader: &mut BufReader<ChildStdout>, prefix: &str) -> (String, Option<String>) {
    let mut output = String::new();
    loop {
        let mut line = String::new();
        let bytes = reader.read_line(&mut line).expect("read failed");
        if bytes == 0 {
            return (output, None);
        }
        output.push_str(&line);
        if line.starts_with(prefix) {
            return (output, Some(line));
        }
    }
}

fn assert_legal_after(position: &str, bestmove: &str) {
    attack_tables::init().unwrap();
    let parts: Vec<&str> = bestmove.split_whitespace().collect();
    assert!(parts.len() >= 2, "bestmove missing move: {bestmove}");
    let mv = parts[1];
    assert_ne!(mv, "0000", "engine returned null move");

    let position: Vec<&str> = position.split_whitespace().collect();
    let (board, _) = parse_position(&position);
    assert!(board.parse_move(mv).is_ok(), "bestmove not legal in position: {mv}");
}

#[test]
fn uci_smoke_test_returns_legal_move() {
    let mut child = spawn_engine();
    let mut stdin = child.stdin.take().unwrap();
    let mut reader = BufReader::new(child.stdout.take().unwrap());

    stdin
        .write_all(b"uci\nisready\nposition startpos moves e2e4\ngo movetime 50\n")
        .unwrap();
    let (output, bestmove) = read_until(&mut reader, "bestmove");

    stdin.write_all(b"quit\n").unwrap();
    let _ = child.wait();

    assert!(output.contains("id name fe64"));
    assert!(output.contains("uciok"));
    assert!(output.contains("readyok"));
    assert!(output.contains("info depth"));
    assert!(output.contains("hashfull"));
    assert_legal_after(
        "position startpos moves e2e4",
        &bestmove.expect("no bestmove found"),
    );
}

#[test]
fn uci_reports_options_and_handles_setoption() {
    let mut child = spawn_engine();

    let input = b"uci\nsetoption name Hash value 8\nsetoption name Contempt value 0\nsetoption name Move Overhead value 0\nsetoption name Ponder value true\nsetoption name Clear Hash\nsetoption name Threads value 4\nisready\nquit\n";
    child.stdin.as_mut().unwrap().write_all(input).unwrap();

    let output = child.wait_with_output().expect("failed to read output");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("option name Hash type spin"));
    assert!(stdout.contains("option name Contempt type spin"));
    assert!(stdout.contains("option name Ponder type check"));
    assert!(stdout.contains("option name Move Overhead type spin"));
    assert!(stdout.contains("option name Clear Hash type button"));
    assert!(stdout.contains("readyok"));
}

#[test]
fn uci_go_depth_returns_legal_move() {
    let mut child = spawn_engine();
    let mut stdin = child.stdin.take().unwrap();
    let mut reader = BufReader::new(child.stdout.take().unwrap());

    stdin
        .write_all(b"uci\nisready\nposition startpos\ngo depth 3\n")
        .unwrap();
    let (output, bestmove) = read_until(&mut reader, "bestmove");

    stdin.write_all(b"quit\n").unwrap();
    let _ = child.wait();

    assert!(output.contains("info depth 3 "));
    assert!(!output.contains("info depth 4 "));
    assert_legal_after("position startpos", &bestmove.expect("no bestmove found"));
}

#[test]
fn uci_perft_command_outputs_nodes() {
    let mut child = spawn_engine();
    let mut stdin = child.stdin.take().unwrap();
    let mut reader = BufReader::new(child.stdout.take().unwrap());

    stdin
        .write_all(b"uci\nisready\nposition startpos\nperft 1\n")
        .unwrap();
    let (output, total) = read_until(&mut reader, "Nodes searched");

    stdin.write_all(b"quit\n").unwrap();
    let _ = child.wait();

    assert_eq!(total.as_deref().map(str::trim), Some("Nodes searched: 20"));
    assert!(output.contains("e2e4: 1"));
    assert!(output.contains("g1f3: 1"));
}

#[test]
fn uci_stop_interrupts_search() {
    let mut child = spawn_engine();
    let stdin = Arc::new(Mutex::new(child.stdin.take().unwrap()));
    let mut reader = BufReader::new(child.stdout.take().unwrap());

    stdin
        .lock()
        .unwrap()
        .write_all(b"uci\nisready\nposition startpos\ngo infinite\n")
        .unwrap();

    let stdin_clone = Arc::clone(&stdin);
    let stop_thread = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        let _ = stdin_clone.lock().unwrap().write_all(b"stop\n");
    });

    let (_, bestmove) = read_until(&mut reader, "bestmove");

    let _ = stop_thread.join();
    stdin.lock().unwrap().write_all(b"quit\n").unwrap();
    let _ = child.wait();

    assert_legal_after("position startpos", &bestmove.expect("no bestmove found"));
}

#[test]
fn uci_mated_position_reports_null_move() {
    let mut child = spawn_engine();
    let mut stdin = child.stdin.take().unwrap();
    let mut reader = BufReader::new(child.stdout.take().unwrap());

    stdin
        .write_all(b"position fen rnb1kbnr/pppp1ppp/4p3/8/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3\ngo depth 3\n")
        .unwrap();
    let (_, bestmove) = read_until(&mut reader, "bestmove");

    stdin.write_all(b"quit\n").unwrap();
    let _ = child.wait();

    assert_eq!(bestmove.as_deref().map(str::trim), Some("bestmove 0000"));
}

#[test]
fn uci_finishes_bounded_search_at_end_of_input() {
    let mut child = spawn_engine();
    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(b"position startpos moves d2d4\ngo depth 2\n")
        .unwrap();

    // Dropping stdin closes it without a quit
    let output = child.wait_with_output().expect("failed to read output");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let bestmove = stdout
        .lines()
        .find(|line| line.starts_with("bestmove"))
        .expect("no bestmove before exit");
    assert_legal_after("position startpos moves d2d4", bestmove);
}
