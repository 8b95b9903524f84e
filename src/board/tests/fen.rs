//! FEN parsing, validation and serialization tests.

use crate::board::{Board, Color, FenError, Piece, Square, START_FEN};

#[test]
fn start_position_round_trips() {
    let board = Board::try_from_fen(START_FEN).unwrap();
    assert_eq!(board.to_fen(), START_FEN);
    assert_eq!(board.hash(), Board::new().hash());
}

#[test]
fn canonical_fens_round_trip() {
    for fen in [
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    ] {
        assert_eq!(Board::try_from_fen(fen).unwrap().to_fen(), fen);
    }
}

#[test]
fn counters_are_parsed_and_defaulted() {
    let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 57 30");
    assert_eq!(board.halfmove_clock(), 57);
    assert_eq!(board.fullmove_number(), 30);

    let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 b - -");
    assert_eq!(board.halfmove_clock(), 0);
    assert_eq!(board.fullmove_number(), 1);
    assert_eq!(board.side_to_move(), Color::Black);
    assert_eq!(board.to_fen(), "4k3/8/8/8/8/8/8/4K3 b - - 0 1");
}

#[test]
fn castling_without_rook_is_dropped() {
    let board = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w KQkq - 0 1");
    assert!(board.castling_rights().has(Color::White, true));
    assert!(!board.castling_rights().has(Color::White, false));
    assert!(!board.castling_rights().has(Color::Black, true));
    assert_eq!(board.to_fen(), "4k3/8/8/8/8/8/8/4K2R w K - 0 1");
}

#[test]
fn impossible_en_passant_is_dropped() {
    let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - e6 0 1");
    assert_eq!(board.en_passant(), None);
    assert_eq!(board.hash(), board.full_hash());
}

#[test]
fn parse_errors() {
    assert_eq!(Board::try_from_fen("").unwrap_err(), FenError::Empty);
    assert_eq!(
        Board::try_from_fen("4k3/8/8/8/8/8/8/4K3").unwrap_err(),
        FenError::MissingField {
            field: "side to move"
        }
    );
    assert!(matches!(
        Board::try_from_fen("4k3/8/8/8/8/8/8/4K3 x - - 0 1"),
        Err(FenError::InvalidSideToMove { .. })
    ));
    assert_eq!(
        Board::try_from_fen("4k3/8/8/8/8/8/8/8/4K3 w - - 0 1").unwrap_err(),
        FenError::TooManyRanks { ranks: 9 }
    );
    assert!(matches!(
        Board::try_from_fen("4k3/9/8/8/8/8/8/4K3 w - - 0 1"),
        Err(FenError::TooManyFiles { rank: 7, .. })
    ));
    assert!(matches!(
        Board::try_from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1"),
        Err(FenError::MissingKing { .. })
    ));
    assert!(matches!(
        Board::try_from_fen("4k2k/8/8/8/8/8/8/4K3 w - - 0 1"),
        Err(FenError::TooManyKings { .. })
    ));
    assert_eq!(
        Board::try_from_fen("4k3/8/8/8/8/8/8/4R1K1 w - - 0 1").unwrap_err(),
        FenError::OpponentInCheck
    );
}

#[test]
fn lenient_parse_falls_back_to_start() {
    let board = Board::from_fen("this is not a fen");
    assert_eq!(board.to_fen(), START_FEN);
}

#[test]
fn from_str_matches_try_from_fen() {
    let board: Board = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1".parse().unwrap();
    let e2: Square = "e2".parse().unwrap();
    assert_eq!(
        board.pieces(Color::White, Piece::Pawn),
        crate::board::Bitboard::from_square(e2)
    );
    assert!("".parse::<Board>().is_err());
}
