//! Static evaluation.
//!
//! The search only sees the [`Evaluator`] trait. [`HandCraftedEvaluator`] is
//! the built-in implementation: a tapered PeSTO material/PST score plus a
//! handful of pawn-structure, rook, mobility and king-shelter terms.

use std::ops::{AddAssign, SubAssign};

use super::attack_tables::{bishop_attacks, king_attacks, knight_attacks, rook_attacks};
use super::{Bitboard, Board, Color, Piece, Square};

/// Evaluations are clamped to this magnitude, well clear of mate scores.
pub const MAX_EVAL: i32 = 20_000;

/// A position scorer consumed by the search.
///
/// Implementations must be deterministic and side-to-move relative: a
/// positive score favors the side to move.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, board: &Board) -> i32;
}

/// Tapered hand-crafted evaluation.
#[derive(Clone, Copy, Debug, Default)]
pub struct HandCraftedEvaluator;

impl Evaluator for HandCraftedEvaluator {
    fn evaluate(&self, board: &Board) -> i32 {
        let mut total = Tapered::default();
        for color in Color::BOTH {
            let side = side_terms(board, color);
            if color == Color::White {
                total += side;
            } else {
                total -= side;
            }
        }

        let phase = board.game_phase();
        let white_pov = (total.mg * phase + total.eg * (MAX_PHASE - phase)) / MAX_PHASE;
        let score = match board.side_to_move() {
            Color::White => white_pov,
            Color::Black => -white_pov,
        };
        (score + TEMPO).clamp(-MAX_EVAL, MAX_EVAL)
    }
}

impl Board {
    /// Static score from the built-in evaluator, side-to-move relative.
    #[must_use]
    pub fn evaluate(&self) -> i32 {
        HandCraftedEvaluator.evaluate(self)
    }

    /// Knights and bishops count 1, rooks 2, queens 4 (both sides, capped
    /// at 24). 24 is the opening, 0 bare kings and pawns.
    #[must_use]
    pub fn game_phase(&self) -> i32 {
        let mut phase = 0;
        for color in Color::BOTH {
            for piece in Piece::ALL {
                phase += self.pieces(color, piece).popcount() as i32 * PHASE_WEIGHT[piece.index()];
            }
        }
        phase.min(MAX_PHASE)
    }
}

const MATERIAL_MG: [i32; 6] = [82, 337, 365, 477, 1025, 0];
const MATERIAL_EG: [i32; 6] = [94, 281, 297, 512, 936, 0];

const PHASE_WEIGHT: [i32; 6] = [0, 1, 1, 2, 4, 0];
const MAX_PHASE: i32 = 24;

const TEMPO: i32 = 10;
const BISHOP_PAIR: Tapered = Tapered::new(30, 50);
const ROOK_OPEN_FILE: i32 = 25;
const ROOK_SEMI_OPEN_FILE: i32 = 15;
const ROOK_ON_SEVENTH: i32 = 30;
const DOUBLED_PAWN: i32 = 12;
const ISOLATED_PAWN: i32 = 12;
const KING_SHELTER_PAWN: i32 = 10;

// Indexed by rows left to promote (0 would be the promotion row)
const PASSED_PAWN_MG: [i32; 8] = [0, 140, 100, 65, 40, 20, 10, 0];
const PASSED_PAWN_EG: [i32; 8] = [0, 250, 180, 130, 80, 40, 20, 0];

// Per reachable square
const MOBILITY: [i32; 6] = [0, 4, 5, 2, 1, 0];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Tapered {
    mg: i32,
    eg: i32,
}

impl Tapered {
    const fn new(mg: i32, eg: i32) -> Self {
        Tapered { mg, eg }
    }

    const fn both(value: i32) -> Self {
        Tapered { mg: value, eg: value }
    }
}

impl AddAssign for Tapered {
    fn add_assign(&mut self, rhs: Self) {
        self.mg += rhs.mg;
        self.eg += rhs.eg;
    }
}

impl SubAssign for Tapered {
    fn sub_assign(&mut self, rhs: Self) {
        self.mg -= rhs.mg;
        self.eg -= rhs.eg;
    }
}

/// Tables are laid out a8 first from White's point of view.
#[inline]
fn pst_index(color: Color, sq: Square) -> usize {
    match color {
        Color::White => sq.index(),
        Color::Black => sq.flip().index(),
    }
}

/// Rows between a pawn and its promotion row.
#[inline]
fn rows_to_promotion(color: Color, sq: Square) -> usize {
    match color {
        Color::White => sq.row() as usize,
        Color::Black => 7 - sq.row() as usize,
    }
}

/// Squares strictly in front of `sq` (toward promotion) on the three files around it.
fn passed_pawn_span(color: Color, sq: Square) -> Bitboard {
    let file = sq.file();
    let mut files = Bitboard::file_mask(file);
    if file > 0 {
        files |= Bitboard::file_mask(file - 1);
    }
    if file < 7 {
        files |= Bitboard::file_mask(file + 1);
    }
    let row_start = sq.row() as u32 * 8;
    let ahead = match color {
        Color::White => Bitboard((1u64 << row_start) - 1),
        Color::Black if sq.row() == 7 => Bitboard::EMPTY,
        Color::Black => Bitboard(!((1u64 << (row_start + 8)) - 1)),
    };
    files & ahead
}

fn side_terms(board: &Board, color: Color) -> Tapered {
    let mut score = Tapered::default();
    let own = board.occupancy(color);
    let occupied = board.all_occupancy();
    let own_pawns = board.pieces(color, Piece::Pawn);
    let enemy_pawns = board.pieces(color.opponent(), Piece::Pawn);

    for piece in Piece::ALL {
        let idx = piece.index();
        for sq in board.pieces(color, piece) {
            let pst = pst_index(color, sq);
            score += Tapered::new(
                MATERIAL_MG[idx] + PST_MG[idx][pst],
                MATERIAL_EG[idx] + PST_EG[idx][pst],
            );

            let reach = match piece {
                Piece::Knight => knight_attacks(sq),
                Piece::Bishop => bishop_attacks(sq, occupied),
                Piece::Rook => rook_attacks(sq, occupied),
                Piece::Queen => bishop_attacks(sq, occupied) | rook_attacks(sq, occupied),
                Piece::Pawn | Piece::King => Bitboard::EMPTY,
            };
            score += Tapered::both((reach & !own).popcount() as i32 * MOBILITY[idx]);
        }
    }

    if board.pieces(color, Piece::Bishop).popcount() >= 2 {
        score += BISHOP_PAIR;
    }

    let seventh_row = color.pre_promotion_row();
    for sq in board.pieces(color, Piece::Rook) {
        let file = Bitboard::file_mask(sq.file());
        if (file & own_pawns).is_empty() {
            let bonus = if (file & enemy_pawns).is_empty() {
                ROOK_OPEN_FILE
            } else {
                ROOK_SEMI_OPEN_FILE
            };
            score += Tapered::both(bonus);
        }
        if sq.row() == seventh_row {
            score += Tapered::both(ROOK_ON_SEVENTH);
        }
    }

    for file in 0..8u8 {
        let on_file = (own_pawns & Bitboard::file_mask(file)).popcount() as i32;
        if on_file == 0 {
            continue;
        }
        if on_file > 1 {
            score -= Tapered::both(DOUBLED_PAWN * (on_file - 1));
        }
        let left = file > 0 && !(own_pawns & Bitboard::file_mask(file - 1)).is_empty();
        let right = file < 7 && !(own_pawns & Bitboard::file_mask(file + 1)).is_empty();
        if !left && !right {
            score -= Tapered::both(ISOLATED_PAWN * on_file);
        }
    }

    for sq in own_pawns {
        if (passed_pawn_span(color, sq) & enemy_pawns).is_empty() {
            let rows = rows_to_promotion(color, sq);
            score += Tapered::new(PASSED_PAWN_MG[rows], PASSED_PAWN_EG[rows]);
        }
    }

    if let Some(king) = board.king_square(color) {
        let shelter = (king_attacks(king) & own_pawns).popcount() as i32;
        score += Tapered::new(shelter * KING_SHELTER_PAWN, 0);
    }

    score
}

const PST_MG: [[i32; 64]; 6] = [
    // pawn
    [
        0, 0, 0, 0, 0, 0, 0, 0,
        98, 134, 61, 95, 68, 126, 34, -11,
        -6, 7, 26, 31, 65, 56, 25, -20,
        -14, 13, 6, 21, 23, 12, 17, -23,
        -27, -2, -5, 12, 17, 6, 10, -25,
        -26, -4, -4, -10, 3, 3, 33, -12,
        -35, -1, -20, -23, -15, 24, 38, -22,
        0, 0, 0, 0, 0, 0, 0, 0,
    ],
    // knight
    [
        -167, -89, -34, -49, 61, -97, -15, -107,
        -73, -41, 72, 36, 23, 62, 7, -17,
        -47, 60, 37, 65, 84, 129, 73, 44,
        -9, 17, 19, 53, 37, 69, 18, 22,
        -13, 4, 16, 13, 28, 19, 21, -8,
        -23, -9, 12, 10, 19, 17, 25, -16,
        -29, -53, -12, -3, -1, 18, -14, -19,
        -105, -21, -58, -33, -17, -28, -19, -23,
    ],
    // bishop
    [
        -29, 4, -82, -37, -25, -42, 7, -8,
        -26, 16, -18, -13, 30, 59, 18, -47,
        -16, 37, 43, 40, 35, 50, 37, -2,
        -4, 5, 19, 50, 37, 37, 7, -2,
        -6, 13, 13, 26, 34, 12, 10, 4,
        0, 15, 15, 15, 14, 27, 18, 10,
        4, 15, 16, 0, 7, 21, 33, 1,
        -33, -3, -14, -21, -13, -12, -39, -21,
    ],
    // rook
    [
        32, 42, 32, 51, 63, 9, 31, 43,
        27, 32, 58, 62, 80, 67, 26, 44,
        -5, 19, 26, 36, 17, 45, 61, 16,
        -24, -11, 7, 26, 24, 35, -8, -20,
        -36, -26, -12, -1, 9, -7, 6, -23,
        -45, -25, -16, -17, 3, 0, -5, -33,
        -44, -16, -20, -9, -1, 11, -6, -71,
        -19, -13, 1, 17, 16, 7, -37, -26,
    ],
    // queen
    [
        -28, 0, 29, 12, 59, 44, 43, 45,
        -24, -39, -5, 1, -16, 57, 28, 54,
        -13, -17, 7, 8, 29, 56, 47, 57,
        -27, -27, -16, -16, -1, 17, -2, 1,
        -9, -26, -9, -10, -2, -4, 3, -3,
        -14, 2, -11, -2, -5, 2, 14, 5,
        -35, -8, 11, 2, 8, 15, -3, 1,
        -1, -18, -9, 10, -15, -25, -31, -50,
    ],
    // king
    [
        -65, 23, 16, -15, -56, -34, 2, 13,
        29, -1, -20, -7, -8, -4, -38, -29,
        -9, 24, 2, -16, -20, 6, 22, -22,
        -17, -20, -12, -27, -30, -25, -14, -36,
        -49, -1, -27, -39, -46, -44, -33, -51,
        -14, -14, -22, -46, -44, -30, -15, -27,
        1, 7, -8, -64, -43, -16, 9, 8,
        -15, 36, 12, -54, 8, -28, 34, 14,
    ],
];

const PST_EG: [[i32; 64]; 6] = [
    // pawn
    [
        0, 0, 0, 0, 0, 0, 0, 0,
        178, 173, 158, 134, 147, 132, 165, 187,
        94, 100, 85, 67, 56, 53, 82, 84,
        32, 24, 13, 5, -2, 4, 17, 17,
        13, 9, -3, -7, -7, -8, 3, -1,
        4, 7, -6, 1, 0, -5, -1, -8,
        13, 8, 8, 10, 13, 0, 2, -7,
        0, 0, 0, 0, 0, 0, 0, 0,
    ],
    // knight
    [
        -58, -38, -13, -28, -31, -27, -63, -99,
        -25, -8, -25, -2, -9, -25, -24, -52,
        -24, -20, 10, 9, -1, -9, -19, -41,
        -17, 3, 22, 22, 22, 11, 8, -18,
        -18, -6, 16, 25, 16, 17, 4, -18,
        -23, -3, -1, 15, 10, -3, -20, -22,
        -42, -20, -10, -5, -2, -20, -23, -44,
        -29, -51, -23, -15, -22, -18, -50, -64,
    ],
    // bishop
    [
        -14, -21, -11, -8, -7, -9, -17, -24,
        -8, -4, 7, -12, -3, -13, -4, -14,
        2, -8, 0, -1, -2, 6, 0, 4,
        -3, 9, 12, 9, 14, 10, 3, 2,
        -6, 3, 13, 19, 7, 10, -3, -9,
        -12, -3, 8, 10, 13, 3, -7, -15,
        -14, -18, -7, -1, 4, -9, -15, -27,
        -23, -9, -23, -5, -9, -16, -5, -17,
    ],
    // rook
    [
        13, 10, 18, 15, 12, 12, 8, 5,
        11, 13, 13, 11, -3, 3, 8, 3,
        7, 7, 7, 5, 4, -3, -5, -3,
        4, 3, 13, 1, 2, 1, -1, 2,
        3, 5, 8, 4, -5, -6, -8, -11,
        -4, 0, -5, -1, -7, -12, -8, -16,
        -6, -6, 0, 2, -9, -9, -11, -3,
        -9, 2, 3, -1, -5, -13, 4, -20,
    ],
    // queen
    [
        -9, 22, 22, 27, 27, 19, 10, 20,
        -17, 20, 32, 41, 58, 25, 30, 0,
        -20, 6, 9, 49, 47, 35, 19, 9,
        3, 22, 24, 45, 57, 40, 57, 36,
        -18, 28, 19, 47, 31, 34, 39, 23,
        -16, -27, 15, 6, 9, 17, 10, 5,
        -22, -23, -30, -16, -16, -23, -36, -32,
        -33, -28, -22, -43, -5, -32, -20, -41,
    ],
    // king
    [
        -74, -35, -18, -18, -11, 15, 4, -17,
        -12, 17, 14, 17, 17, 38, 23, 11,
        10, 17, 23, 15, 20, 45, 44, 13,
        -8, 22, 24, 27, 26, 33, 26, 3,
        -18, -4, 21, 24, 27, 23, 9, -11,
        -19, -3, 11, 21, 23, 16, 7, -9,
        -27, -11, 4, 13, 14, 4, -5, -17,
        -53, -34, -21, -11, -28, -14, -24, -43,
    ],
];

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(fen: &str) -> i32 {
        HandCraftedEvaluator.evaluate(&Board::from_fen(fen))
    }

    #[test]
    fn start_position_is_tempo_only() {
        assert_eq!(Board::new().evaluate(), TEMPO);
    }

    #[test]
    fn mirrored_positions_score_the_same() {
        let white = eval("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4");
        let black = eval("rnbqk2r/pppp1ppp/5n2/2b1p3/4P3/2N2N2/PPPP1PPP/R1BQKB1R b KQkq - 4 4");
        assert_eq!(white, black);
    }

    #[test]
    fn extra_queen_is_winning_for_its_owner() {
        let fen_w = "4k3/8/8/8/8/8/8/3QK3 w - - 0 1";
        let fen_b = "4k3/8/8/8/8/8/8/3QK3 b - - 0 1";
        assert!(eval(fen_w) > 800);
        assert!(eval(fen_b) < -800);
    }

    #[test]
    fn advanced_passer_outscores_blocked_pawn() {
        let passed = eval("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let held = eval("4k3/p7/P7/8/8/8/8/4K3 w - - 0 1");
        assert!(passed > held);
    }

    #[test]
    fn passed_span_covers_adjacent_files_ahead() {
        let e4: Square = "e4".parse().unwrap();
        let span = passed_pawn_span(Color::White, e4);
        assert!(span.contains("d7".parse().unwrap()));
        assert!(span.contains("f5".parse().unwrap()));
        assert!(!span.contains("e4".parse().unwrap()));
        assert!(!span.contains("c5".parse().unwrap()));
        let black = passed_pawn_span(Color::Black, e4);
        assert!(black.contains("d3".parse().unwrap()));
        assert!(!black.contains("e5".parse().unwrap()));
    }

    #[test]
    fn phase_runs_from_opening_to_bare_kings() {
        assert_eq!(Board::new().game_phase(), MAX_PHASE);
        assert_eq!(Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").game_phase(), 0);
    }

    #[test]
    fn scores_stay_inside_the_clamp() {
        let score = eval("7k/8/8/8/8/8/QQQQQQ2/QQQQK3 b - - 0 1");
        assert!(score.abs() <= MAX_EVAL);
    }
}
