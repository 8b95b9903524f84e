//! Attack masks for leaper pieces (pawns, knights, kings).

use crate::board::types::{Bitboard, Color};

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

const KING_DELTAS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Set of squares reached from `sq` by each (row, file) delta that stays on the board.
fn leaper_mask(sq: usize, deltas: &[(i8, i8)]) -> Bitboard {
    let row = (sq / 8) as i8;
    let file = (sq % 8) as i8;
    let mut mask = 0u64;
    for &(dr, df) in deltas {
        let nr = row + dr;
        let nf = file + df;
        if (0..8).contains(&nr) && (0..8).contains(&nf) {
            mask |= 1u64 << (nr as usize * 8 + nf as usize);
        }
    }
    Bitboard(mask)
}

pub(super) fn knight_table() -> [Bitboard; 64] {
    std::array::from_fn(|sq| leaper_mask(sq, &KNIGHT_DELTAS))
}

pub(super) fn king_table() -> [Bitboard; 64] {
    std::array::from_fn(|sq| leaper_mask(sq, &KING_DELTAS))
}

/// Pawn capture masks. White pawns attack toward row 0 (rank 8).
pub(super) fn pawn_table() -> [[Bitboard; 64]; 2] {
    let mut table = [[Bitboard::EMPTY; 64]; 2];
    for color in Color::BOTH {
        let dr = match color {
            Color::White => -1,
            Color::Black => 1,
        };
        for (sq, slot) in table[color.index()].iter_mut().enumerate() {
            *slot = leaper_mask(sq, &[(dr, -1), (dr, 1)]);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::Square;

    #[test]
    fn knight_in_corner_has_two_targets() {
        let table = knight_table();
        let a8 = table[Square::A8.index()];
        assert_eq!(a8.popcount(), 2);
        assert!(a8.contains("b6".parse().unwrap()));
        assert!(a8.contains("c7".parse().unwrap()));
    }

    #[test]
    fn king_centre_has_eight_targets() {
        let table = king_table();
        assert_eq!(table["e4".parse::<Square>().unwrap().index()].popcount(), 8);
        assert_eq!(table[Square::H1.index()].popcount(), 3);
    }

    #[test]
    fn pawn_attacks_point_forward() {
        let table = pawn_table();
        let e4: Square = "e4".parse().unwrap();
        let white = table[Color::White.index()][e4.index()];
        let black = table[Color::Black.index()][e4.index()];
        assert!(white.contains("d5".parse().unwrap()) && white.contains("f5".parse().unwrap()));
        assert!(black.contains("d3".parse().unwrap()) && black.contains("f3".parse().unwrap()));
        // no wrap from the a-file
        assert_eq!(table[Color::White.index()][Square::A1.index()].popcount(), 1);
    }
}
