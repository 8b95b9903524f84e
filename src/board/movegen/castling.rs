use crate::board::{Bitboard, Board, Color, ColoredPiece, Move, MoveFlags, MoveList, Piece, Square};

/// Everything needed to test and emit one castling move.
struct CastleRoute {
    color: Color,
    kingside: bool,
    king_from: Square,
    king_to: Square,
    /// Squares between king and rook that must be empty
    empty: [Option<Square>; 3],
    /// Squares the king stands on or crosses, which must not be attacked
    safe: [Square; 3],
}

const CASTLES: [CastleRoute; 4] = [
    CastleRoute {
        color: Color::White,
        kingside: true,
        king_from: Square::E1,
        king_to: Square::G1,
        empty: [Some(Square::F1), Some(Square::G1), None],
        safe: [Square::E1, Square::F1, Square::G1],
    },
    CastleRoute {
        color: Color::White,
        kingside: false,
        king_from: Square::E1,
        king_to: Square::C1,
        empty: [Some(Square::D1), Some(Square::C1), Some(Square::B1)],
        safe: [Square::E1, Square::D1, Square::C1],
    },
    CastleRoute {
        color: Color::Black,
        kingside: true,
        king_from: Square::E8,
        king_to: Square::G8,
        empty: [Some(Square::F8), Some(Square::G8), None],
        safe: [Square::E8, Square::F8, Square::G8],
    },
    CastleRoute {
        color: Color::Black,
        kingside: false,
        king_from: Square::E8,
        king_to: Square::C8,
        empty: [Some(Square::D8), Some(Square::C8), Some(Square::B8)],
        safe: [Square::E8, Square::D8, Square::C8],
    },
];

impl Board {
    /// Castling is offered only with the right set, the path empty, and the
    /// king's start, transit and destination squares unattacked.
    pub(super) fn generate_castling_moves(&self, moves: &mut MoveList) {
        let us = self.side;
        let them = us.opponent();
        let occupied = self.all_occupancy();

        for route in CASTLES.iter().filter(|route| route.color == us) {
            if !self.castling.has(us, route.kingside) {
                continue;
            }
            let path = route
                .empty
                .iter()
                .flatten()
                .fold(Bitboard::EMPTY, |acc, &sq| acc.with(sq));
            if !(path & occupied).is_empty() {
                continue;
            }
            if route.safe.iter().any(|&sq| self.is_square_attacked(sq, them)) {
                continue;
            }
            moves.push(Move::new(
                route.king_from,
                route.king_to,
                ColoredPiece::new(us, Piece::King),
                None,
                MoveFlags::CASTLING,
            ));
        }
    }
}

/// Rook source and destination for a castling move landing on `king_to`.
pub(crate) fn castling_rook_squares(king_to: Square) -> Option<(Square, Square)> {
    match king_to {
        Square::G1 => Some((Square::H1, Square::F1)),
        Square::C1 => Some((Square::A1, Square::D1)),
        Square::G8 => Some((Square::H8, Square::F8)),
        Square::C8 => Some((Square::A8, Square::D8)),
        _ => None,
    }
}
