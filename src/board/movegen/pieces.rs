use super::GenKind;
use crate::board::attack_tables::{
    bishop_attacks, king_attacks, knight_attacks, queen_attacks, rook_attacks,
};
use crate::board::{Bitboard, Board, ColoredPiece, Move, MoveFlags, MoveList, Piece};

const PIECE_ORDER: [Piece; 5] = [
    Piece::Knight,
    Piece::Bishop,
    Piece::Rook,
    Piece::Queen,
    Piece::King,
];

impl Board {
    /// Knight, slider and king moves (castling excluded).
    pub(super) fn generate_piece_moves(&self, kind: GenKind, moves: &mut MoveList) {
        let us = self.side;
        let own = self.occupancy(us);
        let enemies = self.occupancy(us.opponent());
        let occupied = self.all_occupancy();
        let targets = match kind {
            GenKind::All => !own,
            GenKind::Captures => enemies,
        };

        for piece in PIECE_ORDER {
            let mover = ColoredPiece::new(us, piece);
            for from in self.pieces(us, piece) {
                let attacks: Bitboard = match piece {
                    Piece::Knight => knight_attacks(from),
                    Piece::Bishop => bishop_attacks(from, occupied),
                    Piece::Rook => rook_attacks(from, occupied),
                    Piece::Queen => queen_attacks(from, occupied),
                    Piece::King => king_attacks(from),
                    Piece::Pawn => Bitboard::EMPTY,
                };
                for to in attacks & targets {
                    let flags = if enemies.contains(to) {
                        MoveFlags::CAPTURE
                    } else {
                        MoveFlags::QUIET
                    };
                    moves.push(Move::new(from, to, mover, None, flags));
                }
            }
        }
    }
}
