use super::GenKind;
use crate::board::attack_tables::pawn_attacks;
use crate::board::{
    Board, ColoredPiece, Move, MoveFlags, MoveList, Piece, Square, PROMOTION_PIECES,
};

impl Board {
    pub(super) fn generate_pawn_moves(&self, kind: GenKind, moves: &mut MoveList) {
        let us = self.side;
        let pawn = ColoredPiece::new(us, Piece::Pawn);
        let enemies = self.occupancy(us.opponent());
        let occupied = self.all_occupancy();

        for from in self.pieces(us, Piece::Pawn) {
            let promotes = from.row() == us.pre_promotion_row();

            if kind == GenKind::All {
                if let Some(to) = from.offset(us.pawn_push()) {
                    if !occupied.contains(to) {
                        if promotes {
                            push_promotions(moves, from, to, pawn, MoveFlags::QUIET);
                        } else {
                            moves.push(Move::new(from, to, pawn, None, MoveFlags::QUIET));
                            if from.row() == us.pawn_start_row() {
                                if let Some(double) = to.offset(us.pawn_push()) {
                                    if !occupied.contains(double) {
                                        moves.push(Move::new(
                                            from,
                                            double,
                                            pawn,
                                            None,
                                            MoveFlags::DOUBLE_PUSH,
                                        ));
                                    }
                                }
                            }
                        }
                    }
                }
            }

            let attacks = pawn_attacks(us, from);
            for to in attacks & enemies {
                if promotes {
                    push_promotions(moves, from, to, pawn, MoveFlags::CAPTURE);
                } else {
                    moves.push(Move::new(from, to, pawn, None, MoveFlags::CAPTURE));
                }
            }

            if let Some(ep) = self.en_passant {
                if attacks.contains(ep) {
                    moves.push(Move::new(
                        from,
                        ep,
                        pawn,
                        None,
                        MoveFlags::CAPTURE | MoveFlags::EN_PASSANT,
                    ));
                }
            }
        }
    }
}

/// One move per promotion piece, queen first.
fn push_promotions(
    moves: &mut MoveList,
    from: Square,
    to: Square,
    pawn: ColoredPiece,
    flags: MoveFlags,
) {
    for promo in PROMOTION_PIECES {
        moves.push(Move::new(from, to, pawn, Some(promo), flags));
    }
}

#[cfg(test)]
mod tests {
    use crate::board::{Board, MoveList, Piece};

    #[test]
    fn promotion_fans_out_to_four_moves() {
        let board = Board::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1");
        let mut moves = MoveList::new();
        board.generate_moves(&mut moves);
        let promos: Vec<_> = moves.iter().filter(|m| m.is_promotion()).collect();
        assert_eq!(promos.len(), 4);
        assert_eq!(promos[0].promotion(), Some(Piece::Queen));
        assert!(promos.iter().all(|m| m.to_string().starts_with("a7a8")));
    }

    #[test]
    fn en_passant_is_offered_after_double_push() {
        let board = Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
        let mut moves = MoveList::new();
        board.generate_moves(&mut moves);
        let ep: Vec<_> = moves.iter().filter(|m| m.is_en_passant()).collect();
        assert_eq!(ep.len(), 1);
        assert_eq!(ep[0].to_string(), "e5f6");
        assert!(ep[0].is_capture());
    }

    #[test]
    fn blocked_pawn_cannot_double_push() {
        let board = Board::from_fen("4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1");
        let mut moves = MoveList::new();
        board.generate_moves(&mut moves);
        assert!(!moves.iter().any(|m| m.piece().piece == Piece::Pawn));
    }
}
