use super::attack_tables::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use super::{Bitboard, CastlingRights, Color, ColoredPiece, Piece, Square};
use crate::zobrist::ZOBRIST;

/// Index of the combined occupancy in `Board::occupancy`.
pub(crate) const BOTH: usize = 2;

/// A chess position.
///
/// The board is a plain value: search copies it into a [`Snapshot`] before a
/// tentative move and writes the copy back on the way out, so no undo
/// records are needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Board {
    /// One bitboard per colored piece, indexed by `ColoredPiece::index`.
    pub(crate) pieces: [Bitboard; 12],
    /// White, black, both. Always the union of the matching piece bitboards.
    pub(crate) occupancy: [Bitboard; 3],
    pub(crate) side: Color,
    pub(crate) en_passant: Option<Square>,
    pub(crate) castling: CastlingRights,
    pub(crate) hash: u64,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
}

/// A saved copy of a [`Board`], taken before a tentative move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct Snapshot(Board);

impl Board {
    /// The standard starting position.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Board::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, &piece) in back_rank.iter().enumerate() {
            let file = file as u8;
            for (color, back, pawns) in [(Color::White, 0, 1), (Color::Black, 7, 6)] {
                if let Some(sq) = Square::from_coords(file, back) {
                    board.put_piece(ColoredPiece::new(color, piece), sq);
                }
                if let Some(sq) = Square::from_coords(file, pawns) {
                    board.put_piece(ColoredPiece::new(color, Piece::Pawn), sq);
                }
            }
        }
        board.castling = CastlingRights::all();
        board.refresh_occupancy();
        board.hash = board.full_hash();
        board
    }

    /// A board with no pieces, White to move.
    #[must_use]
    pub fn empty() -> Self {
        Board {
            pieces: [Bitboard::EMPTY; 12],
            occupancy: [Bitboard::EMPTY; 3],
            side: Color::White,
            en_passant: None,
            castling: CastlingRights::none(),
            hash: 0,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    #[inline]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(*self)
    }

    #[inline]
    pub fn restore(&mut self, snapshot: Snapshot) {
        *self = snapshot.0;
    }

    #[inline]
    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side
    }

    #[inline]
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    #[must_use]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    #[must_use]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[inline]
    #[must_use]
    pub fn pieces(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[ColoredPiece::new(color, piece).index()]
    }

    #[inline]
    #[must_use]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.occupancy[color.index()]
    }

    #[inline]
    #[must_use]
    pub fn all_occupancy(&self) -> Bitboard {
        self.occupancy[BOTH]
    }

    /// The piece on `sq`, if any.
    #[must_use]
    pub fn piece_on(&self, sq: Square) -> Option<ColoredPiece> {
        if !self.all_occupancy().contains(sq) {
            return None;
        }
        self.pieces
            .iter()
            .position(|bb| bb.contains(sq))
            .map(ColoredPiece::from_index)
    }

    /// Piece kind of `color` on `sq`, searching only that side's bitboards.
    #[inline]
    pub(crate) fn piece_of(&self, color: Color, sq: Square) -> Option<Piece> {
        Piece::ALL
            .into_iter()
            .find(|&p| self.pieces(color, p).contains(sq))
    }

    #[must_use]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color, Piece::King).lsb()
    }

    /// Knights, bishops, rooks and queens of `color`.
    #[must_use]
    pub fn non_pawn_material(&self, color: Color) -> u32 {
        [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen]
            .into_iter()
            .map(|p| self.pieces(color, p).popcount())
            .sum()
    }

    /// Place a piece without touching occupancy or the hash.
    #[inline]
    pub(crate) fn put_piece(&mut self, piece: ColoredPiece, sq: Square) {
        self.pieces[piece.index()] = self.pieces[piece.index()].with(sq);
    }

    #[inline]
    pub(crate) fn remove_piece(&mut self, piece: ColoredPiece, sq: Square) {
        self.pieces[piece.index()] = self.pieces[piece.index()].without(sq);
    }

    /// Rebuild the three occupancy bitboards from the piece bitboards.
    pub(crate) fn refresh_occupancy(&mut self) {
        let white = self.pieces[..6].iter().fold(Bitboard::EMPTY, |acc, &bb| acc | bb);
        let black = self.pieces[6..].iter().fold(Bitboard::EMPTY, |acc, &bb| acc | bb);
        self.occupancy = [white, black, white | black];
    }

    /// Zobrist hash computed from scratch.
    #[must_use]
    pub fn full_hash(&self) -> u64 {
        let keys = &*ZOBRIST;
        let mut hash = 0u64;
        for (idx, bb) in self.pieces.iter().enumerate() {
            for sq in bb.iter() {
                hash ^= keys.piece(ColoredPiece::from_index(idx), sq);
            }
        }
        if self.side == Color::Black {
            hash ^= keys.black_to_move_key;
        }
        if let Some(ep) = self.en_passant {
            hash ^= keys.en_passant(ep);
        }
        hash ^ keys.castling(self.castling)
    }

    /// True if any piece of `by` attacks `sq`.
    #[must_use]
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        let occupancy = self.all_occupancy();
        // A pawn of `by` attacks `sq` iff a pawn of the other color on `sq` would attack it back.
        !(pawn_attacks(by.opponent(), sq) & self.pieces(by, Piece::Pawn)).is_empty()
            || !(knight_attacks(sq) & self.pieces(by, Piece::Knight)).is_empty()
            || !(king_attacks(sq) & self.pieces(by, Piece::King)).is_empty()
            || !(bishop_attacks(sq, occupancy)
                & (self.pieces(by, Piece::Bishop) | self.pieces(by, Piece::Queen)))
                .is_empty()
            || !(rook_attacks(sq, occupancy)
                & (self.pieces(by, Piece::Rook) | self.pieces(by, Piece::Queen)))
                .is_empty()
    }

    /// All pieces of either color attacking `sq` given `occupancy` for slider rays.
    #[must_use]
    pub fn attackers_to(&self, sq: Square, occupancy: Bitboard) -> Bitboard {
        let diagonal = self.pieces(Color::White, Piece::Bishop)
            | self.pieces(Color::Black, Piece::Bishop)
            | self.pieces(Color::White, Piece::Queen)
            | self.pieces(Color::Black, Piece::Queen);
        let straight = self.pieces(Color::White, Piece::Rook)
            | self.pieces(Color::Black, Piece::Rook)
            | self.pieces(Color::White, Piece::Queen)
            | self.pieces(Color::Black, Piece::Queen);
        (pawn_attacks(Color::Black, sq) & self.pieces(Color::White, Piece::Pawn))
            | (pawn_attacks(Color::White, sq) & self.pieces(Color::Black, Piece::Pawn))
            | (knight_attacks(sq)
                & (self.pieces(Color::White, Piece::Knight) | self.pieces(Color::Black, Piece::Knight)))
            | (king_attacks(sq)
                & (self.pieces(Color::White, Piece::King) | self.pieces(Color::Black, Piece::King)))
            | (bishop_attacks(sq, occupancy) & diagonal)
            | (rook_attacks(sq, occupancy) & straight)
    }

    /// True if the side to move is in check.
    #[must_use]
    pub fn in_check(&self) -> bool {
        self.king_square(self.side)
            .is_some_and(|king| self.is_square_attacked(king, self.side.opponent()))
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}
