use super::error::FenError;
use super::{
    Board, CastlingRights, Color, ColoredPiece, Piece, Square, CASTLE_BLACK_K, CASTLE_BLACK_Q,
    CASTLE_WHITE_K, CASTLE_WHITE_Q,
};

/// FEN of the standard starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Board {
    /// Parse a board position from FEN notation.
    ///
    /// Parsing is lenient about detail: unknown characters in the placement
    /// and castling fields are skipped, a malformed en passant field reads
    /// as `-`, and missing move counters default to `0 1`. It fails only when
    /// the result could not be a playable position.
    ///
    /// # Errors
    ///
    /// Returns [`FenError`] when the placement or side-to-move field is
    /// missing or malformed, a side does not have exactly one king, or the
    /// side not to move is in check.
    pub fn try_from_fen(fen: &str) -> Result<Self, FenError> {
        let mut board = Board::empty();
        let mut parts = fen.split_whitespace();

        let placement = parts.next().ok_or(FenError::Empty)?;
        let mut ranks = 0;
        for (row, rank_str) in placement.split('/').enumerate() {
            if row >= 8 {
                return Err(FenError::TooManyRanks { ranks: row + 1 });
            }
            ranks = row + 1;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    continue;
                }
                let Some(piece) = ColoredPiece::from_fen_char(c) else {
                    log::debug!("skipping unknown FEN placement character '{c}'");
                    continue;
                };
                if file >= 8 {
                    return Err(FenError::TooManyFiles {
                        rank: 8 - row,
                        files: file + 1,
                    });
                }
                board.put_piece(piece, Square::from_index(row * 8 + file));
                file += 1;
            }
            if file > 8 {
                return Err(FenError::TooManyFiles {
                    rank: 8 - row,
                    files: file,
                });
            }
        }
        if ranks == 0 {
            return Err(FenError::Empty);
        }

        board.side = match parts.next() {
            Some("w") | Some("W") => Color::White,
            Some("b") | Some("B") => Color::Black,
            Some(other) => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
            None => {
                return Err(FenError::MissingField {
                    field: "side to move",
                })
            }
        };

        let mut rights = 0u8;
        for c in parts.next().unwrap_or("-").chars() {
            match c {
                'K' => rights |= CASTLE_WHITE_K,
                'Q' => rights |= CASTLE_WHITE_Q,
                'k' => rights |= CASTLE_BLACK_K,
                'q' => rights |= CASTLE_BLACK_Q,
                _ => {}
            }
        }
        board.castling = CastlingRights::from_u8(rights);

        board.en_passant = parts.next().and_then(|field| field.parse::<Square>().ok());
        board.halfmove_clock = parts.next().and_then(|n| n.parse().ok()).unwrap_or(0);
        board.fullmove_number = parts
            .next()
            .and_then(|n| n.parse().ok())
            .filter(|&n| n > 0)
            .unwrap_or(1);

        board.refresh_occupancy();
        board.validate_kings()?;
        board.sanitize_castling();
        board.sanitize_en_passant();
        if board.is_square_attacked_by_mover_on_enemy_king() {
            return Err(FenError::OpponentInCheck);
        }

        board.hash = board.full_hash();
        Ok(board)
    }

    /// Parse a FEN, falling back to the starting position if it is unusable.
    #[must_use]
    pub fn from_fen(fen: &str) -> Self {
        match Self::try_from_fen(fen) {
            Ok(board) => board,
            Err(err) => {
                log::warn!("invalid FEN '{fen}': {err}; using the start position");
                Board::new()
            }
        }
    }

    /// Convert the board position to FEN notation.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut rows: Vec<String> = Vec::with_capacity(8);
        for row in 0..8 {
            let mut text = String::new();
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_on(Square::from_index(row * 8 + file)) {
                    Some(piece) => {
                        if empty > 0 {
                            text.push_str(&empty.to_string());
                            empty = 0;
                        }
                        text.push(piece.to_fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                text.push_str(&empty.to_string());
            }
            rows.push(text);
        }

        let active = match self.side {
            Color::White => "w",
            Color::Black => "b",
        };
        let ep = self
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());

        format!(
            "{} {} {} {} {} {}",
            rows.join("/"),
            active,
            self.castling,
            ep,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    fn validate_kings(&self) -> Result<(), FenError> {
        for (color, name) in [(Color::White, "White"), (Color::Black, "Black")] {
            match self.pieces(color, Piece::King).popcount() {
                0 => return Err(FenError::MissingKing { color: name }),
                1 => {}
                _ => return Err(FenError::TooManyKings { color: name }),
            }
        }
        Ok(())
    }

    /// Drop castling rights whose king or rook is not on its home square.
    fn sanitize_castling(&mut self) {
        let homes = [
            (Color::White, true, Square::E1, Square::H1),
            (Color::White, false, Square::E1, Square::A1),
            (Color::Black, true, Square::E8, Square::H8),
            (Color::Black, false, Square::E8, Square::A8),
        ];
        for (color, kingside, king, rook) in homes {
            if self.castling.has(color, kingside)
                && !(self.pieces(color, Piece::King).contains(king)
                    && self.pieces(color, Piece::Rook).contains(rook))
            {
                log::debug!("dropping castling right without king or rook at home");
                self.castling.remove(color, kingside);
            }
        }
    }

    /// Keep the en passant square only if it sits behind a pawn that just double-pushed.
    fn sanitize_en_passant(&mut self) {
        let Some(ep) = self.en_passant else {
            return;
        };
        let mover = self.side.opponent();
        let (expected_row, pawn_offset) = match mover {
            Color::White => (5, -8),
            Color::Black => (2, 8),
        };
        let pawn_sq = ep.offset(pawn_offset);
        let valid = ep.row() == expected_row
            && !self.all_occupancy().contains(ep)
            && pawn_sq.is_some_and(|sq| self.pieces(mover, Piece::Pawn).contains(sq));
        if !valid {
            self.en_passant = None;
        }
    }

    fn is_square_attacked_by_mover_on_enemy_king(&self) -> bool {
        let enemy = self.side.opponent();
        self.king_square(enemy)
            .is_some_and(|king| self.is_square_attacked(king, self.side))
    }
}

impl std::str::FromStr for Board {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::try_from_fen(s)
    }
}
