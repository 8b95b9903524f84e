//! Long algebraic (UCI) move parsing and move-sequence replay.

use super::error::MoveParseError;
use super::{Board, Move, MoveFilter, Piece, Square};

impl Board {
    /// Parse a move in UCI long algebraic notation (e.g. "e2e4", "e7e8q").
    ///
    /// The text is matched against this position's legal moves.
    ///
    /// # Example
    /// ```
    /// use fe64::board::Board;
    ///
    /// let board = Board::new();
    /// let mv = board.parse_move("e2e4").unwrap();
    /// assert!(mv.is_double_push());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`MoveParseError`] if the text is malformed or names no legal move.
    pub fn parse_move(&self, uci: &str) -> Result<Move, MoveParseError> {
        if !(4..=5).contains(&uci.len()) || !uci.is_ascii() {
            return Err(MoveParseError::InvalidLength { len: uci.len() });
        }

        let from: Square = uci[0..2]
            .parse()
            .map_err(|_| MoveParseError::InvalidSquare {
                notation: uci.to_string(),
            })?;
        let to: Square = uci[2..4]
            .parse()
            .map_err(|_| MoveParseError::InvalidSquare {
                notation: uci.to_string(),
            })?;
        let promotion = match uci[4..].chars().next() {
            None => None,
            Some(c) => match Piece::from_char(c) {
                Some(p @ (Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen)) => Some(p),
                _ => return Err(MoveParseError::InvalidPromotion { char: c }),
            },
        };

        self.legal_moves()
            .iter()
            .copied()
            .find(|mv| mv.source() == from && mv.target() == to && mv.promotion() == promotion)
            .ok_or_else(|| MoveParseError::IllegalMove {
                notation: uci.to_string(),
            })
    }

    /// Like [`Board::parse_move`], but yields [`Move::NULL`] instead of an error.
    #[must_use]
    pub fn move_from_uci(&self, uci: &str) -> Move {
        self.parse_move(uci).unwrap_or(Move::NULL)
    }

    /// Apply moves in order, stopping at the first one that does not parse
    /// as a legal move. Returns the hashes of the positions reached (one per
    /// applied move); the board reflects every move applied before the stop.
    pub fn play_moves<'a, I>(&mut self, moves: I) -> Vec<u64>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut hashes = Vec::new();
        for text in moves {
            match self.parse_move(text) {
                Ok(mv) if self.make_move(mv, MoveFilter::AllMoves) => hashes.push(self.hash),
                Ok(_) => break,
                Err(err) => {
                    log::warn!("stopping move replay at '{text}': {err}");
                    break;
                }
            }
        }
        hashes
    }
}
