//! Square type.
//!
//! Squares are numbered rank-major from the top-left of the board as White
//! sees it: a8 = 0, h8 = 7, a1 = 56, h1 = 63.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::board::error::SquareError;

/// A square on the chess board, stored as its 0..64 index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Square(u8);

macro_rules! square_consts {
    ($($name:ident = $idx:expr),* $(,)?) => {
        impl Square {
            $(pub const $name: Square = Square($idx);)*
        }
    };
}

square_consts! {
    A8 = 0, B8 = 1, C8 = 2, D8 = 3, E8 = 4, F8 = 5, G8 = 6, H8 = 7,
    A1 = 56, B1 = 57, C1 = 58, D1 = 59, E1 = 60, F1 = 61, G1 = 62, H1 = 63,
}

impl Square {
    /// Create a square from a 0..64 index.
    #[inline]
    #[must_use]
    pub const fn new(index: u8) -> Option<Self> {
        if index < 64 {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Create a square from a 0..64 index, masking out-of-range values.
    #[inline]
    #[must_use]
    pub(crate) const fn from_index(index: usize) -> Self {
        Square((index & 63) as u8)
    }

    /// Create a square from a file (0 = a) and a chess rank (0 = rank 1).
    #[inline]
    #[must_use]
    pub const fn from_coords(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Square((7 - rank) * 8 + file))
        } else {
            None
        }
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// File index, 0 = a.
    #[inline]
    #[must_use]
    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    /// Chess rank index, 0 = rank 1.
    #[inline]
    #[must_use]
    pub const fn rank(self) -> u8 {
        7 - self.0 / 8
    }

    /// Board row counted from the top, 0 = rank 8.
    #[inline]
    #[must_use]
    pub(crate) const fn row(self) -> u8 {
        self.0 / 8
    }

    /// Mirror the square vertically (a1 <-> a8).
    #[inline]
    #[must_use]
    pub const fn flip(self) -> Self {
        Square(self.0 ^ 56)
    }

    /// Offset the index by `delta`, returning `None` if it leaves the board.
    ///
    /// This is a raw index offset; file wrap-around is the caller's concern.
    #[inline]
    #[must_use]
    pub(crate) const fn offset(self, delta: i8) -> Option<Self> {
        let idx = self.0 as i16 + delta as i16;
        if idx >= 0 && idx < 64 {
            Some(Square(idx as u8))
        } else {
            None
        }
    }

    /// Iterate all 64 squares in index order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, self.rank() + 1)
    }
}

impl TryFrom<u8> for Square {
    type Error = SquareError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Square::new(index).ok_or(SquareError::OutOfRange { index })
    }
}

impl FromStr for Square {
    type Err = SquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(SquareError::InvalidNotation {
                notation: s.to_string(),
            });
        }
        let file = match bytes[0] {
            b @ b'a'..=b'h' => b - b'a',
            _ => {
                return Err(SquareError::InvalidNotation {
                    notation: s.to_string(),
                })
            }
        };
        let rank = match bytes[1] {
            b @ b'1'..=b'8' => b - b'1',
            _ => {
                return Err(SquareError::InvalidNotation {
                    notation: s.to_string(),
                })
            }
        };
        Square::from_coords(file, rank).ok_or(SquareError::InvalidNotation {
            notation: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_indices() {
        assert_eq!(Square::A8.index(), 0);
        assert_eq!(Square::H1.index(), 63);
        assert_eq!("a8".parse::<Square>(), Ok(Square::A8));
        assert_eq!("e1".parse::<Square>(), Ok(Square::E1));
        assert_eq!(Square::from_coords(4, 0), Some(Square::E1));
    }

    #[test]
    fn display_round_trip() {
        for sq in Square::all() {
            let text = sq.to_string();
            assert_eq!(text.parse::<Square>(), Ok(sq));
        }
    }

    #[test]
    fn rejects_bad_notation() {
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("e".parse::<Square>().is_err());
        assert!(Square::try_from(64u8).is_err());
    }

    #[test]
    fn flip_mirrors_rank() {
        assert_eq!(Square::E1.flip(), Square::E8);
        assert_eq!(Square::A8.flip(), Square::A1);
    }
}
