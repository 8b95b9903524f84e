//! Error types for board construction, move parsing and table setup.

use std::fmt;

use super::types::Square;

/// Error type for FEN parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// Input was empty or whitespace
    Empty,
    /// A required field is absent
    MissingField { field: &'static str },
    /// Side to move must be 'w' or 'b'
    InvalidSideToMove { found: String },
    /// More than eight ranks in the placement field
    TooManyRanks { ranks: usize },
    /// A rank describes more than eight files
    TooManyFiles { rank: usize, files: usize },
    /// A side has no king
    MissingKing { color: &'static str },
    /// A side has more than one king
    TooManyKings { color: &'static str },
    /// The side not to move is in check
    OpponentInCheck,
}

impl fmt::Display for FenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FenError::Empty => write!(f, "FEN string is empty"),
            FenError::MissingField { field } => write!(f, "FEN is missing the {field} field"),
            FenError::InvalidSideToMove { found } => {
                write!(f, "Invalid side to move '{found}', expected 'w' or 'b'")
            }
            FenError::TooManyRanks { ranks } => {
                write!(f, "FEN placement has {ranks} ranks, expected 8")
            }
            FenError::TooManyFiles { rank, files } => {
                write!(f, "Too many files ({files}) in rank {rank}")
            }
            FenError::MissingKing { color } => write!(f, "{color} has no king"),
            FenError::TooManyKings { color } => write!(f, "{color} has more than one king"),
            FenError::OpponentInCheck => write!(f, "The side not to move is in check"),
        }
    }
}

impl std::error::Error for FenError {}

/// Error type for move parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    /// Move string has invalid length (must be 4-5 characters)
    InvalidLength { len: usize },
    /// Invalid square notation in move
    InvalidSquare { notation: String },
    /// Invalid promotion piece
    InvalidPromotion { char: char },
    /// Move is not legal in the current position
    IllegalMove { notation: String },
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::InvalidLength { len } => {
                write!(f, "Move must be 4-5 characters, found {len}")
            }
            MoveParseError::InvalidSquare { notation } => {
                write!(f, "Invalid square notation in '{notation}'")
            }
            MoveParseError::InvalidPromotion { char } => {
                write!(f, "Invalid promotion piece '{char}'")
            }
            MoveParseError::IllegalMove { notation } => {
                write!(f, "Illegal move '{notation}'")
            }
        }
    }
}

impl std::error::Error for MoveParseError {}

/// Error type for square parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SquareError {
    /// Index is not in 0..64
    OutOfRange { index: u8 },
    /// Invalid algebraic notation
    InvalidNotation { notation: String },
}

impl fmt::Display for SquareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquareError::OutOfRange { index } => {
                write!(f, "Square index {index} out of range (must be 0-63)")
            }
            SquareError::InvalidNotation { notation } => {
                write!(f, "Invalid square notation '{notation}'")
            }
        }
    }
}

impl std::error::Error for SquareError {}

/// Sliding piece a magic table belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slider {
    Bishop,
    Rook,
}

impl fmt::Display for Slider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slider::Bishop => write!(f, "bishop"),
            Slider::Rook => write!(f, "rook"),
        }
    }
}

/// Failure while building the sliding-piece attack tables.
///
/// Either is fatal: the engine never runs on an unverified table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttackTableError {
    /// No collision-free magic found within the attempt budget
    MagicNotFound {
        slider: Slider,
        square: Square,
        attempts: u32,
    },
    /// A table lookup disagreed with ray casting during verification
    Verification {
        slider: Slider,
        square: Square,
        occupancy: u64,
    },
}

impl fmt::Display for AttackTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttackTableError::MagicNotFound {
                slider,
                square,
                attempts,
            } => write!(
                f,
                "no {slider} magic found for {square} after {attempts} attempts"
            ),
            AttackTableError::Verification {
                slider,
                square,
                occupancy,
            } => write!(
                f,
                "{slider} table for {square} is wrong for occupancy {occupancy:#018x}"
            ),
        }
    }
}

impl std::error::Error for AttackTableError {}
