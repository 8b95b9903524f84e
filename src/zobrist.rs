//! Zobrist hashing for chess positions.
//!
//! Provides incrementally-updatable 64-bit position hashes for the
//! transposition table and repetition detection. Keys come from a fixed-seed
//! generator so hashes are identical across runs.

use once_cell::sync::Lazy;
use rand::prelude::*;

use crate::board::{CastlingRights, ColoredPiece, Square};

const ZOBRIST_SEED: u64 = 1_234_567_890;

pub(crate) struct ZobristKeys {
    /// piece_keys[colored piece index][square index]
    pub(crate) piece_keys: [[u64; 64]; 12],
    pub(crate) black_to_move_key: u64,
    /// One key per castling-rights mask value
    pub(crate) castling_keys: [u64; 16],
    pub(crate) en_passant_keys: [u64; 64],
}

impl ZobristKeys {
    fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);
        let mut piece_keys = [[0; 64]; 12];
        let mut castling_keys = [0; 16];
        let mut en_passant_keys = [0; 64];

        for piece in &mut piece_keys {
            for key in piece.iter_mut() {
                *key = rng.gen();
            }
        }

        let black_to_move_key = rng.gen();

        for key in &mut castling_keys {
            *key = rng.gen();
        }

        for key in &mut en_passant_keys {
            *key = rng.gen();
        }

        ZobristKeys {
            piece_keys,
            black_to_move_key,
            castling_keys,
            en_passant_keys,
        }
    }

    #[inline]
    pub(crate) fn piece(&self, piece: ColoredPiece, sq: Square) -> u64 {
        self.piece_keys[piece.index()][sq.index()]
    }

    #[inline]
    pub(crate) fn castling(&self, rights: CastlingRights) -> u64 {
        self.castling_keys[rights.as_u8() as usize]
    }

    #[inline]
    pub(crate) fn en_passant(&self, sq: Square) -> u64 {
        self.en_passant_keys[sq.index()]
    }
}

pub(crate) static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::new);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_distinct() {
        let keys = &*ZOBRIST;
        let mut seen = HashSet::new();
        for piece in &keys.piece_keys {
            for &key in piece {
                assert!(seen.insert(key));
            }
        }
        assert!(seen.insert(keys.black_to_move_key));
        for &key in keys.castling_keys.iter().chain(&keys.en_passant_keys) {
            assert!(seen.insert(key));
        }
    }

    #[test]
    fn keys_are_reproducible() {
        let fresh = ZobristKeys::new();
        assert_eq!(fresh.piece_keys, ZOBRIST.piece_keys);
        assert_eq!(fresh.black_to_move_key, ZOBRIST.black_to_move_key);
    }
}
