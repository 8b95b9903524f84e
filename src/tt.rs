//! Transposition table for caching search results.
//!
//! One slot per index, addressed by the Zobrist key modulo capacity. Each
//! slot stores two atomic words, `key ^ data` and `data`, so the table can be
//! read and written through `&self`; a torn or foreign slot fails the key
//! check and reads as a miss.
//!
//! Mate scores are stored relative to the node they were found at and
//! converted back to root-relative on read.

use std::collections::TryReserveError;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::board::search::MATE_BOUND;
use crate::board::Move;

/// Table size used when a requested size cannot be allocated.
pub const DEFAULT_HASH_MB: usize = 64;

/// Smallest table ever built, whatever the requested size.
const MIN_ENTRIES: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundType {
    Exact,      // Score is the exact value
    LowerBound, // Score is at least this value (failed high - score >= beta)
    UpperBound, // Score is at most this value (failed low - score <= alpha)
}

impl BoundType {
    // Never 0, so a packed entry is never the empty word
    fn to_bits(self) -> u64 {
        match self {
            BoundType::Exact => 1,
            BoundType::LowerBound => 2,
            BoundType::UpperBound => 3,
        }
    }

    fn from_bits(bits: u64) -> Self {
        match bits & 0x3 {
            1 => BoundType::Exact,
            2 => BoundType::LowerBound,
            _ => BoundType::UpperBound,
        }
    }
}

/// Unpacked entry as returned to the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TTEntry {
    pub depth: i32,
    pub score: i32,
    pub bound: BoundType,
    pub best_move: Option<Move>,
}

/// Packed entry format:
/// - bits 0-23:  move (`Move::raw`, 0 = no move)
/// - bits 24-47: score (24-bit two's complement)
/// - bits 48-55: depth
/// - bits 56-57: bound (1..=3)
fn pack_entry(depth: u8, score: i32, bound: BoundType, best_move: Option<Move>) -> u64 {
    let mv = u64::from(best_move.map_or(0, Move::raw) & 0x00FF_FFFF);
    let sc = u64::from((score as u32) & 0x00FF_FFFF);
    mv | (sc << 24) | (u64::from(depth) << 48) | (bound.to_bits() << 56)
}

fn unpack_entry(data: u64) -> TTEntry {
    let mv_bits = (data & 0x00FF_FFFF) as u32;
    let score_bits = ((data >> 24) & 0x00FF_FFFF) as u32;
    // Sign-extend the 24-bit score
    let score = ((score_bits << 8) as i32) >> 8;
    TTEntry {
        depth: i32::from(((data >> 48) & 0xFF) as u8),
        score,
        bound: BoundType::from_bits(data >> 56),
        best_move: (mv_bits != 0).then(|| Move::from_raw(mv_bits)),
    }
}

/// Make a mate score relative to the current node before storing it.
#[inline]
fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score > MATE_BOUND {
        score + ply as i32
    } else if score < -MATE_BOUND {
        score - ply as i32
    } else {
        score
    }
}

/// Make a stored mate score relative to the root again.
#[inline]
fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score > MATE_BOUND {
        score - ply as i32
    } else if score < -MATE_BOUND {
        score + ply as i32
    } else {
        score
    }
}

#[repr(C)]
struct TTSlot {
    /// hash ^ packed data
    key_xor: AtomicU64,
    /// packed data, 0 when empty
    data: AtomicU64,
}

impl TTSlot {
    fn empty() -> Self {
        TTSlot {
            key_xor: AtomicU64::new(0),
            data: AtomicU64::new(0),
        }
    }

    fn write(&self, hash: u64, packed: u64) {
        self.data.store(packed, Ordering::Relaxed);
        self.key_xor.store(hash ^ packed, Ordering::Relaxed);
    }

    /// Raw `(stored_key, data)`; `data == 0` means empty.
    fn read(&self) -> (u64, u64) {
        let key_xor = self.key_xor.load(Ordering::Relaxed);
        let data = self.data.load(Ordering::Relaxed);
        (key_xor ^ data, data)
    }

    fn lookup(&self, hash: u64) -> Option<TTEntry> {
        let (key, data) = self.read();
        (data != 0 && key == hash).then(|| unpack_entry(data))
    }

    fn clear(&self) {
        self.key_xor.store(0, Ordering::Relaxed);
        self.data.store(0, Ordering::Relaxed);
    }
}

/// Fixed-capacity lossy cache from position key to search result.
pub struct TranspositionTable {
    slots: Vec<TTSlot>,
}

impl TranspositionTable {
    /// Build a table of about `size_mb` megabytes.
    ///
    /// If that much memory cannot be reserved the table falls back to
    /// [`DEFAULT_HASH_MB`], and failing that to the minimum size.
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        TranspositionTable {
            slots: Self::allocate_or_fallback(size_mb),
        }
    }

    /// Replace the table with one of `size_mb` megabytes. All entries are lost.
    pub fn resize(&mut self, size_mb: usize) {
        // Release the old table first so its memory is available to the new one
        self.slots = Vec::new();
        self.slots = Self::allocate_or_fallback(size_mb);
    }

    fn allocate_or_fallback(size_mb: usize) -> Vec<TTSlot> {
        match Self::allocate(size_mb) {
            Ok(slots) => slots,
            Err(err) => {
                log::warn!(
                    "could not allocate {size_mb} MB transposition table ({err}), using {DEFAULT_HASH_MB} MB"
                );
                Self::allocate(DEFAULT_HASH_MB)
                    .unwrap_or_else(|_| (0..MIN_ENTRIES).map(|_| TTSlot::empty()).collect())
            }
        }
    }

    fn allocate(size_mb: usize) -> Result<Vec<TTSlot>, TryReserveError> {
        let bytes = size_mb.saturating_mul(1024 * 1024);
        let entries = (bytes / mem::size_of::<TTSlot>()).max(MIN_ENTRIES);
        let mut slots = Vec::new();
        slots.try_reserve_exact(entries)?;
        slots.resize_with(entries, TTSlot::empty);
        Ok(slots)
    }

    /// Number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn slot(&self, hash: u64) -> &TTSlot {
        &self.slots[(hash % self.slots.len() as u64) as usize]
    }

    /// Score usable as a cutoff at this node, if any.
    ///
    /// Requires an exact key match and a stored depth of at least `depth`.
    /// Bound entries only cut when they fall outside the window, and then
    /// return the window edge.
    #[must_use]
    pub fn probe(&self, hash: u64, alpha: i32, beta: i32, depth: i32, ply: usize) -> Option<i32> {
        let entry = self.slot(hash).lookup(hash)?;
        if entry.depth < depth {
            return None;
        }
        let score = score_from_tt(entry.score, ply);
        match entry.bound {
            BoundType::Exact => Some(score),
            BoundType::LowerBound if score >= beta => Some(beta),
            BoundType::UpperBound if score <= alpha => Some(alpha),
            _ => None,
        }
    }

    /// Stored best move for ordering, regardless of depth.
    #[must_use]
    pub fn best_move(&self, hash: u64) -> Option<Move> {
        self.slot(hash).lookup(hash).and_then(|entry| entry.best_move)
    }

    /// Full entry with its score made root-relative for `ply`.
    #[must_use]
    pub fn entry(&self, hash: u64, ply: usize) -> Option<TTEntry> {
        self.slot(hash).lookup(hash).map(|entry| TTEntry {
            score: score_from_tt(entry.score, ply),
            ..entry
        })
    }

    /// Store a search result.
    ///
    /// The slot is overwritten when it is empty, holds the same position,
    /// holds a search no deeper than this one, or holds a bound that an
    /// exact score replaces. Otherwise the existing entry is kept.
    pub fn store(
        &self,
        hash: u64,
        depth: i32,
        score: i32,
        bound: BoundType,
        best_move: Option<Move>,
        ply: usize,
    ) {
        let slot = self.slot(hash);
        let depth = depth.clamp(0, i32::from(u8::MAX)) as u8;
        let (stored_key, data) = slot.read();

        let mut keep_move = None;
        if data != 0 {
            let old = unpack_entry(data);
            let same_position = stored_key == hash;
            let replace = same_position
                || old.depth <= i32::from(depth)
                || (bound == BoundType::Exact && old.bound != BoundType::Exact);
            if !replace {
                return;
            }
            if same_position {
                keep_move = old.best_move;
            }
        }

        let mv = best_move.filter(|mv| !mv.is_null()).or(keep_move);
        slot.write(hash, pack_entry(depth, score_to_tt(score, ply), bound, mv));
    }

    /// Occupancy in per mille, sampled over the first 1000 slots.
    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        let sample = self.slots.len().min(1000);
        let used = self
            .slots
            .iter()
            .take(sample)
            .filter(|slot| slot.read().1 != 0)
            .count();
        (used * 1000 / sample) as u32
    }

    /// Wipe every entry without reallocating.
    pub fn clear(&self) {
        for slot in &self.slots {
            slot.clear();
        }
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        TranspositionTable::new(DEFAULT_HASH_MB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::search::MATE;
    use crate::board::Board;

    fn some_move() -> Move {
        Board::new().parse_move("e2e4").unwrap()
    }

    #[test]
    fn pack_unpack_keeps_fields() {
        let mv = some_move();
        for (depth, score, bound) in [
            (0u8, 0, BoundType::Exact),
            (37, -48_990, BoundType::LowerBound),
            (255, 48_990, BoundType::UpperBound),
        ] {
            let entry = unpack_entry(pack_entry(depth, score, bound, Some(mv)));
            assert_eq!(entry.depth, i32::from(depth));
            assert_eq!(entry.score, score);
            assert_eq!(entry.bound, bound);
            assert_eq!(entry.best_move, Some(mv));
        }
        assert_ne!(pack_entry(0, 0, BoundType::Exact, None), 0);
    }

    #[test]
    fn store_and_probe() {
        let tt = TranspositionTable::new(1);
        let hash = 0x1234_5678_9ABC_DEF0;
        tt.store(hash, 6, 120, BoundType::Exact, Some(some_move()), 0);

        assert_eq!(tt.probe(hash, -50, 50, 6, 0), Some(120));
        assert_eq!(tt.probe(hash, -50, 50, 7, 0), None);
        assert_eq!(tt.best_move(hash), Some(some_move()));
    }

    #[test]
    fn bounds_only_cut_outside_the_window() {
        let tt = TranspositionTable::new(1);
        tt.store(1, 4, 300, BoundType::LowerBound, None, 0);
        tt.store(2, 4, -300, BoundType::UpperBound, None, 0);

        assert_eq!(tt.probe(1, 0, 200, 4, 0), Some(200));
        assert_eq!(tt.probe(1, 0, 400, 4, 0), None);
        assert_eq!(tt.probe(2, -200, 0, 4, 0), Some(-200));
        assert_eq!(tt.probe(2, -400, 0, 4, 0), None);
    }

    #[test]
    fn no_false_positives_on_shared_slot() {
        let tt = TranspositionTable::new(1);
        let hash = 0xDEAD_BEEF;
        let alias = hash + tt.capacity() as u64;
        tt.store(hash, 10, 500, BoundType::Exact, None, 0);

        assert!(tt.probe(alias, -1000, 1000, 0, 0).is_none());
        assert!(tt.entry(alias, 0).is_none());
        assert!(tt.best_move(alias).is_none());
    }

    #[test]
    fn mate_scores_are_ply_independent() {
        let tt = TranspositionTable::new(1);
        // Mate found 3 plies below a node at ply 5
        let score = MATE - 8;
        tt.store(42, 3, score, BoundType::Exact, None, 5);

        let entry = tt.entry(42, 5).unwrap();
        assert_eq!(entry.score, score);
        // Reached again at ply 2: mate is 3 plies closer to the root
        assert_eq!(tt.entry(42, 2).unwrap().score, MATE - 5);
    }

    #[test]
    fn deeper_entry_survives_shallow_store() {
        let tt = TranspositionTable::new(1);
        let hash = 7;
        let alias = hash + tt.capacity() as u64;
        tt.store(hash, 9, 10, BoundType::Exact, None, 0);
        tt.store(alias, 2, 20, BoundType::LowerBound, None, 0);
        assert_eq!(tt.entry(hash, 0).map(|e| e.depth), Some(9));
        assert!(tt.entry(alias, 0).is_none());

        // Exact replaces a deeper bound
        tt.store(hash + 1, 9, 10, BoundType::UpperBound, None, 0);
        tt.store(alias + 1, 2, 30, BoundType::Exact, None, 0);
        assert_eq!(tt.entry(alias + 1, 0).map(|e| e.score), Some(30));
    }

    #[test]
    fn same_position_keeps_previous_move() {
        let tt = TranspositionTable::new(1);
        tt.store(99, 3, 0, BoundType::LowerBound, Some(some_move()), 0);
        tt.store(99, 4, 15, BoundType::UpperBound, None, 0);
        assert_eq!(tt.best_move(99), Some(some_move()));
    }

    #[test]
    fn clear_and_hashfull() {
        let tt = TranspositionTable::new(1);
        assert_eq!(tt.hashfull_per_mille(), 0);
        for key in 0..500u64 {
            tt.store(key, 1, 0, BoundType::Exact, None, 0);
        }
        assert_eq!(tt.hashfull_per_mille(), 500);
        tt.clear();
        assert_eq!(tt.hashfull_per_mille(), 0);
        assert!(tt.entry(3, 0).is_none());
    }

    #[test]
    fn tiny_budget_gets_minimum_size() {
        let mut tt = TranspositionTable::new(0);
        assert_eq!(tt.capacity(), MIN_ENTRIES);
        tt.store(5, 1, 1, BoundType::Exact, None, 0);
        tt.resize(1);
        assert!(tt.capacity() > MIN_ENTRIES);
        assert!(tt.entry(5, 0).is_none());
    }
}
