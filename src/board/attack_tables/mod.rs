//! Attack tables for move generation.
//!
//! Leaper attacks (pawn, knight, king) are direct per-square masks. Slider
//! attacks (bishop, rook, queen) use magic bitboards with pinned multipliers.
//!
//! The tables are built once per process by [`init`], which returns an error
//! if any magic cannot be found or fails verification. The lookup helpers
//! below panic in that case rather than answer from a broken table, so the
//! binary calls [`init`] up front and exits cleanly on failure.

mod leapers;
mod magic;

use once_cell::sync::OnceCell;

use crate::board::error::{AttackTableError, Slider};
use crate::board::types::{Bitboard, Color, Square};

use magic::SliderTable;
#[cfg(test)]
pub(crate) use magic::{occupancy_subset, ray_attacks, relevance_mask};

/// Every precomputed attack lookup.
pub struct AttackTables {
    pawn: [[Bitboard; 64]; 2],
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
    bishop: SliderTable,
    rook: SliderTable,
}

static TABLES: OnceCell<AttackTables> = OnceCell::new();

impl AttackTables {
    fn generate() -> Result<Self, AttackTableError> {
        let start = std::time::Instant::now();
        let bishop = SliderTable::build(Slider::Bishop)?;
        let rook = SliderTable::build(Slider::Rook)?;
        log::debug!(
            "attack tables ready in {} ms",
            start.elapsed().as_millis()
        );
        Ok(AttackTables {
            pawn: leapers::pawn_table(),
            knight: leapers::knight_table(),
            king: leapers::king_table(),
            bishop,
            rook,
        })
    }

    #[inline]
    #[must_use]
    pub fn bishop(&self, sq: Square, occupancy: Bitboard) -> Bitboard {
        self.bishop.attacks(sq, occupancy)
    }

    #[inline]
    #[must_use]
    pub fn rook(&self, sq: Square, occupancy: Bitboard) -> Bitboard {
        self.rook.attacks(sq, occupancy)
    }
}

/// Build (once) and return the attack tables.
///
/// # Errors
///
/// Returns [`AttackTableError`] if a magic multiplier cannot be found within
/// the attempt budget or a finished table disagrees with ray casting.
pub fn init() -> Result<&'static AttackTables, AttackTableError> {
    TABLES.get_or_try_init(AttackTables::generate)
}

#[inline]
fn tables() -> &'static AttackTables {
    if let Some(tables) = TABLES.get() {
        return tables;
    }
    match init() {
        Ok(tables) => tables,
        Err(err) => panic!("attack tables unavailable: {err}"),
    }
}

#[inline]
pub(crate) fn pawn_attacks(color: Color, sq: Square) -> Bitboard {
    tables().pawn[color.index()][sq.index()]
}

#[inline]
pub(crate) fn knight_attacks(sq: Square) -> Bitboard {
    tables().knight[sq.index()]
}

#[inline]
pub(crate) fn king_attacks(sq: Square) -> Bitboard {
    tables().king[sq.index()]
}

#[inline]
pub(crate) fn bishop_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    tables().bishop(sq, occupancy)
}

#[inline]
pub(crate) fn rook_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    tables().rook(sq, occupancy)
}

#[inline]
pub(crate) fn queen_attacks(sq: Square, occupancy: Bitboard) -> Bitboard {
    let tables = tables();
    tables.bishop(sq, occupancy) | tables.rook(sq, occupancy)
}
