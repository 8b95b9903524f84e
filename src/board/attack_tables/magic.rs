//! Magic-bitboard construction for sliding pieces.
//!
//! For every square the relevant blockers (ray squares short of the board
//! edge) are enumerated, the true attack set of each subset is ray-cast, and
//! a multiplier is searched so `(occupancy & mask) * magic >> shift` sends
//! every subset to a slot that holds its attack set. Multipliers found offline
//! are tried first. A square whose pinned multiplier collides falls back to a
//! search over sparse candidates from a generator seeded for that square alone,
//! with a bounded attempt count. The finished table is checked against ray
//! casting for every subset.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::error::{AttackTableError, Slider};
use crate::board::types::{Bitboard, Square};

/// Base seed for the fallback search, mixed with slider and square.
const MAGIC_SEED: u64 = 1_804_289_383;
/// Candidates tried per square before giving up.
const MAX_MAGIC_ATTEMPTS: u32 = 20_000_000;

#[rustfmt::skip]
const BISHOP_MAGICS: [u64; 64] = [
    0x0010c21808022040, 0x0048300100410404, 0x0050048081148420, 0x0044051a00020022,
    0x8804042080098404, 0x4202480240000030, 0x0001010150404100, 0x0000440051101010,
    0x0210048802080210, 0x0210104418408221, 0x30000800d4008040, 0x0244082040498900,
    0x108c040420000000, 0x400206880c400888, 0x0000148844100440, 0xa40001010d012005,
    0x02088410101000c4, 0x0002402008424480, 0x0088813000204300, 0x0008050088210000,
    0x0002000c12022002, 0x001200410809040d, 0x20084042080404b4, 0x0042002104822100,
    0x0002210810041000, 0x0382320010100214, 0x000410002a008210, 0x2a00802008020020,
    0x0010404044010040, 0x0110004002082211, 0x1038811000941000, 0x4b10460410808400,
    0x042108404a881100, 0x0000900400100402, 0x0286004110900100, 0x0002820081080080,
    0x0400410040840041, 0x4210004200019200, 0x0208083108008084, 0x0ab2060201204450,
    0x0814220210194000, 0x8401080110800400, 0x0921220030040a01, 0x0042044c24008800,
    0x3904200204120080, 0x0440008800400484, 0x0010020081000410, 0x02044402a0210204,
    0x0400a40b28404009, 0x1400821110020010, 0x600001441c042410, 0x4088040084040001,
    0x0002004210410000, 0x014010208101004a, 0x0420881001065200, 0x8250018214084001,
    0x0011864508200200, 0x0100030c1484142a, 0xc009000044040420, 0x0808441008840409,
    0x0804800068102419, 0x0000024004484080, 0x4102c1300c00b880, 0x0402040404284602,
];

#[rustfmt::skip]
const ROOK_MAGICS: [u64; 64] = [
    0x0080008110e1c002, 0x02c0400020003000, 0xa080082000801006, 0x4100099000650020,
    0x1900100402080100, 0x0200080490010200, 0x03000c4100008a00, 0x22800a4100042a80,
    0xc814800022400086, 0x4400400020100048, 0xd200808020001000, 0x4412001008402600,
    0x1001000408001100, 0x0212000802011004, 0x404200014a001488, 0x0040800080004100,
    0x0000908000400822, 0x00b0004000402008, 0x0000848020001000, 0x0020090021001000,
    0x1004008008000480, 0x0c01010002080400, 0x0000140028110250, 0x022002000100508c,
    0x0000401080002080, 0x0140400080201080, 0x0081200100110b40, 0x0080081200402200,
    0x0000080080800400, 0x1010040080800200, 0x0024020080800100, 0xa280110200208044,
    0x0000400080800023, 0x8000400080802001, 0x0000402001001900, 0x14d0008111800800,
    0x0010040080800802, 0x0200020080800400, 0x6101000401010200, 0x0041040442000991,
    0x000060c00d808002, 0x0450002000414000, 0x0001004020050010, 0x0001100500a10008,
    0x0088040008008080, 0x0002200410080140, 0x0000010002008080, 0x0004108519520004,
    0x002e2100c8801100, 0x0082401000200140, 0x0001001420004900, 0x2c00221000390300,
    0x4981001008000500, 0x0010800400060180, 0x0040014210080400, 0x0000004c10810200,
    0x0500914024800101, 0x0000402082010012, 0x0002200010084301, 0x8000100100200409,
    0x0409000208009005, 0x8812000108041002, 0x0040100102482084, 0x0410102411008042,
];

const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

impl Slider {
    fn directions(self) -> &'static [(i8, i8); 4] {
        match self {
            Slider::Bishop => &BISHOP_DIRECTIONS,
            Slider::Rook => &ROOK_DIRECTIONS,
        }
    }

    fn pinned(self) -> &'static [u64; 64] {
        match self {
            Slider::Bishop => &BISHOP_MAGICS,
            Slider::Rook => &ROOK_MAGICS,
        }
    }

    /// Largest relevant-mask size over all squares.
    const fn max_bits(self) -> u32 {
        match self {
            Slider::Bishop => 9,
            Slider::Rook => 12,
        }
    }
}

#[inline]
fn on_board(row: i8, file: i8) -> bool {
    (0..8).contains(&row) && (0..8).contains(&file)
}

#[inline]
fn bit(row: i8, file: i8) -> u64 {
    1u64 << (row as u32 * 8 + file as u32)
}

/// Squares whose occupancy can change the slider's attack set from `sq`.
pub(crate) fn relevance_mask(slider: Slider, sq: Square) -> u64 {
    let row = sq.row() as i8;
    let file = sq.file() as i8;
    let mut mask = 0u64;
    for &(dr, df) in slider.directions() {
        let (mut r, mut f) = (row + dr, file + df);
        while on_board(r + dr, f + df) {
            mask |= bit(r, f);
            r += dr;
            f += df;
        }
    }
    mask
}

/// Slow reference attack set: walk each ray up to and including the first blocker.
pub(crate) fn ray_attacks(slider: Slider, sq: Square, occupancy: u64) -> u64 {
    let row = sq.row() as i8;
    let file = sq.file() as i8;
    let mut attacks = 0u64;
    for &(dr, df) in slider.directions() {
        let (mut r, mut f) = (row + dr, file + df);
        while on_board(r, f) {
            attacks |= bit(r, f);
            if occupancy & bit(r, f) != 0 {
                break;
            }
            r += dr;
            f += df;
        }
    }
    attacks
}

/// The `index`-th subset of `mask`: bit `i` of `index` selects the `i`-th lowest mask bit.
pub(crate) fn occupancy_subset(index: usize, mask: u64) -> u64 {
    let mut occupancy = 0u64;
    let mut remaining = mask;
    let mut i = 0;
    while remaining != 0 {
        let lsb = remaining & remaining.wrapping_neg();
        if index & (1 << i) != 0 {
            occupancy |= lsb;
        }
        remaining ^= lsb;
        i += 1;
    }
    occupancy
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Magic {
    pub mask: u64,
    pub magic: u64,
    pub shift: u32,
}

impl Magic {
    #[inline]
    fn index(&self, occupancy: u64) -> usize {
        ((occupancy & self.mask).wrapping_mul(self.magic) >> self.shift) as usize
    }
}

/// Flat per-square attack table for one slider.
///
/// Each square owns a block of `1 << max_bits` slots, so the table is sized
/// to the largest bucket count regardless of how many bits a square needs.
pub(crate) struct SliderTable {
    magics: [Magic; 64],
    stride: usize,
    attacks: Vec<Bitboard>,
}

impl SliderTable {
    #[inline]
    pub(crate) fn attacks(&self, sq: Square, occupancy: Bitboard) -> Bitboard {
        let magic = &self.magics[sq.index()];
        self.attacks[sq.index() * self.stride + magic.index(occupancy.0)]
    }

    #[cfg(test)]
    pub(crate) fn magic(&self, sq: Square) -> Magic {
        self.magics[sq.index()]
    }

    /// Build and exhaustively verify the table for `slider`.
    pub(crate) fn build(slider: Slider) -> Result<Self, AttackTableError> {
        let stride = 1usize << slider.max_bits();
        let mut attacks = vec![Bitboard::EMPTY; 64 * stride];
        let mut magics = [Magic::default(); 64];

        for sq in Square::all() {
            let blockers = Blockers::new(slider, sq);
            let magic = match blockers.magic(slider.pinned()[sq.index()]) {
                Some(magic) => magic,
                None => {
                    log::warn!("pinned {slider} magic for {sq} collides, searching");
                    find_magic(slider, sq, &blockers, &mut square_rng(slider, sq))?
                }
            };
            let base = sq.index() * stride;
            for (&occ, &attack) in blockers.occupancies.iter().zip(&blockers.reference) {
                attacks[base + magic.index(occ)] = Bitboard(attack);
            }
            magics[sq.index()] = magic;
        }

        let table = SliderTable {
            magics,
            stride,
            attacks,
        };
        table.verify(slider)?;
        Ok(table)
    }

    fn verify(&self, slider: Slider) -> Result<(), AttackTableError> {
        for sq in Square::all() {
            let mask = self.magics[sq.index()].mask;
            for i in 0..(1usize << mask.count_ones()) {
                let occupancy = occupancy_subset(i, mask);
                if self.attacks(sq, Bitboard(occupancy)).0 != ray_attacks(slider, sq, occupancy) {
                    return Err(AttackTableError::Verification {
                        slider,
                        square: sq,
                        occupancy,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Every relevant occupancy of one square with its ray-cast attack set.
struct Blockers {
    mask: u64,
    occupancies: Vec<u64>,
    reference: Vec<u64>,
}

impl Blockers {
    fn new(slider: Slider, sq: Square) -> Self {
        let mask = relevance_mask(slider, sq);
        let occupancies: Vec<u64> = (0..1usize << mask.count_ones())
            .map(|i| occupancy_subset(i, mask))
            .collect();
        let reference = occupancies
            .iter()
            .map(|&occ| ray_attacks(slider, sq, occ))
            .collect();
        Blockers {
            mask,
            occupancies,
            reference,
        }
    }

    fn candidate(&self, magic: u64) -> Magic {
        Magic {
            mask: self.mask,
            magic,
            shift: 64 - self.mask.count_ones(),
        }
    }

    /// `magic` as a lookup if no two subsets needing different attacks share a slot.
    fn magic(&self, magic: u64) -> Option<Magic> {
        let magic = self.candidate(magic);
        let mut used = vec![None; self.occupancies.len()];
        for (&occ, &attack) in self.occupancies.iter().zip(&self.reference) {
            let slot = &mut used[magic.index(occ)];
            match *slot {
                None => *slot = Some(attack),
                Some(existing) if existing != attack => return None,
                Some(_) => {}
            }
        }
        Some(magic)
    }
}

/// Candidate generator for one (slider, square), independent of every other square.
fn square_rng(slider: Slider, sq: Square) -> StdRng {
    StdRng::seed_from_u64(MAGIC_SEED ^ ((slider as u64) << 8) ^ sq.index() as u64)
}

fn find_magic(
    slider: Slider,
    sq: Square,
    blockers: &Blockers,
    rng: &mut StdRng,
) -> Result<Magic, AttackTableError> {
    let size = blockers.occupancies.len();
    // Slots are stamped with the attempt that wrote them, so nothing is cleared between attempts.
    let mut stamp = vec![0u32; size];
    let mut used = vec![0u64; size];

    for attempt in 1..=MAX_MAGIC_ATTEMPTS {
        let candidate = rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>();
        if (blockers.mask.wrapping_mul(candidate) & 0xFF00_0000_0000_0000).count_ones() < 6 {
            continue;
        }
        let magic = blockers.candidate(candidate);

        let mut collision = false;
        for (&occ, &attack) in blockers.occupancies.iter().zip(&blockers.reference) {
            let slot = magic.index(occ);
            if stamp[slot] != attempt {
                stamp[slot] = attempt;
                used[slot] = attack;
            } else if used[slot] != attack {
                collision = true;
                break;
            }
        }
        if !collision {
            return Ok(magic);
        }
    }

    Err(AttackTableError::MagicNotFound {
        slider,
        square: sq,
        attempts: MAX_MAGIC_ATTEMPTS,
    })
}
