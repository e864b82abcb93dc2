//! Sliding-piece attack tables and fixed jump tables.
//!
//! Sliding attacks (rook, bishop, queen) use magic-indexed lookup tables:
//! per square, the relevant blocker mask and a multiplier that perfect-hashes
//! every blocker subset into a dense attack array. The tables are produced
//! offline by [`builder`] (see the `gen_tables` binary), persisted as JSON by
//! [`store`], and read-only once loaded. A lookup is a mask, a multiply, and
//! an array index.
//!
//! Knight, king and pawn-capture attacks are fixed offset tables computed at
//! first use; they carry no blocker state and are never persisted.

pub(crate) mod builder;
mod store;

pub use store::TableError;

use std::path::Path;

use once_cell::sync::Lazy;

/// Magic lookup data for one square and one ray family.
#[derive(Clone, Debug)]
pub(crate) struct Magic {
    /// Relevant occupancy mask (ray squares, board edges trimmed)
    pub(crate) mask: u64,
    /// Perfect-hash multiplier found by the offline Las-Vegas search
    pub(crate) magic: u64,
    /// `64 - popcount(mask)`
    pub(crate) shift: u32,
    /// Start of this square's slice in the shared attack arena
    pub(crate) offset: usize,
}

impl Magic {
    #[inline]
    fn index(&self, occupancy: u64) -> usize {
        let masked = occupancy & self.mask;
        (masked.wrapping_mul(self.magic) >> self.shift) as usize
    }
}

/// Precomputed sliding-piece attack tables.
///
/// Built offline ([`AttackTables::generate`]) or deserialized from a table
/// file ([`AttackTables::load`]); immutable afterwards.
#[derive(Clone)]
pub struct AttackTables {
    pub(crate) rook: Vec<Magic>,   // one per square
    pub(crate) bishop: Vec<Magic>, // one per square
    /// Flat arena holding every stored attack bitboard, sized upfront from
    /// the file's total entry count.
    pub(crate) attacks: Vec<u64>,
}

impl AttackTables {
    /// Build the tables from scratch, including the magic-number search.
    ///
    /// This runs the randomized search and is meant for the offline
    /// generation tool and tests; runtime code should [`load`](Self::load)
    /// a previously generated file.
    #[must_use]
    pub fn generate() -> Self {
        builder::build()
    }

    /// Load tables from a file produced by the generation tool.
    ///
    /// A missing or corrupt file is a fatal startup condition for the
    /// engine; the typed error is for the caller to report before exiting.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        store::load(path)
    }

    /// Persist the tables for later [`load`](Self::load).
    pub fn save(&self, path: &Path) -> Result<(), TableError> {
        store::save(self, path)
    }

    /// Total number of stored attack bitboards across both ray families.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.attacks.len()
    }

    /// Rook attacks from `square` given full-board `occupancy`.
    #[inline]
    #[must_use]
    pub fn rook_attacks(&self, square: usize, occupancy: u64) -> u64 {
        let m = &self.rook[square];
        self.attacks[m.offset + m.index(occupancy)]
    }

    /// Bishop attacks from `square` given full-board `occupancy`.
    #[inline]
    #[must_use]
    pub fn bishop_attacks(&self, square: usize, occupancy: u64) -> u64 {
        let m = &self.bishop[square];
        self.attacks[m.offset + m.index(occupancy)]
    }

    /// Queen attacks: union of both ray families.
    #[inline]
    #[must_use]
    pub fn queen_attacks(&self, square: usize, occupancy: u64) -> u64 {
        self.rook_attacks(square, occupancy) | self.bishop_attacks(square, occupancy)
    }
}

fn offset_square(sq: usize, dr: isize, df: isize) -> Option<usize> {
    let r = (sq / 8) as isize + dr;
    let f = (sq % 8) as isize + df;
    if (0..8).contains(&r) && (0..8).contains(&f) {
        Some((r * 8 + f) as usize)
    } else {
        None
    }
}

fn jump_table(offsets: &[(isize, isize)]) -> [u64; 64] {
    let mut table = [0u64; 64];
    for (sq, entry) in table.iter_mut().enumerate() {
        for &(dr, df) in offsets {
            if let Some(to) = offset_square(sq, dr, df) {
                *entry |= 1u64 << to;
            }
        }
    }
    table
}

/// Knight jump targets per square
pub(crate) static KNIGHT_ATTACKS: Lazy<[u64; 64]> = Lazy::new(|| {
    jump_table(&[
        (2, 1),
        (2, -1),
        (-2, 1),
        (-2, -1),
        (1, 2),
        (1, -2),
        (-1, 2),
        (-1, -2),
    ])
});

/// King neighbor squares per square
pub(crate) static KING_ATTACKS: Lazy<[u64; 64]> = Lazy::new(|| {
    jump_table(&[
        (1, -1),
        (1, 0),
        (1, 1),
        (0, -1),
        (0, 1),
        (-1, -1),
        (-1, 0),
        (-1, 1),
    ])
});

/// Pawn capture squares per color and square (diagonal squares only)
pub(crate) static PAWN_ATTACKS: Lazy<[[u64; 64]; 2]> = Lazy::new(|| {
    [
        jump_table(&[(1, -1), (1, 1)]),   // white
        jump_table(&[(-1, -1), (-1, 1)]), // black
    ]
});

/// `BETWEEN[a][b]`: squares strictly between `a` and `b` when they share a
/// rank, file or diagonal; empty otherwise.
pub(crate) static BETWEEN: Lazy<Box<[[u64; 64]; 64]>> = Lazy::new(|| {
    let mut table = Box::new([[0u64; 64]; 64]);
    let dirs: [(isize, isize); 8] = [
        (1, 0),
        (-1, 0),
        (0, 1),
        (0, -1),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ];
    for a in 0..64 {
        for (dr, df) in dirs {
            let mut between = 0u64;
            let mut cur = a;
            while let Some(next) = offset_square(cur, dr, df) {
                table[a][next] = between;
                between |= 1u64 << next;
                cur = next;
            }
        }
    }
    table
});
