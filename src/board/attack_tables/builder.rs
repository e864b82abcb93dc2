//! Offline attack-table construction.
//!
//! For each square and ray family this traces the rays to the board edge,
//! trims the edge squares for the relevant occupancy mask, enumerates every
//! blocker subset of that mask, ray-traces the true attack set for each
//! subset, and then searches for a magic multiplier that hashes all subsets
//! into a dense table without mapping two different attack sets to the same
//! slot. The multiplier search is a Las-Vegas algorithm: draw random sparse
//! candidates until one verifies. It runs only here; the runtime loader
//! never repeats it.

use rand::prelude::*;

use super::{AttackTables, Magic};

pub(crate) const ROOK_DIRECTIONS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub(crate) const BISHOP_DIRECTIONS: [(isize, isize); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Trace attacks from `sq` with the given blockers; rays stop at (and
/// include) the first blocker.
pub(crate) fn ray_attacks(sq: usize, blockers: u64, directions: &[(isize, isize); 4]) -> u64 {
    let mut attacks = 0u64;
    for &(dr, df) in directions {
        let mut r = (sq / 8) as isize + dr;
        let mut f = (sq % 8) as isize + df;
        while (0..8).contains(&r) && (0..8).contains(&f) {
            let bit = 1u64 << (r * 8 + f);
            attacks |= bit;
            if blockers & bit != 0 {
                break;
            }
            r += dr;
            f += df;
        }
    }
    attacks
}

/// Relevant occupancy mask: the ray squares excluding the outermost edge
/// square of each ray, which can never change the attack set.
fn relevant_mask(sq: usize, directions: &[(isize, isize); 4]) -> u64 {
    let mut mask = 0u64;
    for &(dr, df) in directions {
        let mut r = (sq / 8) as isize + dr;
        let mut f = (sq % 8) as isize + df;
        while (0..8).contains(&(r + dr)) && (0..8).contains(&(f + df)) {
            mask |= 1u64 << (r * 8 + f);
            r += dr;
            f += df;
        }
    }
    mask
}

/// The `index`-th subset of `mask`: distribute the index's bits over the
/// mask's set bits.
pub(crate) fn subset_of_mask(mask: u64, index: u64) -> u64 {
    let mut subset = 0u64;
    let mut remaining = mask;
    let mut bit = 0;
    while remaining != 0 {
        let sq = remaining.trailing_zeros();
        remaining &= remaining - 1;
        if index & (1 << bit) != 0 {
            subset |= 1u64 << sq;
        }
        bit += 1;
    }
    subset
}

/// One square's reference data: every (blocker subset, attack set) pair.
struct Reference {
    mask: u64,
    pairs: Vec<(u64, u64)>,
}

fn reference_for(sq: usize, directions: &[(isize, isize); 4]) -> Reference {
    let mask = relevant_mask(sq, directions);
    let count = 1u64 << mask.count_ones();
    let mut pairs = Vec::with_capacity(count as usize);
    for index in 0..count {
        let blockers = subset_of_mask(mask, index);
        pairs.push((blockers, ray_attacks(sq, blockers, directions)));
    }
    Reference { mask, pairs }
}

/// Find a collision-free multiplier for one square's reference data and fill
/// the dense attack table it indexes. Almost-surely terminates; sparse
/// candidates (AND of three random words) converge in a few dozen tries.
fn find_magic(rng: &mut StdRng, reference: &Reference) -> (u64, Vec<u64>) {
    let bits = reference.mask.count_ones();
    let shift = 64 - bits;
    let size = 1usize << bits;

    loop {
        let candidate = rng.gen::<u64>() & rng.gen::<u64>() & rng.gen::<u64>();
        // weed out multipliers that cannot spread the mask's high bits
        if (reference.mask.wrapping_mul(candidate) >> 56).count_ones() < 6 {
            continue;
        }

        let mut table = vec![0u64; size];
        let mut used = vec![false; size];
        let mut collided = false;

        for &(blockers, attacks) in &reference.pairs {
            let index = (blockers.wrapping_mul(candidate) >> shift) as usize;
            if used[index] && table[index] != attacks {
                collided = true;
                break;
            }
            table[index] = attacks;
            used[index] = true;
        }

        if !collided {
            return (candidate, table);
        }
    }
}

/// Build complete tables for both ray families.
pub(crate) fn build() -> AttackTables {
    // Fixed seed: generation is deterministic, which keeps the persisted
    // file stable across regenerations.
    let mut rng = StdRng::seed_from_u64(0x7AB7E5);

    let mut rook = Vec::with_capacity(64);
    let mut bishop = Vec::with_capacity(64);
    let mut attacks: Vec<u64> = Vec::new();

    for (family, directions) in [(&mut rook, &ROOK_DIRECTIONS), (&mut bishop, &BISHOP_DIRECTIONS)]
    {
        for sq in 0..64 {
            let reference = reference_for(sq, directions);
            let (magic, table) = find_magic(&mut rng, &reference);
            family.push(Magic {
                mask: reference.mask,
                magic,
                shift: 64 - reference.mask.count_ones(),
                offset: attacks.len(),
            });
            attacks.extend_from_slice(&table);
        }
    }

    log::debug!("attack tables built: {} entries", attacks.len());

    AttackTables {
        rook,
        bishop,
        attacks,
    }
}
