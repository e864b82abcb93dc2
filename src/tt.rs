//! Shared transposition table.
//!
//! Lockless hashing for concurrent search lanes: each slot holds two atomic
//! words, (hash ^ data) and data, so a torn read from a racing write fails
//! the XOR check and is discarded instead of corrupting the probe.

use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::board::types::Move;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundType {
    /// Score settled strictly inside the search window
    Exact,
    /// Search failed high; the true score is at least this value
    LowerBound,
    /// Search failed low; the true score is at most this value
    UpperBound,
}

impl BoundType {
    fn to_u8(self) -> u8 {
        match self {
            BoundType::Exact => 0,
            BoundType::LowerBound => 1,
            BoundType::UpperBound => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v & 0x3 {
            0 => BoundType::Exact,
            1 => BoundType::LowerBound,
            _ => BoundType::UpperBound,
        }
    }
}

/// Unpacked entry returned by `probe`.
#[derive(Clone, Debug)]
pub struct TTEntry {
    pub depth: u8,
    pub score: i16,
    pub bound_type: BoundType,
    pub best_move: Option<Move>,
}

/// Packed entry format:
/// - bits 0-31:  move (u32, 0 = no move)
/// - bits 32-47: score (i16 as u16)
/// - bits 48-55: depth (u8)
/// - bits 56-57: bound
fn pack_entry(depth: u8, score: i16, bound_type: BoundType, best_move: Option<Move>) -> u64 {
    let mv: u32 = best_move.map(Move::as_u32).unwrap_or(0);
    (mv as u64)
        | ((score as u16 as u64) << 32)
        | ((depth as u64) << 48)
        | ((bound_type.to_u8() as u64) << 56)
}

fn unpack_entry(data: u64) -> TTEntry {
    let mv_bits = (data & 0xFFFF_FFFF) as u32;
    let score = ((data >> 32) & 0xFFFF) as i16;
    let depth = ((data >> 48) & 0xFF) as u8;
    let bound_type = BoundType::from_u8(((data >> 56) & 0x3) as u8);

    let best_move = if mv_bits == 0 {
        None
    } else {
        Some(Move::from_u32(mv_bits))
    };

    TTEntry {
        depth,
        score,
        bound_type,
        best_move,
    }
}

/// One lockless slot: (hash ^ data, data).
#[repr(C)]
struct TTSlot {
    key_xor: AtomicU64,
    data: AtomicU64,
}

impl TTSlot {
    fn new() -> Self {
        TTSlot {
            key_xor: AtomicU64::new(0),
            data: AtomicU64::new(0),
        }
    }

    fn store(&self, hash: u64, packed: u64) {
        // data first, key second: a reader that sees the new key also sees
        // matching data or fails the XOR check
        self.data.store(packed, Ordering::Relaxed);
        self.key_xor.store(hash ^ packed, Ordering::Relaxed);
    }

    fn probe(&self, hash: u64) -> Option<TTEntry> {
        let key_xor = self.key_xor.load(Ordering::Relaxed);
        let data = self.data.load(Ordering::Relaxed);
        if key_xor ^ data == hash && data != 0 {
            Some(unpack_entry(data))
        } else {
            None
        }
    }

    fn is_empty(&self) -> bool {
        self.data.load(Ordering::Relaxed) == 0
    }

    fn depth(&self) -> u8 {
        ((self.data.load(Ordering::Relaxed) >> 48) & 0xFF) as u8
    }
}

const BUCKET_SIZE: usize = 4;

#[repr(C)]
struct TTBucket {
    slots: [TTSlot; BUCKET_SIZE],
}

impl TTBucket {
    fn new() -> Self {
        TTBucket {
            slots: [TTSlot::new(), TTSlot::new(), TTSlot::new(), TTSlot::new()],
        }
    }
}

/// Concurrent transposition table shared by all search lanes.
///
/// Readers and writers never block each other; torn reads are detected and
/// dropped. Replacement never regresses depth: an entry is only overwritten
/// by one searched at least as deep.
pub struct TranspositionTable {
    buckets: Vec<TTBucket>,
    mask: usize,
}

impl TranspositionTable {
    /// Create a table of roughly `size_mb` megabytes (rounded down to a
    /// power-of-two bucket count).
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let bucket_size = mem::size_of::<TTBucket>();
        let mut num_buckets = (size_mb * 1024 * 1024) / bucket_size;
        num_buckets = num_buckets.next_power_of_two() / 2;
        if num_buckets == 0 {
            num_buckets = 1024;
        }

        let mut buckets = Vec::with_capacity(num_buckets);
        for _ in 0..num_buckets {
            buckets.push(TTBucket::new());
        }

        TranspositionTable {
            buckets,
            mask: num_buckets - 1,
        }
    }

    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    /// Look up the entry for `hash`, if any slot in its bucket holds one.
    pub fn probe(&self, hash: u64) -> Option<TTEntry> {
        let bucket = &self.buckets[self.index(hash)];
        for slot in &bucket.slots {
            if let Some(entry) = slot.probe(hash) {
                return Some(entry);
            }
        }
        None
    }

    /// Store a search result.
    ///
    /// A slot already holding this position is updated only when the new
    /// depth is at least the stored depth. Otherwise the shallowest slot in
    /// the bucket is the replacement victim, again only if the new entry is
    /// at least as deep.
    pub fn store(
        &self,
        hash: u64,
        depth: u32,
        score: i32,
        bound_type: BoundType,
        best_move: Option<Move>,
    ) {
        let depth_u8 = depth.min(255) as u8;
        let score_i16 = score.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        let packed = pack_entry(depth_u8, score_i16, bound_type, best_move);
        let bucket = &self.buckets[self.index(hash)];

        for slot in &bucket.slots {
            if slot.is_empty() {
                slot.store(hash, packed);
                return;
            }
            if slot.probe(hash).is_some() {
                if depth_u8 >= slot.depth() {
                    slot.store(hash, packed);
                }
                return;
            }
        }

        let victim = bucket
            .slots
            .iter()
            .min_by_key(|slot| slot.depth())
            .unwrap_or(&bucket.slots[0]);
        if depth_u8 >= victim.depth() {
            victim.store(hash, packed);
        }
    }

    /// Table fullness in per mille, sampled over the first buckets.
    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        let sample_size = self.buckets.len().min(1000);
        let mut occupied = 0;
        for bucket in self.buckets.iter().take(sample_size) {
            for slot in &bucket.slots {
                if !slot.is_empty() {
                    occupied += 1;
                }
            }
        }
        let total_slots = sample_size * BUCKET_SIZE;
        ((occupied as u64 * 1000) / total_slots as u64) as u32
    }

    /// Drop every entry.
    pub fn clear(&self) {
        for bucket in &self.buckets {
            for slot in &bucket.slots {
                slot.key_xor.store(0, Ordering::Relaxed);
                slot.data.store(0, Ordering::Relaxed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::{Piece, Square};

    fn sample_move() -> Move {
        Move::quiet(Square(1, 4), Square(3, 4), Piece::Pawn)
    }

    #[test]
    fn pack_unpack_round_trip() {
        let cases = [
            (10u8, 500i16, BoundType::Exact, Some(sample_move())),
            (255u8, -32000i16, BoundType::LowerBound, None),
            (0u8, -1i16, BoundType::UpperBound, Some(sample_move())),
        ];
        for (depth, score, bound, mv) in cases {
            let unpacked = unpack_entry(pack_entry(depth, score, bound, mv));
            assert_eq!(unpacked.depth, depth);
            assert_eq!(unpacked.score, score);
            assert_eq!(unpacked.bound_type, bound);
            assert_eq!(
                unpacked.best_move.map(Move::as_u32),
                mv.map(Move::as_u32)
            );
        }
    }

    #[test]
    fn store_and_probe() {
        let tt = TranspositionTable::new(1);
        let hash = 0x1234_5678_9ABC_DEF0;
        tt.store(hash, 10, 500, BoundType::Exact, Some(sample_move()));

        let entry = tt.probe(hash).expect("entry present");
        assert_eq!(entry.depth, 10);
        assert_eq!(entry.score, 500);
        assert_eq!(entry.bound_type, BoundType::Exact);
        assert_eq!(entry.best_move.map(Move::as_u32), Some(sample_move().as_u32()));
    }

    #[test]
    fn no_false_positives() {
        let tt = TranspositionTable::new(1);
        tt.store(0x1234_5678_9ABC_DEF0, 10, 500, BoundType::Exact, None);
        assert!(tt.probe(0xFEDC_BA98_7654_3210).is_none());
    }

    #[test]
    fn shallower_result_never_replaces_deeper() {
        let tt = TranspositionTable::new(1);
        let hash = 0xDEAD_BEEF_0000_0001;
        tt.store(hash, 8, 120, BoundType::Exact, None);
        tt.store(hash, 3, -40, BoundType::LowerBound, None);

        let entry = tt.probe(hash).expect("entry present");
        assert_eq!(entry.depth, 8);
        assert_eq!(entry.score, 120);
    }

    #[test]
    fn equal_depth_overwrites() {
        let tt = TranspositionTable::new(1);
        let hash = 0xDEAD_BEEF_0000_0002;
        tt.store(hash, 5, 10, BoundType::UpperBound, None);
        tt.store(hash, 5, 30, BoundType::Exact, None);

        let entry = tt.probe(hash).expect("entry present");
        assert_eq!(entry.score, 30);
        assert_eq!(entry.bound_type, BoundType::Exact);
    }

    #[test]
    fn clear_empties_the_table() {
        let tt = TranspositionTable::new(1);
        let hash = 0x5555_AAAA_5555_AAAA;
        tt.store(hash, 4, 0, BoundType::Exact, Some(sample_move()));
        tt.clear();
        assert!(tt.probe(hash).is_none());
        assert_eq!(tt.hashfull_per_mille(), 0);
    }
}
