//! Alpha-beta search with iterative deepening and multi-lane voting.
//!
//! Each lane runs the full iterative-deepening search on its own board copy
//! against a shared transposition table. Helper lanes randomize quiet-move
//! ordering near the root to diversify the tree; lane 0 stays canonical.

mod alphabeta;
pub mod lanes;
mod ordering;

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::time::Instant;

use rand::rngs::StdRng;

use crate::board::types::{Move, MAX_PLY};
use crate::board::{AttackTables, MoveGenerator, RepetitionTracker};
use crate::tt::TranspositionTable;

pub use lanes::{parallel_search, LaneOutcome, SearchLimits, SearchReport};

/// Rating for delivering checkmate at the root.
pub const MATE_SCORE: i32 = 30_000;

/// Scores beyond this are mate scores and carry a distance-to-mate component.
pub(crate) const MATE_THRESHOLD: i32 = MATE_SCORE - MAX_PLY as i32;

pub(crate) const DRAW_SCORE: i32 = 0;

pub(crate) const INFINITY: i32 = 31_000;

/// Default transposition table size in MB.
pub const DEFAULT_TT_MB: usize = 256;

/// Per-lane quiet-move history, indexed by (from, to).
pub struct HistoryTable {
    entries: [i32; 4096],
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryTable {
    #[must_use]
    pub fn new() -> Self {
        HistoryTable { entries: [0; 4096] }
    }

    #[must_use]
    pub fn score(&self, mv: Move) -> i32 {
        let idx = mv.from().as_index() * 64 + mv.to().as_index();
        self.entries.get(idx).copied().unwrap_or(0)
    }

    /// Credit a quiet move that caused a beta cutoff.
    pub fn update(&mut self, mv: Move, depth: u32) {
        let idx = mv.from().as_index() * 64 + mv.to().as_index();
        if let Some(entry) = self.entries.get_mut(idx) {
            let bonus = (depth * depth) as i32;
            *entry = entry.saturating_add(bonus);
        }
    }

    pub fn reset(&mut self) {
        self.entries = [0; 4096];
    }
}

/// Mutable search state for one lane.
pub(crate) struct Lane<'a> {
    pub(crate) generator: MoveGenerator<'a>,
    pub(crate) tt: &'a TranspositionTable,
    pub(crate) stop: &'a AtomicBool,
    pub(crate) deadline: Option<Instant>,
    pub(crate) repetitions: RepetitionTracker,
    pub(crate) history: HistoryTable,
    /// Ordering jitter; canonical lane carries none
    pub(crate) jitter: Option<StdRng>,
    pub(crate) nodes: u64,
    pub(crate) aborted: bool,
}

impl<'a> Lane<'a> {
    pub(crate) fn new(
        tables: &'a AttackTables,
        tt: &'a TranspositionTable,
        stop: &'a AtomicBool,
        deadline: Option<Instant>,
        repetitions: RepetitionTracker,
        jitter: Option<StdRng>,
    ) -> Self {
        Lane {
            generator: MoveGenerator::new(tables),
            tt,
            stop,
            deadline,
            repetitions,
            history: HistoryTable::new(),
            jitter,
            nodes: 0,
            aborted: false,
        }
    }

    /// Cooperative cancellation poll, called at every recursion entry.
    pub(crate) fn should_stop(&self) -> bool {
        if self.stop.load(AtomicOrdering::Relaxed) {
            return true;
        }
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }
}

/// Shift a mate score so the stored value is distance-to-mate from this
/// node rather than from the root.
pub(crate) fn to_tt_score(score: i32, ply: u32) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply as i32
    } else if score <= -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

/// Inverse of `to_tt_score`.
pub(crate) fn from_tt_score(score: i32, ply: u32) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply as i32
    } else if score <= -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}
