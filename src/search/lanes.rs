//! Multi-lane concurrent search with plurality voting.
//!
//! Every lane searches the same root position to the same depth budget
//! against the shared transposition table. Helper lanes shuffle their
//! shallow quiet-move ordering, so the lanes explore differently shaped
//! trees and their final choices form a vote.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::board::types::Move;
use crate::board::{AttackTables, Board, RepetitionTracker};
use crate::tt::TranspositionTable;

use super::Lane;

/// Upper bound on lane count regardless of hardware parallelism.
const MAX_LANES: usize = 8;

/// Deep recursion needs room.
const LANE_STACK_SIZE: usize = 16 * 1024 * 1024;

/// Limits for one search invocation.
#[derive(Clone, Copy, Debug)]
pub struct SearchLimits {
    pub depth: u32,
    pub movetime: Option<Duration>,
}

impl SearchLimits {
    #[must_use]
    pub fn depth(depth: u32) -> Self {
        SearchLimits {
            depth,
            movetime: None,
        }
    }

    #[must_use]
    pub fn with_movetime(mut self, movetime: Duration) -> Self {
        self.movetime = Some(movetime);
        self
    }
}

/// What one lane concluded.
#[derive(Clone, Copy, Debug)]
pub struct LaneOutcome {
    pub lane_id: usize,
    pub best_move: Option<Move>,
    pub score: i32,
    pub depth_completed: u32,
    pub nodes: u64,
}

/// Aggregated result of a multi-lane search.
#[derive(Clone, Copy, Debug)]
pub struct SearchReport {
    pub best_move: Option<Move>,
    pub score: i32,
    pub depth: u32,
    pub nodes: u64,
}

fn run_lane(
    lane_id: usize,
    mut board: Board,
    tables: &AttackTables,
    tt: &TranspositionTable,
    stop: &AtomicBool,
    deadline: Option<Instant>,
    repetitions: RepetitionTracker,
    max_depth: u32,
) -> LaneOutcome {
    let jitter = if lane_id == 0 {
        None
    } else {
        Some(StdRng::seed_from_u64(0x1A9E_0000 ^ lane_id as u64))
    };
    let mut lane = Lane::new(tables, tt, stop, deadline, repetitions, jitter);

    let mut outcome = LaneOutcome {
        lane_id,
        best_move: None,
        score: 0,
        depth_completed: 0,
        nodes: 0,
    };

    for depth in 1..=max_depth {
        let result = lane.search_root(&mut board, depth);
        if lane.aborted {
            break;
        }
        match result {
            Some((mv, score)) => {
                outcome.best_move = Some(mv);
                outcome.score = score;
                outcome.depth_completed = depth;
                log::debug!(
                    "lane {lane_id} depth {depth}: {mv} score {score} nodes {}",
                    lane.nodes
                );
            }
            None => break,
        }
    }

    outcome.nodes = lane.nodes;
    outcome
}

/// Pick the most frequent vote. Ties go to the earliest lane holding a tied
/// move, which is the canonical lane whenever its choice is among the tied.
pub(crate) fn plurality_vote(votes: &[Option<Move>]) -> Option<Move> {
    let cast: Vec<Move> = votes.iter().copied().flatten().collect();
    if cast.is_empty() {
        return None;
    }

    let count_of = |mv: Move| {
        cast.iter()
            .filter(|other| other.as_u32() == mv.as_u32())
            .count()
    };
    let top = cast.iter().map(|&mv| count_of(mv)).max().unwrap_or(0);
    cast.iter().copied().find(|&mv| count_of(mv) == top)
}

/// Run the full multi-lane search and vote on the result.
///
/// Lane 0 is canonical: no ordering jitter, and tie votes resolve to it.
/// All lanes share the table and the stop flag; each gets its own board
/// copy, repetition tracker, and history.
pub fn parallel_search(
    board: &Board,
    tables: &Arc<AttackTables>,
    tt: &Arc<TranspositionTable>,
    stop: &Arc<AtomicBool>,
    repetitions: &RepetitionTracker,
    limits: SearchLimits,
) -> SearchReport {
    let lane_count = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(MAX_LANES);
    let deadline = limits.movetime.map(|budget| Instant::now() + budget);
    let max_depth = limits.depth.max(1);

    let mut handles: Vec<JoinHandle<LaneOutcome>> = Vec::with_capacity(lane_count);
    for lane_id in 0..lane_count {
        let board = board.clone();
        let tables = Arc::clone(tables);
        let tt = Arc::clone(tt);
        let stop = Arc::clone(stop);
        let repetitions = repetitions.clone();

        let handle = thread::Builder::new()
            .name(format!("lane-{lane_id}"))
            .stack_size(LANE_STACK_SIZE)
            .spawn(move || {
                run_lane(
                    lane_id, board, &tables, &tt, &stop, deadline, repetitions, max_depth,
                )
            });
        match handle {
            Ok(handle) => handles.push(handle),
            Err(err) => log::warn!("failed to spawn lane {lane_id}: {err}"),
        }
    }

    let mut outcomes: Vec<LaneOutcome> = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.join() {
            Ok(outcome) => outcomes.push(outcome),
            Err(_) => log::warn!("a search lane panicked; its vote is dropped"),
        }
    }
    outcomes.sort_by_key(|outcome| outcome.lane_id);

    let votes: Vec<Option<Move>> = outcomes.iter().map(|outcome| outcome.best_move).collect();
    let winner = plurality_vote(&votes);

    let total_nodes: u64 = outcomes.iter().map(|outcome| outcome.nodes).sum();
    let backing = winner.and_then(|mv| {
        outcomes
            .iter()
            .find(|outcome| outcome.best_move.map(Move::as_u32) == Some(mv.as_u32()))
    });

    if let (Some(mv), Some(lane)) = (winner, backing) {
        log::info!(
            "vote: {mv} from {} lane(s), canonical lane {} at depth {}, {total_nodes} nodes",
            votes
                .iter()
                .flatten()
                .filter(|v| v.as_u32() == mv.as_u32())
                .count(),
            lane.lane_id,
            lane.depth_completed
        );
    }

    SearchReport {
        best_move: winner,
        score: backing.map_or(0, |lane| lane.score),
        depth: backing.map_or(0, |lane| lane.depth_completed),
        nodes: total_nodes,
    }
}
