//! Property-based tests over random legal move walks.

use proptest::prelude::*;
use rand::{rngs::StdRng, Rng as _, SeedableRng};

use crate::board::test_util::tables;
use crate::board::types::Move;
use crate::board::{Board, MoveGenerator, UnmakeInfo};

fn walk_length_strategy() -> impl Strategy<Value = usize> {
    1..=100usize
}

fn seed_strategy() -> impl Strategy<Value = u64> {
    any::<u64>()
}

proptest! {
    /// make_move then unmake_move restores the position bit for bit.
    #[test]
    fn make_unmake_restores_state(seed in seed_strategy(), walk in walk_length_strategy()) {
        let generator = MoveGenerator::new(tables());
        let mut board = Board::new();
        let mut rng = StdRng::seed_from_u64(seed);

        let initial_hash = board.hash();
        let initial_fen = board.to_fen();
        let mut history: Vec<(Move, UnmakeInfo)> = Vec::new();

        for _ in 0..walk {
            let moves = generator.generate(&board).moves;
            if moves.is_empty() {
                break;
            }
            let mv = moves.as_slice()[rng.gen_range(0..moves.len())];
            let info = board.make_move(mv);
            history.push((mv, info));
        }

        while let Some((mv, info)) = history.pop() {
            board.unmake_move(mv, info);
        }

        prop_assert_eq!(board.hash(), initial_hash);
        prop_assert_eq!(board.to_fen(), initial_fen);
    }

    /// The incrementally maintained hash always matches a from-scratch
    /// recomputation.
    #[test]
    fn incremental_hash_matches_recomputed(seed in seed_strategy(), walk in walk_length_strategy()) {
        let generator = MoveGenerator::new(tables());
        let mut board = Board::new();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..walk {
            let moves = generator.generate(&board).moves;
            if moves.is_empty() {
                break;
            }
            let mv = moves.as_slice()[rng.gen_range(0..moves.len())];
            board.make_move(mv);
            prop_assert_eq!(board.hash(), board.calculate_hash());
        }
    }

    /// FEN round-trips through parse and serialize.
    #[test]
    fn fen_round_trip(seed in seed_strategy(), walk in walk_length_strategy()) {
        let generator = MoveGenerator::new(tables());
        let mut board = Board::new();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..walk {
            let moves = generator.generate(&board).moves;
            if moves.is_empty() {
                break;
            }
            let mv = moves.as_slice()[rng.gen_range(0..moves.len())];
            board.make_move(mv);
        }

        let fen = board.to_fen();
        let reparsed = Board::try_from_fen(&fen).expect("own FEN must parse");
        prop_assert_eq!(reparsed.to_fen(), fen);
        prop_assert_eq!(reparsed.hash(), board.hash());
    }

    /// Every generated move stays legal: the mover's king is never left
    /// in check afterwards.
    #[test]
    fn generated_moves_never_leave_the_king_in_check(seed in seed_strategy(), walk in walk_length_strategy()) {
        let generator = MoveGenerator::new(tables());
        let mut board = Board::new();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..walk {
            let moves = generator.generate(&board).moves;
            if moves.is_empty() {
                break;
            }
            let mover = board.side_to_move();
            let mv = moves.as_slice()[rng.gen_range(0..moves.len())];
            board.make_move(mv);
            prop_assert!(
                generator.checkers_of(&board, mover).is_empty(),
                "{mv} left the king in check at {}",
                board.to_fen()
            );
        }
    }
}
