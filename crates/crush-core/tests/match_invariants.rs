use crush_core::game::match_state::{
    EXTRA_TURN_MIN_CRUSH, MatchError, MatchRules, MatchState, PlayerId,
};
use crush_core::game::serialization::BoardSnapshot;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

fn rules(turns: u32) -> MatchRules {
    MatchRules {
        cols: 8,
        playable_rows: 8,
        staging_rows: 8,
        colors: 6,
        turns,
    }
}

fn match_seed(index: usize) -> u64 {
    let mut rng = StdRng::seed_from_u64(20260601);
    let mut seed = 0u64;
    for _ in 0..=index {
        seed = rng.next_u64();
    }
    seed
}

#[test]
fn random_matches_keep_score_and_turn_order_consistent() {
    for index in 0..6 {
        let mut state = MatchState::with_seed(rules(20), match_seed(index)).unwrap();
        let mut picker = StdRng::seed_from_u64(index as u64);

        while !state.is_finished() {
            let legal = state.legal_moves();
            assert!(!legal.is_empty(), "match {index} stalled without moves");

            let mover = state.to_move();
            let before = state.scores();
            let extra_before = state.extra_turns(mover);
            let mv = legal[picker.gen_range(0..legal.len())];

            let turn = state.apply_move(&mv).unwrap();

            assert_eq!(turn.player, mover);
            assert!(turn.cascades >= 1);
            assert!(turn.initial_removed >= 3);
            assert!(turn.removed >= turn.initial_removed);
            assert_eq!(turn.extra_turn, turn.initial_removed >= EXTRA_TURN_MIN_CRUSH);
            assert_eq!(
                state.score(mover),
                before[mover.index()] + turn.removed as u32
            );
            assert_eq!(
                state.score(mover.other()),
                before[mover.other().index()]
            );

            if turn.extra_turn {
                assert_eq!(state.to_move(), mover);
                assert_eq!(state.extra_turns(mover), extra_before + 1);
            } else {
                assert_eq!(state.to_move(), mover.other());
            }

            assert!(state.board().crushing_cells().is_empty());
            assert_eq!(state.board().unknown_count(), 0);
        }

        assert_eq!(state.turns_played(), 20);
        let total: u32 = PlayerId::LOOP.iter().map(|p| state.score(*p)).sum();
        assert!(total >= 3 * 20);
    }
}

#[test]
fn same_seed_and_moves_replay_identically() {
    let play = |seed: u64| {
        let mut state = MatchState::with_seed(rules(12), seed).unwrap();
        let mut log = Vec::new();
        while !state.is_finished() {
            let mv = state.legal_moves()[0];
            let turn = state.apply_move(&mv).unwrap();
            log.push((turn.player, turn.removed, turn.reshuffled));
        }
        (log, state.scores(), state.board().clone())
    };

    let seed = match_seed(9);
    assert_eq!(play(seed), play(seed));
}

#[test]
fn finished_matches_reject_further_moves() {
    let mut state = MatchState::with_seed(rules(1), match_seed(3)).unwrap();
    let mv = state.legal_moves()[0];
    state.apply_move(&mv).unwrap();

    assert!(state.is_finished());
    let next = state.legal_moves()[0];
    assert_eq!(state.apply_move(&next), Err(MatchError::Finished(1)));
}

#[test]
fn board_snapshots_survive_a_played_match() {
    let mut state = MatchState::with_seed(rules(5), match_seed(4)).unwrap();
    while !state.is_finished() {
        let mv = state.legal_moves()[0];
        state.apply_move(&mv).unwrap();
    }

    let json = BoardSnapshot::to_json(state.board()).unwrap();
    let restored = BoardSnapshot::from_json(&json).unwrap().restore().unwrap();
    assert_eq!(&restored, state.board());
    assert_eq!(restored.playable_rows(), 8);
    assert_eq!(restored.rows(), 16);
}
