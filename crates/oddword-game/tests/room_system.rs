//! Integration tests for the registry, round state machine, and tally,
//! driven end to end with scripted randomness.

use oddword_game::{
    EmptyRoomPolicy, GameConfig, GameError, GameSession, Phase, Player,
    RoomRegistry, ScriptedRandom, TallyResult, VoteTally, WordCatalog,
    WordPair,
};
use oddword_protocol::{PlayerId, RoomCode};

// =========================================================================
// Helpers
// =========================================================================

fn player(id: u64, name: &str) -> Player {
    Player::new(PlayerId(id), name)
}

/// Registry whose first room code is always "ABCDE".
fn registry(policy: EmptyRoomPolicy) -> RoomRegistry {
    let config = GameConfig {
        empty_room_policy: policy,
        ..GameConfig::default()
    };
    RoomRegistry::new(config, Box::new(ScriptedRandom::new([10, 11, 12, 13, 14])))
}

fn catalog() -> WordCatalog {
    WordCatalog::new(vec![
        WordPair::new("Cat", "Dog"),
        WordPair::new("Coffee", "Tea"),
    ])
    .unwrap()
}

/// Session that deals pair `pair` and makes roster index `imposter` the
/// imposter, for every round.
fn session(pair: usize, imposter: usize) -> GameSession {
    GameSession::new(
        &GameConfig::default(),
        catalog(),
        Box::new(ScriptedRandom::new([pair, imposter])),
    )
}

/// Creates a room holding `names` (ids 1..=n) and returns its code.
fn room_with(reg: &mut RoomRegistry, names: &[&str]) -> RoomCode {
    let code = reg.create_room(player(1, names[0])).code().clone();
    for (i, name) in names.iter().enumerate().skip(1) {
        reg.join_room(&code, player(i as u64 + 1, name)).unwrap();
    }
    code
}

/// Deals a round and opens voting.
fn to_voting(reg: &mut RoomRegistry, session: &mut GameSession, code: &RoomCode) {
    let room = reg.get_room_mut(code).unwrap();
    session.start_round(room).unwrap();
    session.begin_voting(room).unwrap();
}

fn vote(
    reg: &mut RoomRegistry,
    code: &RoomCode,
    voter: &str,
    target: &str,
) -> Result<Option<TallyResult>, GameError> {
    VoteTally::record_vote(reg.get_room_mut(code).unwrap(), voter, target)
}

// =========================================================================
// RoomRegistry
// =========================================================================

#[test]
fn test_create_room_registers_lobby_with_creator_as_host() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let room = reg.create_room(player(1, "Alice"));

    assert_eq!(room.code().as_str(), "ABCDE");
    assert_eq!(room.phase(), Phase::Lobby);
    assert_eq!(room.host().unwrap().name, "Alice");
    assert_eq!(reg.room_count(), 1);
}

#[test]
fn test_create_room_regenerates_code_on_collision() {
    // First room draws 00000; the second draws 00000 again, then 11111.
    let mut reg = RoomRegistry::new(
        GameConfig::default(),
        Box::new(ScriptedRandom::new([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1])),
    );

    let first = reg.create_room(player(1, "Alice")).code().clone();
    let second = reg.create_room(player(2, "Bob")).code().clone();

    assert_eq!(first.as_str(), "00000");
    assert_eq!(second.as_str(), "11111");
    assert_eq!(reg.codes(), vec![first, second]);
}

#[test]
fn test_create_room_grows_code_when_space_is_exhausted() {
    // A source that only ever yields '0' can't produce a second 5-char code.
    let mut reg = RoomRegistry::new(
        GameConfig::default(),
        Box::new(ScriptedRandom::new([0])),
    );
    reg.create_room(player(1, "Alice"));
    let second = reg.create_room(player(2, "Bob")).code().clone();
    assert_eq!(second.as_str(), "000000");
}

#[test]
fn test_join_room_is_case_insensitive_and_ordered() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    reg.create_room(player(1, "Alice"));

    let room = reg.join_room(&RoomCode::new("abcde"), player(2, "Bob")).unwrap();

    assert_eq!(room.player_names(), vec!["Alice", "Bob"]);
    assert_eq!(
        reg.player_names(&RoomCode::new("AbCdE")).unwrap(),
        vec!["Alice", "Bob"]
    );
}

#[test]
fn test_join_room_not_found() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let err = reg.join_room(&RoomCode::new("NOPE1"), player(1, "Alice")).unwrap_err();
    assert_eq!(err, GameError::RoomNotFound(RoomCode::new("NOPE1")));
}

#[test]
fn test_join_room_twice_with_same_id_does_not_duplicate() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let code = room_with(&mut reg, &["Alice", "Bob"]);

    let room = reg.join_room(&code, player(2, "Bob")).unwrap();

    assert_eq!(room.len(), 2);
}

#[test]
fn test_join_room_refuses_a_name_already_in_the_room() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let code = room_with(&mut reg, &["Sam", "Ann"]);

    let err = reg.join_room(&code, player(3, "Sam")).unwrap_err();

    assert_eq!(err, GameError::NameTaken("Sam".into()));
    assert_eq!(reg.player_names(&code).unwrap(), vec!["Sam", "Ann"]);
}

#[test]
fn test_name_frees_up_when_its_owner_leaves() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let code = room_with(&mut reg, &["Sam", "Ann"]);
    reg.remove_player(PlayerId(1));

    reg.join_room(&code, player(3, "Sam")).unwrap();

    assert_eq!(reg.player_names(&code).unwrap(), vec!["Ann", "Sam"]);
}

#[test]
fn test_join_room_fails_in_every_non_lobby_phase() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let mut session = session(0, 0);
    let code = room_with(&mut reg, &["Alice", "Bob", "Carol"]);

    session.start_round(reg.get_room_mut(&code).unwrap()).unwrap();
    assert_eq!(
        reg.join_room(&code, player(9, "Zed")).unwrap_err(),
        GameError::RoomInProgress(code.clone())
    );

    session.begin_voting(reg.get_room_mut(&code).unwrap()).unwrap();
    assert!(matches!(
        reg.join_room(&code, player(9, "Zed")),
        Err(GameError::RoomInProgress(_))
    ));

    for name in ["Alice", "Bob", "Carol"] {
        vote(&mut reg, &code, name, "Alice").unwrap();
    }
    assert_eq!(reg.get_room(&code).unwrap().phase(), Phase::Revealed);
    assert!(matches!(
        reg.join_room(&code, player(9, "Zed")),
        Err(GameError::RoomInProgress(_))
    ));
    assert_eq!(reg.get_room(&code).unwrap().len(), 3);
}

#[test]
fn test_remove_player_reports_touched_rooms_without_deleting() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let code = room_with(&mut reg, &["Alice"]);

    let touched = reg.remove_player(PlayerId(1));

    assert_eq!(touched, vec![code.clone()]);
    assert!(reg.get_room(&code).unwrap().is_empty());
    assert!(reg.remove_player(PlayerId(1)).is_empty());
}

#[test]
fn test_leave_room_only_touches_that_room() {
    let mut reg = RoomRegistry::new(
        GameConfig::default(),
        Box::new(ScriptedRandom::new([1, 1, 1, 1, 1, 2, 2, 2, 2, 2])),
    );
    let first = reg.create_room(player(1, "Alice")).code().clone();
    let second = reg.create_room(player(2, "Bob")).code().clone();
    reg.join_room(&second, player(1, "Alice")).unwrap();

    assert!(reg.leave_room(&first, PlayerId(1)).unwrap());
    assert!(!reg.leave_room(&first, PlayerId(1)).unwrap());

    assert!(reg.get_room(&first).unwrap().is_empty());
    assert_eq!(reg.player_names(&second).unwrap(), vec!["Bob", "Alice"]);
    assert!(reg.leave_room(&RoomCode::new("99999"), PlayerId(1)).is_err());
}

#[test]
fn test_reap_deletes_empty_rooms_under_delete_policy() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let code = room_with(&mut reg, &["Alice"]);

    let touched = reg.remove_player(PlayerId(1));
    let deleted = reg.reap(&touched);

    assert_eq!(deleted, vec![code.clone()]);
    assert!(matches!(reg.get_room(&code), Err(GameError::RoomNotFound(_))));
    assert_eq!(reg.room_count(), 0);
}

#[test]
fn test_reap_keeps_non_empty_rooms() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let code = room_with(&mut reg, &["Alice", "Bob"]);

    let touched = reg.remove_player(PlayerId(1));

    assert!(reg.reap(&touched).is_empty());
    assert_eq!(reg.get_room(&code).unwrap().host().unwrap().name, "Bob");
}

#[test]
fn test_reap_retains_empty_rooms_under_retain_policy() {
    let mut reg = registry(EmptyRoomPolicy::Retain);
    let code = room_with(&mut reg, &["Alice"]);

    let touched = reg.remove_player(PlayerId(1));

    assert!(reg.reap(&touched).is_empty());
    assert!(reg.get_room(&code).is_ok());
}

#[test]
fn test_room_of_and_delete_room() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let code = room_with(&mut reg, &["Alice", "Bob"]);

    assert_eq!(reg.room_of(PlayerId(2)), Some(&code));
    assert_eq!(reg.room_of(PlayerId(7)), None);

    let removed = reg.delete_room(&code).unwrap();
    assert_eq!(removed.len(), 2);
    assert!(reg.delete_room(&code).is_err());
}

// =========================================================================
// GameSession
// =========================================================================

#[test]
fn test_every_player_gets_exactly_one_word_and_one_imposter_exists() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let code = room_with(&mut reg, &["Alice", "Bob", "Carol", "Dave", "Eve"]);

    for imposter in 0..5 {
        let mut session = session(imposter % 2, imposter);
        let room = reg.get_room_mut(&code).unwrap();
        session.return_to_lobby(room);
        let deal = session.start_round(room).unwrap();

        assert_eq!(deal.len(), 5);
        assert_eq!(deal.iter().filter(|a| a.is_imposter).count(), 1);
        let round = room.round().unwrap();
        assert_eq!(round.assignment().len(), 5);
        for a in &deal {
            assert_eq!(round.word_for(a.player), Some(a.word.as_str()));
            let expected = if a.is_imposter {
                &round.pair().imposter
            } else {
                &round.pair().regular
            };
            assert_eq!(&a.word, expected);
        }
        assert_eq!(deal[imposter].player, round.imposter().id);
    }
}

#[test]
fn test_start_round_below_minimum_leaves_phase_unchanged() {
    for names in [&["Alice"][..], &["Alice", "Bob"][..]] {
        let mut reg = registry(EmptyRoomPolicy::Delete);
        let mut session = session(0, 0);
        let code = room_with(&mut reg, names);

        let err = session.start_round(reg.get_room_mut(&code).unwrap()).unwrap_err();

        assert!(matches!(err, GameError::InsufficientPlayers { need: 3, .. }));
        assert_eq!(reg.get_room(&code).unwrap().phase(), Phase::Lobby);
    }
}

#[test]
fn test_play_again_from_revealed() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let mut session = session(0, 0);
    let code = room_with(&mut reg, &["Alice", "Bob", "Carol"]);
    to_voting(&mut reg, &mut session, &code);
    for name in ["Alice", "Bob", "Carol"] {
        vote(&mut reg, &code, name, "Bob").unwrap();
    }

    let room = reg.get_room_mut(&code).unwrap();
    session.start_round(room).unwrap();

    assert_eq!(room.phase(), Phase::Discussing);
    assert!(room.votes().is_empty());
    assert_eq!(room.rounds_played(), 2);
}

#[test]
fn test_return_to_lobby_from_every_phase() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let mut session = session(0, 1);
    let code = room_with(&mut reg, &["Alice", "Bob", "Carol"]);

    let check = |reg: &mut RoomRegistry, session: &GameSession| {
        let room = reg.get_room_mut(&code).unwrap();
        session.return_to_lobby(room);
        assert_eq!(room.phase(), Phase::Lobby);
        assert!(room.round().is_none());
        assert!(room.votes().is_empty());
        assert_eq!(room.player_names(), vec!["Alice", "Bob", "Carol"]);
    };

    check(&mut reg, &session);

    session.start_round(reg.get_room_mut(&code).unwrap()).unwrap();
    check(&mut reg, &session);

    to_voting(&mut reg, &mut session, &code);
    vote(&mut reg, &code, "Alice", "Bob").unwrap();
    check(&mut reg, &session);

    to_voting(&mut reg, &mut session, &code);
    for name in ["Alice", "Bob", "Carol"] {
        vote(&mut reg, &code, name, "Bob").unwrap();
    }
    check(&mut reg, &session);
}

#[test]
fn test_round_trip_deals_a_fresh_round() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    // Round 1: Cat/Dog with Alice as imposter. Round 2: Coffee/Tea with Carol.
    let mut session = GameSession::new(
        &GameConfig::default(),
        catalog(),
        Box::new(ScriptedRandom::new([0, 0, 1, 2])),
    );
    let code = room_with(&mut reg, &["Alice", "Bob", "Carol"]);

    to_voting(&mut reg, &mut session, &code);
    for name in ["Alice", "Bob", "Carol"] {
        vote(&mut reg, &code, name, "Alice").unwrap();
    }
    session.return_to_lobby(reg.get_room_mut(&code).unwrap());

    let room = reg.get_room_mut(&code).unwrap();
    let deal = session.start_round(room).unwrap();

    let round = room.round().unwrap();
    assert_eq!(round.imposter().name, "Carol");
    assert_eq!(round.pair().regular, "Coffee");
    assert!(room.votes().is_empty());
    assert!(deal.iter().all(|a| a.word == "Coffee" || a.word == "Tea"));
    assert!(deal[2].is_imposter && !deal[0].is_imposter);
}

// =========================================================================
// VoteTally
// =========================================================================

#[test]
fn test_three_way_tie_does_not_catch_imposter() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let mut session = session(0, 1); // Bob is the imposter
    let code = room_with(&mut reg, &["Alice", "Bob", "Carol"]);
    to_voting(&mut reg, &mut session, &code);

    assert_eq!(vote(&mut reg, &code, "Alice", "Carol").unwrap(), None);
    assert_eq!(vote(&mut reg, &code, "Bob", "Alice").unwrap(), None);
    let result = vote(&mut reg, &code, "Carol", "Bob").unwrap().unwrap();

    assert_eq!(result.votes_for("Carol"), 1);
    assert_eq!(result.votes_for("Alice"), 1);
    assert_eq!(result.votes_for("Bob"), 1);
    assert_eq!(result.imposter_name, "Bob");
    assert_eq!(result.regular_word, "Cat");
    assert_eq!(result.imposter_word, "Dog");
    assert!(!result.imposter_caught());
    assert_eq!(reg.get_room(&code).unwrap().phase(), Phase::Revealed);
}

#[test]
fn test_unique_maximum_catches_imposter() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let mut session = session(1, 2); // Carol is the imposter
    let code = room_with(&mut reg, &["Alice", "Bob", "Carol", "Dave"]);
    to_voting(&mut reg, &mut session, &code);

    for voter in ["Alice", "Bob", "Dave"] {
        assert_eq!(vote(&mut reg, &code, voter, "Carol").unwrap(), None);
    }
    let result = vote(&mut reg, &code, "Carol", "Alice").unwrap().unwrap();

    assert_eq!(result.counts_by_name.len(), 2);
    assert_eq!(result.votes_for("Carol"), 3);
    assert_eq!(result.votes_for("Alice"), 1);
    assert_eq!(result.imposter_word, "Tea");
    assert!(result.imposter_caught());
}

#[test]
fn test_revote_overwrites_previous_vote() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let mut session = session(0, 0);
    let code = room_with(&mut reg, &["Alice", "Bob", "Carol"]);
    to_voting(&mut reg, &mut session, &code);

    vote(&mut reg, &code, "Alice", "Bob").unwrap();
    vote(&mut reg, &code, "Alice", "Carol").unwrap();
    assert_eq!(reg.get_room(&code).unwrap().votes().len(), 1);
    vote(&mut reg, &code, "Bob", "Alice").unwrap();
    let result = vote(&mut reg, &code, "Carol", "Alice").unwrap().unwrap();

    assert_eq!(result.votes_for("Carol"), 1);
    assert_eq!(result.votes_for("Bob"), 0);
    assert_eq!(result.votes_for("Alice"), 2);
}

#[test]
fn test_vote_outside_voting_is_phase_violation() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let mut session = session(0, 0);
    let code = room_with(&mut reg, &["Alice", "Bob", "Carol"]);

    let err = vote(&mut reg, &code, "Alice", "Bob").unwrap_err();
    assert!(matches!(err, GameError::PhaseViolation { phase: Phase::Lobby, .. }));

    session.start_round(reg.get_room_mut(&code).unwrap()).unwrap();
    let err = vote(&mut reg, &code, "Alice", "Bob").unwrap_err();
    assert!(matches!(err, GameError::PhaseViolation { phase: Phase::Discussing, .. }));
    assert!(reg.get_room(&code).unwrap().votes().is_empty());
}

#[test]
fn test_vote_by_or_for_non_member_is_rejected_without_recording() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let mut session = session(0, 0);
    let code = room_with(&mut reg, &["Alice", "Bob", "Carol"]);
    to_voting(&mut reg, &mut session, &code);

    assert_eq!(
        vote(&mut reg, &code, "Mallory", "Bob").unwrap_err(),
        GameError::UnknownVoter("Mallory".into())
    );
    assert_eq!(
        vote(&mut reg, &code, "Alice", "Zed").unwrap_err(),
        GameError::UnknownTarget("Zed".into())
    );
    assert!(reg.get_room(&code).unwrap().votes().is_empty());
}

#[test]
fn test_tally_is_independent_of_vote_order() {
    let ballots = [
        ("Alice", "Bob"),
        ("Bob", "Carol"),
        ("Carol", "Bob"),
        ("Dave", "Alice"),
    ];
    let mut results = Vec::new();
    for order in [[0, 1, 2, 3], [3, 2, 1, 0], [2, 0, 3, 1]] {
        let mut reg = registry(EmptyRoomPolicy::Delete);
        let mut session = session(0, 1);
        let code = room_with(&mut reg, &["Alice", "Bob", "Carol", "Dave"]);
        to_voting(&mut reg, &mut session, &code);

        let mut last = None;
        for i in order {
            let (voter, target) = ballots[i];
            last = vote(&mut reg, &code, voter, target).unwrap();
        }
        results.push(last.expect("final ballot completes the tally"));
    }
    assert_eq!(results[0], results[1]);
    assert_eq!(results[1], results[2]);
    assert!(results[0].imposter_caught());
}

#[test]
fn test_departed_voter_ballot_still_counts() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let mut session = session(0, 0);
    let code = room_with(&mut reg, &["Alice", "Bob", "Carol"]);
    to_voting(&mut reg, &mut session, &code);

    vote(&mut reg, &code, "Carol", "Alice").unwrap();
    reg.remove_player(PlayerId(3));
    assert_eq!(
        VoteTally::finalize_if_complete(reg.get_room_mut(&code).unwrap()).unwrap(),
        None
    );
    assert_eq!(
        vote(&mut reg, &code, "Carol", "Bob").unwrap_err(),
        GameError::UnknownVoter("Carol".into())
    );

    vote(&mut reg, &code, "Alice", "Bob").unwrap();
    let result = vote(&mut reg, &code, "Bob", "Alice").unwrap().unwrap();

    assert_eq!(result.votes_for("Alice"), 2);
    assert_eq!(result.votes_for("Bob"), 1);
    assert!(result.imposter_caught());
}

#[test]
fn test_holdout_leaving_completes_the_vote() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let mut session = session(0, 1);
    let code = room_with(&mut reg, &["Alice", "Bob", "Carol"]);
    to_voting(&mut reg, &mut session, &code);

    vote(&mut reg, &code, "Alice", "Bob").unwrap();
    vote(&mut reg, &code, "Bob", "Alice").unwrap();
    reg.remove_player(PlayerId(3));

    let result = VoteTally::finalize_if_complete(reg.get_room_mut(&code).unwrap())
        .unwrap()
        .expect("remaining players have all voted");

    assert_eq!(result.imposter_name, "Bob");
    assert!(!result.imposter_caught());
    assert_eq!(reg.get_room(&code).unwrap().phase(), Phase::Revealed);
}

#[test]
fn test_revealed_is_terminal_for_voting() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let mut session = session(0, 0);
    let code = room_with(&mut reg, &["Alice", "Bob", "Carol"]);
    to_voting(&mut reg, &mut session, &code);
    for name in ["Alice", "Bob", "Carol"] {
        vote(&mut reg, &code, name, "Alice").unwrap();
    }

    let err = vote(&mut reg, &code, "Alice", "Bob").unwrap_err();

    assert!(matches!(err, GameError::PhaseViolation { phase: Phase::Revealed, .. }));
    assert_eq!(reg.get_room(&code).unwrap().votes().len(), 3);
}

#[test]
fn test_one_ballot_per_name_cannot_cover_two_players() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let mut session = session(0, 2);
    let code = room_with(&mut reg, &["Sam", "Ann", "Bea"]);
    assert!(reg.join_room(&code, player(4, "Sam")).is_err());
    to_voting(&mut reg, &mut session, &code);

    assert_eq!(vote(&mut reg, &code, "Sam", "Bea").unwrap(), None);
    assert_eq!(vote(&mut reg, &code, "Ann", "Bea").unwrap(), None);
    assert!(!VoteTally::is_complete(reg.get_room(&code).unwrap()));

    let result = vote(&mut reg, &code, "Bea", "Sam").unwrap().unwrap();
    assert_eq!(result.votes_for("Bea"), 2);
    assert!(result.imposter_caught());
}

#[test]
fn test_vote_set_never_outgrows_the_roster() {
    let mut reg = registry(EmptyRoomPolicy::Delete);
    let mut session = session(0, 3);
    let code = room_with(&mut reg, &["Ann", "Ben", "Cid", "Dee"]);
    to_voting(&mut reg, &mut session, &code);
    let within_roster = |reg: &RoomRegistry| {
        let room = reg.get_room(&code).unwrap();
        room.votes().len() <= room.len()
    };

    vote(&mut reg, &code, "Ann", "Dee").unwrap();
    vote(&mut reg, &code, "Ben", "Dee").unwrap();
    reg.remove_player(PlayerId(1));
    assert!(within_roster(&reg));
    reg.remove_player(PlayerId(2));
    assert!(within_roster(&reg));

    assert_eq!(vote(&mut reg, &code, "Cid", "Dee").unwrap(), None);
    assert!(within_roster(&reg));

    let result = vote(&mut reg, &code, "Dee", "Cid").unwrap().unwrap();
    assert!(within_roster(&reg));
    assert_eq!(result.votes_for("Dee"), 1);
    assert_eq!(result.votes_for("Cid"), 1);
    assert!(!result.imposter_caught());
}
