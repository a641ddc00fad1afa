//! Integration tests for the round state machine.
//!
//! These drive full rounds through every guess path: word and team
//! guesses, correct and incorrect, with and without the veto phase, and
//! vetoes from the guesser, a teammate, and an opponent.

use rand::SeedableRng;
use rand::rngs::StdRng;

use shibboleth_core::{PlayerId, WordList};
use shibboleth_game::{ActionError, GameSetup, Phase, Shibboleth};

// =========================================================================
// Helpers
// =========================================================================

fn corpus() -> WordList {
    WordList::from_words((0..16).map(|i| format!("w{i}")))
}

fn players(n: u64) -> Vec<PlayerId> {
    (0..n).map(PlayerId).collect()
}

fn new_game(n: u64, setup: GameSetup, seed: u64) -> Shibboleth {
    Shibboleth::new(players(n), &corpus(), setup, &mut StdRng::seed_from_u64(seed)).unwrap()
}

/// The guesser's own team, in roster order.
fn own_team(game: &Shibboleth, guesser: PlayerId) -> Vec<PlayerId> {
    let word = game.secret_word(guesser).unwrap().to_owned();
    game.players_with_word(&word).unwrap()
}

/// A same-size team guess that is wrong: swap one teammate for an
/// opponent.
fn wrong_team(game: &Shibboleth, guesser: PlayerId) -> Vec<PlayerId> {
    let mut team = own_team(game, guesser);
    let outsider = game
        .players()
        .iter()
        .copied()
        .find(|p| !team.contains(p))
        .expect("both teams are non-empty");
    let swap_out = team
        .iter()
        .position(|p| *p != guesser)
        .expect("team has more than one member");
    team[swap_out] = outsider;
    team
}

fn own_word(game: &Shibboleth, guesser: PlayerId) -> String {
    game.secret_word(guesser).unwrap().to_owned()
}

fn opposing(game: &Shibboleth, guesser: PlayerId) -> String {
    let word = own_word(game, guesser);
    game.opposing_word(&word).unwrap().to_owned()
}

/// A pool word that is neither secret word.
fn decoy(game: &Shibboleth) -> String {
    let [a, b] = game.secret_words();
    let (a, b) = (a.to_owned(), b.to_owned());
    game.word_pool()
        .iter()
        .find(|w| **w != a && **w != b)
        .unwrap()
        .clone()
}

/// A teammate of the guesser, and an opponent.
fn teammate_and_opponent(game: &Shibboleth, guesser: PlayerId) -> (PlayerId, PlayerId) {
    let team = own_team(game, guesser);
    let teammate = team.iter().copied().find(|p| *p != guesser).unwrap();
    let opponent = game
        .players()
        .iter()
        .copied()
        .find(|p| !team.contains(p))
        .unwrap();
    (teammate, opponent)
}

fn assert_over(game: &Shibboleth, winning: &str, had_veto: bool) {
    assert_eq!(game.phase(), Phase::Over);
    assert!(!game.game_ongoing());
    assert_eq!(game.winning_word(), Some(winning));
    // The pending guess is intentionally kept for post-hoc display.
    assert_eq!(game.in_veto_phase(), had_veto);
    let [winners, losers] = game.winners_and_losers().unwrap();
    assert_eq!(winners, game.players_with_word(winning).unwrap());
    let losing = game.opposing_word(winning).unwrap().to_owned();
    assert_eq!(losers, game.players_with_word(&losing).unwrap());
}

// =========================================================================
// Word guesses end the game immediately
// =========================================================================

#[test]
fn test_correct_word_guess_wins() {
    for veto in [false, true] {
        let mut g = new_game(6, GameSetup::new(10).veto_phase(veto), 1);
        let p = g.players()[0];
        let guess = opposing(&g, p);
        assert!(g.resolve_word_guess(p, &guess).unwrap());
        let winning = own_word(&g, p);
        assert_over(&g, &winning, false);
    }
}

#[test]
fn test_incorrect_word_guess_loses() {
    for veto in [false, true] {
        let mut g = new_game(6, GameSetup::new(10).veto_phase(veto), 2);
        let p = g.players()[0];
        let guess = decoy(&g);
        assert!(!g.resolve_word_guess(p, &guess).unwrap());
        let winning = opposing(&g, p);
        assert_over(&g, &winning, false);
    }
}

#[test]
fn test_spec_scenario_six_players_no_veto() {
    // 6 players, 10 words, no skew, no cap, no veto: teams are [3, 3]
    // and a correct word guess wins for the guesser's own word.
    let mut g = new_game(6, GameSetup::new(10).veto_phase(false), 3);
    assert_eq!(g.team_sizes(), [3, 3]);
    let p = g.players()[0];
    let winning = own_word(&g, p);
    let guess = opposing(&g, p);
    assert!(g.resolve_word_guess(p, &guess).unwrap());
    assert_eq!(g.winning_word(), Some(winning.as_str()));
    assert_eq!(g.phase(), Phase::Over);
}

// =========================================================================
// Team guesses without a veto phase
// =========================================================================

#[test]
fn test_correct_team_guess_no_veto() {
    let mut g = new_game(6, GameSetup::new(10).veto_phase(false), 4);
    let p = g.players()[0];
    let team = own_team(&g, p);
    assert!(g.resolve_team_guess(p, &team, false).unwrap());
    let winning = own_word(&g, p);
    assert_over(&g, &winning, false);
}

#[test]
fn test_incorrect_team_guess_no_veto() {
    let mut g = new_game(6, GameSetup::new(10).veto_phase(false), 5);
    let p = g.players()[0];
    let team = wrong_team(&g, p);
    assert!(!g.resolve_team_guess(p, &team, false).unwrap());
    let winning = opposing(&g, p);
    assert_over(&g, &winning, false);
}

// =========================================================================
// Team guess validation
// =========================================================================

#[test]
fn test_team_guess_validation_errors() {
    let g = new_game(6, GameSetup::new(10), 6);
    let p = g.players()[0];
    let team = own_team(&g, p);

    // Unknown guesser.
    assert!(matches!(
        g.check_team_guess(PlayerId(99), &team),
        Err(ActionError::UnknownPlayer(_))
    ));

    // Duplicates.
    let mut dup = team.clone();
    dup[1] = dup[0];
    assert!(matches!(
        g.check_team_guess(p, &dup),
        Err(ActionError::DuplicateGuessedPlayers)
    ));

    // Non-players.
    let mut outsiders = team.clone();
    outsiders[1] = PlayerId(99);
    assert!(matches!(
        g.check_team_guess(p, &outsiders),
        Err(ActionError::NonPlayersGuessed(ref x)) if x == &[PlayerId(99)]
    ));

    // Guesser not in their own guess.
    let without_self: Vec<PlayerId> = g
        .players()
        .iter()
        .copied()
        .filter(|q| *q != p)
        .take(3)
        .collect();
    assert!(matches!(
        g.check_team_guess(p, &without_self),
        Err(ActionError::SelfNotIncluded)
    ));

    // Wrong size.
    let short = &team[..2];
    assert!(matches!(
        g.check_team_guess(p, short),
        Err(ActionError::WrongGuessSize { got: 2, .. })
    ));
}

#[test]
fn test_team_guess_order_does_not_matter() {
    let g = new_game(6, GameSetup::new(10), 7);
    let p = g.players()[0];
    let mut team = own_team(&g, p);
    team.reverse();
    assert!(g.check_team_guess(p, &team).unwrap());
}

#[test]
fn test_capped_team_guess_is_subset_match() {
    // 9 players, cap 3: a guess is correct iff it is a 3-subset of the
    // guesser's team containing the guesser.
    let g = new_game(9, GameSetup::new(16).team_guess_size(Some(3)), 8);
    let p = g.players()[0];
    let team = own_team(&g, p);
    assert!(team.len() >= 3);

    let mut subset: Vec<PlayerId> = team.iter().copied().filter(|q| *q != p).take(2).collect();
    subset.push(p);
    assert!(g.check_team_guess(p, &subset).unwrap());

    // Same size, but with one opponent: incorrect, not an error.
    let opponent = g
        .players()
        .iter()
        .copied()
        .find(|q| !team.contains(q))
        .unwrap();
    let mixed = vec![p, subset[0], opponent];
    assert!(!g.check_team_guess(p, &mixed).unwrap());

    // The whole team is the wrong size once a cap is set.
    if team.len() != 3 {
        assert!(matches!(
            g.check_team_guess(p, &team),
            Err(ActionError::WrongGuessSize { .. })
        ));
    }
}

#[test]
fn test_odd_roster_allows_both_sizes() {
    let g = new_game(5, GameSetup::new(10), 9);
    assert_eq!(g.valid_team_guess_sizes(), vec![2, 3]);
}

// =========================================================================
// Veto phase
// =========================================================================

#[test]
fn test_team_guess_enters_veto_phase() {
    let mut g = new_game(6, GameSetup::new(10), 10);
    let p = g.players()[0];
    let team = own_team(&g, p);
    assert!(g.resolve_team_guess(p, &team, false).unwrap());

    assert_eq!(g.phase(), Phase::Veto);
    assert!(g.game_ongoing());
    assert!(g.in_veto_phase());
    let pending = g.vetoable_team_guess().unwrap();
    assert_eq!(pending.guesser, p);
    assert_eq!(pending.team, team);
}

#[test]
fn test_no_second_team_guess_during_veto() {
    let mut g = new_game(6, GameSetup::new(10), 11);
    let p = g.players()[0];
    let team = own_team(&g, p);
    g.resolve_team_guess(p, &team, false).unwrap();

    let (teammate, _) = teammate_and_opponent(&g, p);
    let other = own_team(&g, teammate);
    assert!(matches!(
        g.resolve_team_guess(teammate, &other, false),
        Err(ActionError::VetoPending)
    ));
}

#[test]
fn test_veto_word_guess_overrides_pending_team_guess() {
    // Word guesses during the veto phase end the game on their own
    // terms; the held team guess only matters for display.
    let mut g = new_game(6, GameSetup::new(10), 12);
    let p = g.players()[0];
    let team = own_team(&g, p);
    g.resolve_team_guess(p, &team, false).unwrap();

    let (_, opponent) = teammate_and_opponent(&g, p);
    let guess = opposing(&g, opponent);
    assert!(g.resolve_word_guess(opponent, &guess).unwrap());

    let winning = own_word(&g, opponent);
    assert_over(&g, &winning, true);
    assert!(g.vetoable_team_guess().is_some());

    // The pending guess is still checkable for the post-mortem.
    assert!(g.check_team_guess(p, &team).unwrap());
}

#[test]
fn test_veto_outcomes_by_each_seat() {
    // (guesser index source, correct word?) → winner is decided solely by
    // the overriding word guess, never by the held team guess.
    for (by_opponent, correct) in
        [(false, true), (false, false), (true, true), (true, false)]
    {
        for team_correct in [true, false] {
            let mut g = new_game(6, GameSetup::new(10), 13);
            let p = g.players()[0];
            let team = if team_correct {
                own_team(&g, p)
            } else {
                wrong_team(&g, p)
            };
            g.resolve_team_guess(p, &team, false).unwrap();

            let (teammate, opponent) = teammate_and_opponent(&g, p);
            let vetoer = if by_opponent { opponent } else { teammate };
            let guess = if correct {
                opposing(&g, vetoer)
            } else {
                decoy(&g)
            };
            assert_eq!(g.resolve_word_guess(vetoer, &guess).unwrap(), correct);

            let winning = if correct {
                own_word(&g, vetoer)
            } else {
                opposing(&g, vetoer)
            };
            assert_over(&g, &winning, true);
        }
    }
}

#[test]
fn test_veto_timeout_resolves_original_guess() {
    for team_correct in [true, false] {
        let mut g = new_game(6, GameSetup::new(10), 14);
        let p = g.players()[0];
        let team = if team_correct {
            own_team(&g, p)
        } else {
            wrong_team(&g, p)
        };
        g.resolve_team_guess(p, &team, false).unwrap();

        assert_eq!(g.resolve_veto_timeout().unwrap(), team_correct);
        let winning = if team_correct {
            own_word(&g, p)
        } else {
            opposing(&g, p)
        };
        assert_over(&g, &winning, true);
    }
}

#[test]
fn test_veto_override_guards() {
    // No pending guess: a timeout override fails whether or not the game
    // has a veto phase at all.
    for veto in [true, false] {
        let mut g = new_game(6, GameSetup::new(10).veto_phase(veto), 15);
        let p = g.players()[0];
        let team = own_team(&g, p);
        assert!(matches!(
            g.resolve_team_guess(p, &team, true),
            Err(ActionError::NoVetoPending)
        ));
        assert!(matches!(
            g.resolve_veto_timeout(),
            Err(ActionError::NoVetoPending)
        ));
    }

    // Pending, but the override names a different guess.
    let mut g = new_game(6, GameSetup::new(10), 16);
    let p = g.players()[0];
    let team = own_team(&g, p);
    g.resolve_team_guess(p, &team, false).unwrap();

    let (teammate, _) = teammate_and_opponent(&g, p);
    let other = own_team(&g, teammate);
    assert!(matches!(
        g.resolve_team_guess(teammate, &other, true),
        Err(ActionError::VetoMismatch)
    ));
    // The round is untouched by the failed override.
    assert_eq!(g.phase(), Phase::Veto);
}

// =========================================================================
// Terminal state is absorbing
// =========================================================================

#[test]
fn test_everything_fails_after_game_over() {
    let mut g = new_game(6, GameSetup::new(10).veto_phase(false), 17);
    let p = g.players()[0];
    let team = own_team(&g, p);
    g.resolve_team_guess(p, &team, false).unwrap();
    assert!(!g.game_ongoing());

    let guess = opposing(&g, p);
    assert!(matches!(
        g.resolve_word_guess(p, &guess),
        Err(ActionError::GameOver)
    ));
    assert!(matches!(
        g.resolve_team_guess(p, &team, false),
        Err(ActionError::GameOver)
    ));
    assert!(matches!(
        g.resolve_team_guess(p, &team, true),
        Err(ActionError::GameOver)
    ));
    assert!(matches!(g.resolve_veto_timeout(), Err(ActionError::GameOver)));
}

#[test]
fn test_veto_timeout_after_word_guess_fails() {
    // The race in miniature: the word guess lands first, the timer's
    // resolution must then fail cleanly.
    let mut g = new_game(6, GameSetup::new(10), 18);
    let p = g.players()[0];
    let team = own_team(&g, p);
    g.resolve_team_guess(p, &team, false).unwrap();

    let guess = opposing(&g, p);
    g.resolve_word_guess(p, &guess).unwrap();
    assert!(matches!(g.resolve_veto_timeout(), Err(ActionError::GameOver)));
}

// =========================================================================
// Distribution sanity
// =========================================================================

#[test]
fn test_partition_counts_match_team_sizes_across_seeds() {
    for seed in 0..50 {
        let g = new_game(7, GameSetup::new(14), seed);
        let [a, b] = g.secret_words();
        let (a, b) = (a.to_owned(), b.to_owned());
        let [sa, sb] = g.team_sizes();
        assert_eq!(g.players_with_word(&a).unwrap().len(), sa);
        assert_eq!(g.players_with_word(&b).unwrap().len(), sb);
        assert_ne!(a, b);
    }
}
