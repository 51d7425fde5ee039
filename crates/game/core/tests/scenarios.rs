mod common;

use common::Table;
use game_core::{
    Announcement, Command, CommandError, DisconnectPolicy, GameConfig, NightActionKind,
    NoEliminationReason, Phase, PhaseKind, Prompt, RevengeSource, RoleId, TargetError, Winner,
};

// ============================================================================
// Lobby
// ============================================================================

#[test]
fn lobby_changes_are_visible_to_everyone() {
    let mut table = Table::new(1);
    let alice = table.signup("Alice");
    let bob = table.signup("Bob");

    table.set_role(alice, RoleId::Werewolf, 1);
    table.set_role(alice, RoleId::Villager, 1);

    let view = table.view(bob);
    let counts: Vec<_> = view
        .lobby
        .composition
        .iter()
        .map(|entry| (entry.role, entry.count))
        .collect();
    assert!(counts.contains(&(RoleId::Villager, 1)));
    assert!(counts.contains(&(RoleId::Werewolf, 1)));
    assert_eq!(view.lobby.status, "Ready to start");
    assert!(view.lobby.startable);
}

#[test]
fn start_requires_a_valid_composition() {
    let mut table = Table::new(2);
    let alice = table.signup("Alice");
    table.signup("Bob");
    table.set_role(alice, RoleId::Villager, 2);

    let error = table.exec(Some(alice), Command::StartGame).unwrap_err();
    assert_eq!(
        error,
        CommandError::NotStartable {
            reason: "Need at least one werewolf".into()
        }
    );
    assert_eq!(table.state.phase, Phase::Lobby);
}

#[test]
fn signup_is_closed_while_a_game_runs() {
    let mut table = Table::new(3);
    table.start(&[(RoleId::Werewolf, 1), (RoleId::Villager, 1)]);

    let error = table
        .exec(None, Command::Signup { name: "Late".into() })
        .unwrap_err();
    assert_eq!(error, CommandError::NotInLobby);
}

#[test]
fn login_with_wrong_token_is_rejected() {
    let mut table = Table::new(4);
    table.signup("Alice");
    let error = table
        .exec(
            None,
            Command::Login {
                name: "alice".into(),
                secret_token: "00".into(),
            },
        )
        .unwrap_err();
    assert_eq!(error, CommandError::BadCredentials);
}

// ============================================================================
// Night
// ============================================================================

#[test]
fn majority_kill_moves_to_day() {
    let mut table = Table::new(10);
    table.start(&[(RoleId::Villager, 2), (RoleId::Werewolf, 2)]);
    let wolves = table.with_role(RoleId::Werewolf);
    let villagers = table.with_role(RoleId::Villager);

    for wolf in &wolves {
        table.act(
            *wolf,
            Command::WolfVote {
                target: Some(villagers[0]),
            },
        );
    }

    assert_eq!(table.state.phase, Phase::Day { round: 1 });
    assert!(!table.state.is_alive(villagers[0]));
    let view = table.view(villagers[1]);
    assert_eq!(
        view.announcements[0].event,
        Announcement::NightDeath {
            victim: villagers[0]
        }
    );
    assert!(view.announcements[0].message.contains("player"));
}

#[test]
fn doctor_saves_the_target() {
    let mut table = Table::new(11);
    table.start(&[
        (RoleId::Villager, 1),
        (RoleId::Werewolf, 1),
        (RoleId::Doctor, 1),
    ]);
    let villager = table.one(RoleId::Villager);
    let doctor = table.one(RoleId::Doctor);
    let wolf = table.one(RoleId::Werewolf);

    table.act(doctor, Command::DoctorProtect { target: villager });
    table.act(
        wolf,
        Command::WolfVote {
            target: Some(villager),
        },
    );

    assert_eq!(table.state.phase, Phase::Day { round: 1 });
    assert_eq!(table.state.announcements, vec![Announcement::QuietNight]);
    assert_eq!(table.state.alive_count(), 3);
    assert_eq!(
        table.view(villager).announcements[0].message,
        "No one died last night"
    );
}

#[test]
fn guard_cannot_protect_the_same_player_twice_in_a_row() {
    let mut table = Table::new(12);
    table.start(&[
        (RoleId::Guard, 1),
        (RoleId::Werewolf, 1),
        (RoleId::Villager, 2),
    ]);
    let guard = table.one(RoleId::Guard);
    let wolf = table.one(RoleId::Werewolf);
    let protected = table.with_role(RoleId::Villager)[0];

    // Night 1: guard protects P, the pack holds back.
    table.act(guard, Command::GuardProtect { target: protected });
    table.act(wolf, Command::WolfVote { target: None });
    assert_eq!(table.state.phase, Phase::Day { round: 1 });

    // Day 1: nobody is eliminated.
    let alive: Vec<_> = table.state.alive_players().collect();
    for player in &alive {
        table.act(*player, Command::DayPass);
    }
    table.act(alive[0], Command::EndVote);
    assert_eq!(table.state.phase, Phase::Night { round: 2 });
    assert_eq!(
        table.state.announcements,
        vec![Announcement::NoElimination {
            reason: NoEliminationReason::Passes
        }]
    );

    // Night 2: P is not offered and cannot be chosen.
    let view = table.view(guard);
    assert!(!view.valid_targets.contains(&protected));
    assert!(!view.valid_targets.contains(&guard));
    let error = table
        .exec(Some(guard), Command::GuardProtect { target: protected })
        .unwrap_err();
    assert_eq!(
        error,
        CommandError::InvalidTarget {
            target: protected,
            reason: TargetError::RepeatTarget
        }
    );
}

#[test]
fn split_pack_keeps_the_night_open() {
    let mut table = Table::new(13);
    table.start(&[(RoleId::Werewolf, 2), (RoleId::Villager, 2)]);
    let wolves = table.with_role(RoleId::Werewolf);
    let villagers = table.with_role(RoleId::Villager);

    table.act(
        wolves[0],
        Command::WolfVote {
            target: Some(villagers[0]),
        },
    );
    table.act(
        wolves[1],
        Command::WolfVote {
            target: Some(villagers[1]),
        },
    );

    assert_eq!(table.state.phase, Phase::Night { round: 1 });
    assert_eq!(table.state.alive_count(), 4);
    let pack = table.view(wolves[0]).pack.expect("wolves see the pack");
    assert_eq!(pack.tally.len(), 2);
    assert!(pack.tally.iter().all(|entry| entry.votes == 1));

    // Converging resolves the night.
    table.act(
        wolves[1],
        Command::WolfVote {
            target: Some(villagers[0]),
        },
    );
    assert_eq!(table.state.phase, Phase::Day { round: 1 });
}

#[test]
fn wolves_cannot_attack_the_pack() {
    let mut table = Table::new(14);
    table.start(&[(RoleId::Werewolf, 2), (RoleId::Villager, 3)]);
    let wolves = table.with_role(RoleId::Werewolf);

    let error = table
        .exec(
            Some(wolves[0]),
            Command::WolfVote {
                target: Some(wolves[1]),
            },
        )
        .unwrap_err();
    assert_eq!(
        error,
        CommandError::InvalidTarget {
            target: wolves[1],
            reason: TargetError::SameFaction
        }
    );
}

#[test]
fn seer_result_is_private_and_final() {
    let mut table = Table::new(15);
    table.start(&[
        (RoleId::Seer, 1),
        (RoleId::Werewolf, 1),
        (RoleId::Villager, 2),
    ]);
    let seer = table.one(RoleId::Seer);
    let wolf = table.one(RoleId::Werewolf);
    let villagers = table.with_role(RoleId::Villager);

    table.act(seer, Command::SeerInvestigate { target: wolf });
    let view = table.view(seer);
    assert_eq!(view.investigations.len(), 1);
    assert!(view.investigations[0].is_werewolf());
    assert!(table.view(villagers[0]).investigations.is_empty());

    let error = table
        .exec(
            Some(seer),
            Command::SeerInvestigate {
                target: villagers[0],
            },
        )
        .unwrap_err();
    assert_eq!(error, CommandError::AlreadyActed);

    table.act(wolf, Command::WolfVote { target: None });
    assert_eq!(table.state.phase, Phase::Day { round: 1 });
    assert_eq!(table.view(seer).investigations.len(), 1);
}

#[test]
fn disconnected_actor_blocks_the_night_by_default() {
    let mut table = Table::new(16);
    table.start(&[
        (RoleId::Seer, 1),
        (RoleId::Werewolf, 1),
        (RoleId::Villager, 1),
    ]);
    let seer = table.one(RoleId::Seer);
    let wolf = table.one(RoleId::Werewolf);
    table.set_connected(seer, false);
    table.act(wolf, Command::WolfVote { target: None });
    assert_eq!(table.state.phase, Phase::Night { round: 1 });
}

#[test]
fn skip_policy_resolves_without_disconnected_actors() {
    let config = GameConfig::default().with_disconnect_policy(DisconnectPolicy::SkipDisconnected);
    let mut table = Table::with_config(17, config);
    table.start(&[
        (RoleId::Seer, 1),
        (RoleId::Werewolf, 1),
        (RoleId::Villager, 1),
    ]);
    let seer = table.one(RoleId::Seer);
    let wolf = table.one(RoleId::Werewolf);
    table.act(wolf, Command::WolfVote { target: None });
    assert_eq!(table.state.phase, Phase::Night { round: 1 });

    assert!(table.set_connected(seer, false));
    assert_eq!(table.state.phase, Phase::Day { round: 1 });
}

// ============================================================================
// Day, hunter, and game end
// ============================================================================

#[test]
fn hunter_revenge_wins_for_the_village() {
    let mut table = Table::new(20);
    table.start(&[
        (RoleId::Villager, 1),
        (RoleId::Werewolf, 1),
        (RoleId::Hunter, 1),
    ]);
    let hunter = table.one(RoleId::Hunter);
    let wolf = table.one(RoleId::Werewolf);
    let villager = table.one(RoleId::Villager);

    table.act(
        wolf,
        Command::WolfVote {
            target: Some(hunter),
        },
    );
    assert_eq!(
        table.state.phase,
        Phase::HunterRevenge {
            source: RevengeSource::Night,
            round: 1,
            hunter,
        }
    );
    assert_eq!(table.view(villager).prompt, Prompt::HunterChoosing { hunter });
    assert_eq!(table.view(villager).prompt_text, "Hunter is choosing");
    assert_eq!(table.view(hunter).prompt, Prompt::HunterShoot);

    let error = table
        .exec(Some(villager), Command::HunterShoot { target: wolf })
        .unwrap_err();
    assert_eq!(error, CommandError::NotYourTurn);

    table.act(hunter, Command::HunterShoot { target: wolf });
    assert_eq!(
        table.state.phase,
        Phase::Finished {
            winner: Winner::Villagers,
            round: 1
        }
    );
    // Roles are public once the game is over.
    let view = table.view(villager);
    assert!(view.players.iter().all(|player| player.role.is_some()));
}

#[test]
fn hunter_voted_out_shoots_and_the_night_follows() {
    let mut table = Table::new(25);
    table.start(&[
        (RoleId::Hunter, 1),
        (RoleId::Guard, 1),
        (RoleId::Werewolf, 1),
        (RoleId::Villager, 3),
    ]);
    let hunter = table.one(RoleId::Hunter);
    let guard = table.one(RoleId::Guard);
    let wolf = table.one(RoleId::Werewolf);
    let villagers = table.with_role(RoleId::Villager);

    table.act(
        guard,
        Command::GuardProtect {
            target: villagers[0],
        },
    );
    table.act(wolf, Command::WolfVote { target: None });
    assert_eq!(table.state.phase, Phase::Day { round: 1 });

    let voters: Vec<_> = table
        .state
        .alive_players()
        .filter(|id| *id != hunter)
        .collect();
    for voter in &voters {
        table.act(*voter, Command::DayVote { target: hunter });
    }
    table.act(hunter, Command::DayPass);
    table.act(guard, Command::EndVote);
    assert_eq!(
        table.state.phase,
        Phase::HunterRevenge {
            source: RevengeSource::Day,
            round: 1,
            hunter,
        }
    );
    assert!(!table.state.is_alive(hunter));

    table.act(
        hunter,
        Command::HunterShoot {
            target: villagers[1],
        },
    );
    assert_eq!(table.state.phase, Phase::Night { round: 2 });
    assert!(!table.state.is_alive(villagers[1]));
    assert!(table.state.night.is_empty());
    assert_eq!(table.state.night.round, 2);
    assert!(table.state.day.is_empty());
    assert_eq!(
        table.state.seat(guard).and_then(|seat| seat.previous_target),
        Some(villagers[0])
    );
    assert_eq!(
        table.view(guard).prompt,
        Prompt::NightAction {
            action: NightActionKind::GuardProtect
        }
    );
}

#[test]
fn werewolves_win_on_parity() {
    let mut table = Table::new(21);
    table.start(&[(RoleId::Villager, 2), (RoleId::Werewolf, 2)]);
    let wolves = table.with_role(RoleId::Werewolf);
    let villagers = table.with_role(RoleId::Villager);

    for wolf in &wolves {
        table.act(
            *wolf,
            Command::WolfVote {
                target: Some(villagers[0]),
            },
        );
    }
    assert_eq!(table.state.phase, Phase::Day { round: 1 });

    for wolf in &wolves {
        table.act(
            *wolf,
            Command::DayVote {
                target: villagers[1],
            },
        );
    }
    table.act(villagers[1], Command::DayVote { target: wolves[0] });
    assert!(table.view(villagers[1]).can_end_vote);
    table.act(villagers[1], Command::EndVote);

    assert!(!table.state.is_alive(villagers[1]));
    assert_eq!(
        table.state.phase,
        Phase::Finished {
            winner: Winner::Werewolves,
            round: 1
        }
    );
    assert!(table.state.alive_werewolves(&table.catalog) >= table.state.alive_non_werewolves(&table.catalog));
}

#[test]
fn dead_players_cannot_vote() {
    let mut table = Table::new(22);
    table.start(&[(RoleId::Villager, 3), (RoleId::Werewolf, 1)]);
    let wolf = table.one(RoleId::Werewolf);
    let villagers = table.with_role(RoleId::Villager);
    table.act(
        wolf,
        Command::WolfVote {
            target: Some(villagers[0]),
        },
    );

    let error = table
        .exec(Some(villagers[0]), Command::DayVote { target: wolf })
        .unwrap_err();
    assert_eq!(error, CommandError::DeadCannotAct);
    assert_eq!(table.view(villagers[0]).prompt, Prompt::Dead);
    assert_eq!(
        table.view(villagers[0]).prompt_text,
        "You are dead and cannot vote"
    );
}

#[test]
fn only_the_host_may_end_the_vote_early() {
    let mut table = Table::new(23);
    table.start(&[(RoleId::Villager, 3), (RoleId::Werewolf, 1)]);
    let wolf = table.one(RoleId::Werewolf);
    table.act(wolf, Command::WolfVote { target: None });

    let host = table.state.host().expect("seated host");
    let other = table
        .state
        .alive_players()
        .find(|id| *id != host)
        .expect("second player");

    let error = table.exec(Some(other), Command::EndVote).unwrap_err();
    assert_eq!(error, CommandError::NotYourTurn);

    table.act(host, Command::EndVote);
    assert_eq!(table.state.phase, Phase::Night { round: 2 });
    assert_eq!(
        table.state.announcements,
        vec![Announcement::NoElimination {
            reason: NoEliminationReason::NoMajority
        }]
    );
}

#[test]
fn early_end_vote_passes_to_the_next_living_player() {
    let mut table = (30..)
        .map(|seed| {
            let mut table = Table::new(seed);
            table.start(&[(RoleId::Villager, 4), (RoleId::Werewolf, 1)]);
            table
        })
        .find(|table| {
            table
                .state
                .seat(table.players[0])
                .is_some_and(|seat| seat.role == RoleId::Villager)
        })
        .expect("a deal with a villager in the first seat");
    let first = table.players[0];
    let wolf = table.one(RoleId::Werewolf);

    table.act(wolf, Command::WolfVote { target: Some(first) });
    assert_eq!(table.state.phase, Phase::Day { round: 1 });

    let host = table.state.host().expect("living host");
    assert_ne!(host, first);
    let view = table.view(host);
    assert!(view.can_end_vote);
    assert!(view.me.is_some_and(|me| me.is_host));

    table.act(host, Command::EndVote);
    assert_eq!(table.state.phase, Phase::Night { round: 2 });
}

#[test]
fn play_again_returns_to_the_lobby() {
    let mut table = Table::new(24);
    table.start(&[(RoleId::Villager, 2), (RoleId::Werewolf, 1)]);
    let wolf = table.one(RoleId::Werewolf);
    let villagers = table.with_role(RoleId::Villager);

    table.act(wolf, Command::WolfVote { target: None });
    for villager in &villagers {
        table.act(*villager, Command::DayVote { target: wolf });
    }
    table.act(wolf, Command::DayPass);
    table.act(wolf, Command::EndVote);
    assert_eq!(table.state.phase.kind(), PhaseKind::Finished);
    assert_eq!(table.state.phase.winner(), Some(Winner::Villagers));

    let error = table.exec(Some(wolf), Command::StartGame).unwrap_err();
    assert_eq!(error, CommandError::NotInLobby);

    table.act(villagers[0], Command::PlayAgain);
    assert_eq!(table.state.phase, Phase::Lobby);
    assert_eq!(table.state.composition.total(), 3);
    assert!(table.view(wolf).lobby.startable);
}
