//! Per-recipient views of the game.
//!
//! A [`View`] holds only what its recipient is allowed to know:
//!
//! | field                          | visible to                         |
//! |--------------------------------|------------------------------------|
//! | phase, players, announcements  | everyone                           |
//! | lobby composition and status   | everyone                           |
//! | day votes                      | everyone                           |
//! | player roles                   | self; everyone once finished       |
//! | own night action, targets      | the acting player                  |
//! | investigations                 | the seer who made them             |
//! | pack                           | alive pack members, in game        |
//! | kill votes and tally           | alive pack members, at night       |
//! | history                        | filtered by each entry's policy    |

use crate::config::GameConfig;
use crate::day::{Ballot, EndVoteAction, valid_day_targets};
use crate::engine::RuleEnv;
use crate::history::{Announcement, HistoryEntry};
use crate::lobby::LobbyStatus;
use crate::night::{NightAction, NightActionKind, valid_night_targets};
use crate::phase::{Phase, PhaseKind, Winner};
use crate::roles::{Faction, RoleCatalog, RoleId};
use crate::state::{GameState, Investigation, PlayerId};

/// Who a view is built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Recipient {
    /// A connection that has not signed up or logged in.
    Anonymous,
    Player(PlayerId),
}

impl Recipient {
    pub fn player_id(self) -> Option<PlayerId> {
        match self {
            Recipient::Anonymous => None,
            Recipient::Player(id) => Some(id),
        }
    }
}

impl From<Option<PlayerId>> for Recipient {
    fn from(player: Option<PlayerId>) -> Self {
        player.map_or(Recipient::Anonymous, Recipient::Player)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct View {
    pub phase: PhaseView,
    pub me: Option<SelfView>,
    pub players: Vec<PlayerView>,
    pub lobby: LobbyView,
    pub announcements: Vec<AnnouncementView>,
    pub prompt: Prompt,
    pub prompt_text: String,
    /// Present only for alive pack members.
    pub pack: Option<PackView>,
    pub night_action: Option<NightAction>,
    pub investigations: Vec<Investigation>,
    pub valid_targets: Vec<PlayerId>,
    pub day_votes: Vec<DayVoteView>,
    pub can_end_vote: bool,
    pub history: Vec<HistoryEntry>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseView {
    pub kind: PhaseKind,
    pub round: u32,
    pub winner: Option<Winner>,
    /// The hunter owing a shot during a revenge interrupt.
    pub hunter: Option<PlayerId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelfView {
    pub player_id: PlayerId,
    pub name: String,
    pub role: Option<RoleId>,
    pub faction: Option<Faction>,
    pub alive: Option<bool>,
    pub is_host: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerView {
    pub player_id: PlayerId,
    pub name: String,
    pub connected: bool,
    /// `None` for players without a seat in the current game.
    pub alive: Option<bool>,
    pub role: Option<RoleId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LobbyView {
    pub composition: Vec<RoleCount>,
    pub total: usize,
    pub status: String,
    pub startable: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoleCount {
    pub role: RoleId,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnouncementView {
    pub event: Announcement,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackView {
    pub members: Vec<PlayerId>,
    /// Night only; empty in every other phase.
    pub votes: Vec<PackVote>,
    pub tally: Vec<KillTally>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackVote {
    pub voter: PlayerId,
    pub target: Option<PlayerId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KillTally {
    /// `None` counts "no kill" votes.
    pub target: Option<PlayerId>,
    pub votes: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DayVoteView {
    pub voter: PlayerId,
    pub ballot: Ballot,
}

/// What the recipient is expected to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "prompt", rename_all = "snake_case"))]
pub enum Prompt {
    SignUp,
    Lobby,
    /// Registered after the game started; waits for the next lobby.
    Spectating,
    NightAction { action: NightActionKind },
    NightWait,
    DayVote,
    DayWait,
    HunterShoot,
    HunterChoosing { hunter: PlayerId },
    Dead,
    GameOver { winner: Winner },
}

impl Prompt {
    pub fn message(&self) -> &'static str {
        match self {
            Prompt::SignUp => "Sign up or log in to join",
            Prompt::Lobby => "Waiting in the lobby",
            Prompt::Spectating => "A game is in progress",
            Prompt::NightAction { action } => match action {
                NightActionKind::KillVote => "Choose who the pack attacks",
                NightActionKind::Investigate => "Choose someone to investigate",
                NightActionKind::DoctorProtect | NightActionKind::GuardProtect => {
                    "Choose someone to protect"
                }
            },
            Prompt::NightWait => "Waiting for the night to end",
            Prompt::DayVote => "Vote for someone to eliminate, or pass",
            Prompt::DayWait => "Waiting for the vote to close",
            Prompt::HunterShoot => "Choose who you take down with you",
            Prompt::HunterChoosing { .. } => "Hunter is choosing",
            Prompt::Dead => "You are dead and cannot vote",
            Prompt::GameOver { winner } => match winner {
                Winner::Villagers => "The villagers win",
                Winner::Werewolves => "The werewolves win",
            },
        }
    }
}

/// Builds the view `recipient` is entitled to.
pub fn project(
    state: &GameState,
    catalog: &RoleCatalog,
    config: &GameConfig,
    recipient: Recipient,
) -> View {
    let me = recipient.player_id().filter(|id| state.player(*id).is_some());
    let finished = matches!(state.phase, Phase::Finished { .. });
    let my_seat = me.and_then(|id| state.seat(id));
    let alive_me = my_seat.is_some_and(|seat| seat.alive);

    let players = state
        .roster
        .values()
        .map(|record| {
            let seat = state.seat(record.id);
            PlayerView {
                player_id: record.id,
                name: record.name.clone(),
                connected: record.connected,
                alive: seat.map(|seat| seat.alive),
                role: seat
                    .filter(|_| finished || me == Some(record.id))
                    .map(|seat| seat.role),
            }
        })
        .collect();

    let status = LobbyStatus::evaluate(state, catalog, config);
    let lobby = LobbyView {
        composition: state
            .composition
            .iter()
            .map(|(role, count)| RoleCount { role, count })
            .collect(),
        total: state.composition.total(),
        status: status.message(),
        startable: status.is_ready(),
    };

    let announcements = state
        .announcements
        .iter()
        .map(|event| AnnouncementView {
            event: *event,
            message: event.message(|id| state.name_of(id)),
        })
        .collect();

    let self_view = me.and_then(|id| state.player(id)).map(|record| SelfView {
        player_id: record.id,
        name: record.name.clone(),
        role: my_seat.map(|seat| seat.role),
        faction: my_seat.map(|seat| catalog.faction_of(seat.role)),
        alive: my_seat.map(|seat| seat.alive),
        is_host: state.host() == Some(record.id),
    });

    let in_night = matches!(state.phase, Phase::Night { .. });
    let pack_members = state.pack(catalog);
    let pack = me
        .filter(|id| state.phase.in_game() && pack_members.contains(id))
        .map(|_| {
            let (votes, tally) = if in_night {
                (
                    state
                        .night
                        .kill_votes(state, catalog)
                        .map(|(voter, target)| PackVote { voter, target })
                        .collect(),
                    state
                        .night
                        .kill_tally(state, catalog)
                        .into_iter()
                        .map(|(target, votes)| KillTally { target, votes })
                        .collect(),
                )
            } else {
                (Vec::new(), Vec::new())
            };
            PackView {
                members: pack_members.clone(),
                votes,
                tally,
            }
        });

    let night_action = me
        .filter(|_| in_night && alive_me)
        .and_then(|id| state.night.get(id).copied());

    let investigations = my_seat
        .map(|seat| {
            let mut results = seat.investigations.clone();
            // Tonight's result is shown as soon as the seer submits.
            if let Some(action) = night_action
                && action.kind == NightActionKind::Investigate
                && let Some(target) = action.target
            {
                results.push(Investigation {
                    round: state.phase.round(),
                    target,
                    faction: state
                        .seat(target)
                        .map(|seat| catalog.faction_of(seat.role))
                        .unwrap_or(Faction::Village),
                });
            }
            results
        })
        .unwrap_or_default();

    let valid_targets = match (me, state.phase) {
        (Some(id), Phase::Night { .. }) => valid_night_targets(state, catalog, id),
        (Some(id), Phase::Day { .. }) => valid_day_targets(state, id),
        (Some(id), Phase::HunterRevenge { hunter, .. }) if hunter == id => {
            state.alive_players().collect()
        }
        _ => Vec::new(),
    };

    let in_day = matches!(state.phase, Phase::Day { .. });
    let day_votes = if in_day {
        state
            .day
            .iter()
            .map(|(voter, ballot)| DayVoteView { voter, ballot })
            .collect()
    } else {
        Vec::new()
    };
    let env = RuleEnv::new(catalog, config);
    let can_end_vote =
        in_day && alive_me && me.is_some_and(|id| EndVoteAction::permitted(state, &env, id));

    let prompt = prompt_for(state, catalog, me);
    let history = state
        .history
        .visible_to(me, state, catalog)
        .copied()
        .collect();

    View {
        phase: PhaseView {
            kind: state.phase.kind(),
            round: state.phase.round(),
            winner: state.phase.winner(),
            hunter: match state.phase {
                Phase::HunterRevenge { hunter, .. } => Some(hunter),
                _ => None,
            },
        },
        me: self_view,
        players,
        lobby,
        announcements,
        prompt_text: prompt.message().to_string(),
        prompt,
        pack,
        night_action,
        investigations,
        valid_targets,
        day_votes,
        can_end_vote,
        history,
    }
}

fn prompt_for(state: &GameState, catalog: &RoleCatalog, me: Option<PlayerId>) -> Prompt {
    let Some(id) = me else {
        return Prompt::SignUp;
    };
    match state.phase {
        Phase::Lobby => Prompt::Lobby,
        Phase::Finished { winner, .. } => Prompt::GameOver { winner },
        Phase::HunterRevenge { hunter, .. } if hunter == id => Prompt::HunterShoot,
        Phase::HunterRevenge { hunter, .. } => Prompt::HunterChoosing { hunter },
        Phase::Night { .. } | Phase::Day { .. } => {
            let Some(seat) = state.seat(id) else {
                return Prompt::Spectating;
            };
            if !seat.alive {
                return Prompt::Dead;
            }
            if let Phase::Day { .. } = state.phase {
                return match state.day.get(id) {
                    Some(_) => Prompt::DayWait,
                    None => Prompt::DayVote,
                };
            }
            match NightActionKind::for_capability(catalog.capability_of(seat.role)) {
                Some(action) if !state.night.has_acted(id) => Prompt::NightAction { action },
                _ => Prompt::NightWait,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::night::NightActions;
    use crate::state::{PlayerRecord, SecretToken, Seat};

    fn night_table(roles: &[RoleId]) -> GameState {
        let mut state = GameState::new();
        for (index, role) in roles.iter().enumerate() {
            let id = state.allocate_player_id();
            state.roster.insert(
                id,
                PlayerRecord::new(id, format!("p{index}"), SecretToken::from_string("t")),
            );
            state.seats.insert(id, Seat::new(*role));
        }
        state.phase = Phase::Night { round: 1 };
        state.night = NightActions::new(1);
        state
    }

    #[test]
    fn roles_are_private_until_finished() {
        let catalog = RoleCatalog::standard();
        let config = GameConfig::default();
        let mut state = night_table(&[RoleId::Werewolf, RoleId::Villager]);

        let view = project(&state, &catalog, &config, Recipient::Player(PlayerId(1)));
        let roles: Vec<_> = view.players.iter().map(|p| p.role).collect();
        assert_eq!(roles, vec![None, Some(RoleId::Villager)]);
        assert!(view.pack.is_none());

        state.phase = Phase::Finished {
            winner: Winner::Villagers,
            round: 1,
        };
        let view = project(&state, &catalog, &config, Recipient::Anonymous);
        assert!(view.players.iter().all(|p| p.role.is_some()));
    }

    #[test]
    fn pack_is_shown_to_alive_wolves_only() {
        let catalog = RoleCatalog::standard();
        let config = GameConfig::default();
        let state = night_table(&[RoleId::Werewolf, RoleId::Werewolf, RoleId::Seer]);

        let wolf = project(&state, &catalog, &config, Recipient::Player(PlayerId(0)));
        assert_eq!(wolf.pack.map(|p| p.members.len()), Some(2));

        let seer = project(&state, &catalog, &config, Recipient::Player(PlayerId(2)));
        assert!(seer.pack.is_none());
        assert_eq!(
            seer.prompt,
            Prompt::NightAction {
                action: NightActionKind::Investigate
            }
        );
    }

    #[test]
    fn pack_outlives_the_night_without_the_tally() {
        let catalog = RoleCatalog::standard();
        let config = GameConfig::default();
        let mut state = night_table(&[RoleId::Werewolf, RoleId::Werewolf, RoleId::Villager]);
        state.seat_mut(PlayerId(2)).map(|seat| seat.alive = false);
        state.phase = Phase::Day { round: 1 };

        let pack = project(&state, &catalog, &config, Recipient::Player(PlayerId(1)))
            .pack
            .expect("alive wolf keeps the pack by day");
        assert_eq!(pack.members, vec![PlayerId(0), PlayerId(1)]);
        assert!(pack.votes.is_empty());
        assert!(pack.tally.is_empty());

        state.phase = Phase::Lobby;
        let view = project(&state, &catalog, &config, Recipient::Player(PlayerId(1)));
        assert!(view.pack.is_none());
    }

    #[test]
    fn anonymous_sees_signup_prompt() {
        let state = GameState::new();
        let view = project(
            &state,
            &RoleCatalog::standard(),
            &GameConfig::default(),
            Recipient::Anonymous,
        );
        assert_eq!(view.prompt, Prompt::SignUp);
        assert_eq!(view.lobby.status, "Need at least 2 players");
        assert!(view.me.is_none());
    }
}
