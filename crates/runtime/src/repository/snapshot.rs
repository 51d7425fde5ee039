//! Row layout of a stored lobby.
//!
//! [`StoreSnapshot`] splits [`GameState`] into one row vector per table
//! (`players`, `roles`, `lobby_composition`, `game`, `assignment`,
//! `seer_history`, `night_actions`, `day_votes`, `history_log`) so the
//! persisted shape does not follow every in-memory refactor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use game_core::{
    Announcement, Ballot, DayBallot, Faction, GameState, HistoryEntry, HistoryLog, Investigation,
    NightAction, NightActionKind, NightActions, Phase, PlayerId, PlayerRecord, RoleCatalog,
    RoleComposition, RoleId, RoleSpec, Seat,
};

use super::{RepositoryError, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRow {
    pub revision: u64,
    pub next_player_id: u32,
    pub phase: Phase,
    pub night_round: u32,
    pub day_round: u32,
    pub announcements: Vec<Announcement>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRow {
    pub player_id: PlayerId,
    pub role: RoleId,
    pub alive: bool,
    pub previous_target: Option<PlayerId>,
    pub pending_revenge: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeerRow {
    pub seer: PlayerId,
    pub round: u32,
    pub target: PlayerId,
    pub faction: Faction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightActionRow {
    pub actor: PlayerId,
    pub kind: NightActionKind,
    pub target: Option<PlayerId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayVoteRow {
    pub voter: PlayerId,
    pub ballot: Ballot,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub format: u32,
    pub players: Vec<PlayerRecord>,
    pub roles: Vec<RoleSpec>,
    pub lobby_composition: Vec<(RoleId, u32)>,
    pub game: GameRow,
    pub assignment: Vec<AssignmentRow>,
    pub seer_history: Vec<SeerRow>,
    pub night_actions: Vec<NightActionRow>,
    pub day_votes: Vec<DayVoteRow>,
    pub history_log: Vec<HistoryEntry>,
}

impl StoreSnapshot {
    pub const FORMAT: u32 = 1;

    pub fn capture(state: &GameState, catalog: &RoleCatalog) -> Self {
        let mut seer_history = Vec::new();
        let assignment = state
            .seats
            .iter()
            .map(|(id, seat)| {
                seer_history.extend(seat.investigations.iter().map(|investigation| SeerRow {
                    seer: *id,
                    round: investigation.round,
                    target: investigation.target,
                    faction: investigation.faction,
                }));
                AssignmentRow {
                    player_id: *id,
                    role: seat.role,
                    alive: seat.alive,
                    previous_target: seat.previous_target,
                    pending_revenge: seat.pending_revenge,
                }
            })
            .collect();

        Self {
            format: Self::FORMAT,
            players: state.roster.values().cloned().collect(),
            roles: catalog.iter().cloned().collect(),
            lobby_composition: state.composition.iter().collect(),
            game: GameRow {
                revision: state.revision,
                next_player_id: state.next_player_id(),
                phase: state.phase,
                night_round: state.night.round,
                day_round: state.day.round,
                announcements: state.announcements.clone(),
            },
            assignment,
            seer_history,
            night_actions: state
                .night
                .iter()
                .map(|(actor, action)| NightActionRow {
                    actor,
                    kind: action.kind,
                    target: action.target,
                })
                .collect(),
            day_votes: state
                .day
                .iter()
                .map(|(voter, ballot)| DayVoteRow { voter, ballot })
                .collect(),
            history_log: state.history.entries().to_vec(),
        }
    }

    /// Rebuilds the state. Every player comes back disconnected; they
    /// reattach by logging in.
    pub fn restore(&self) -> Result<GameState> {
        if self.format != Self::FORMAT {
            return Err(RepositoryError::CorruptedData(format!(
                "unsupported snapshot format {}",
                self.format
            )));
        }

        let mut state = GameState::new().with_next_player_id(self.game.next_player_id);
        state.revision = self.game.revision;
        state.phase = self.game.phase;
        state.announcements = self.game.announcements.clone();
        state.composition = RoleComposition::from_counts(self.lobby_composition.iter().copied());

        for row in &self.players {
            if row.id.0 >= self.game.next_player_id {
                return Err(RepositoryError::CorruptedData(format!(
                    "player {} was never allocated",
                    row.id
                )));
            }
            let mut record = row.clone();
            record.connected = false;
            state.roster.insert(record.id, record);
        }

        let mut seats: BTreeMap<PlayerId, Seat> = BTreeMap::new();
        for row in &self.assignment {
            let mut seat = Seat::new(row.role);
            seat.alive = row.alive;
            seat.previous_target = row.previous_target;
            seat.pending_revenge = row.pending_revenge;
            seats.insert(row.player_id, seat);
        }
        for row in &self.seer_history {
            let seat = seats.get_mut(&row.seer).ok_or_else(|| {
                RepositoryError::CorruptedData(format!("seer {} has no seat", row.seer))
            })?;
            seat.investigations.push(Investigation {
                round: row.round,
                target: row.target,
                faction: row.faction,
            });
        }
        state.seats = seats;

        state.night = NightActions::from_submissions(
            self.game.night_round,
            self.night_actions.iter().map(|row| {
                (
                    row.actor,
                    NightAction {
                        kind: row.kind,
                        target: row.target,
                    },
                )
            }),
        );
        state.day = DayBallot::from_ballots(
            self.game.day_round,
            self.day_votes.iter().map(|row| (row.voter, row.ballot)),
        );
        state.history = HistoryLog::from_entries(self.history_log.clone());

        Ok(state)
    }

    /// The catalog the stored game was dealt under.
    pub fn catalog(&self) -> Option<RoleCatalog> {
        if self.roles.is_empty() {
            None
        } else {
            Some(RoleCatalog::from_specs(self.roles.iter().cloned()))
        }
    }
}
