//! The battle session state machine.
//!
//! [`BattleSession`] owns one battle from creature selection to conclusion.
//! It performs no I/O: every service round-trip is split into a `begin_*`
//! step that validates the transition and returns the request to send, and
//! an `apply_*`/`complete_*` (or `abort_*`) step that consumes the
//! response. Between the two the session sits in a busy phase
//! ([`Phase::AwaitingOpponent`] or [`Phase::AwaitingTurnResult`]) and
//! rejects further actions.
//!
//! ```text
//! Idle --begin_initiate--> AwaitingOpponent --complete_initiate--> Active
//!   ^                           |abort_initiate                    |  ^
//!   |                           v                         begin_turn  |apply_turn (no KO)
//!   |                         Idle                                 v  |abort_turn
//!   |                                                   AwaitingTurnResult
//!   |                                                              |apply_turn (KO)
//!   +-------------------------reset------------------------- Concluded
//!                                           Active --forfeit-------^
//! ```
//!
//! A forfeit concludes on the spot. The service is still told about it,
//! but its answer can no longer change the session.
//!
//! Health is server-authoritative: [`BattleSession::apply_turn`] copies the
//! reported figures and never subtracts damage locally.

use chrono::{DateTime, Utc};
use pokedex_types::{
    Creature, CreatureId, FORFEIT_MOVE, GameStartRecord, Outcome, Phase, PlayerId, SessionId,
    SessionView, SideAction, SideView, TurnOutcome, TurnRecord,
};
use tracing::{debug, info, warn};

use crate::catalog::CatalogStore;
use crate::error::SessionError;

/// The id pair the service issues when a battle starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIds {
    /// Battle identifier.
    pub session_id: SessionId,
    /// Local player identifier.
    pub player_id: PlayerId,
}

/// Request to send when starting a battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiateRequest {
    /// The chosen creature.
    pub creature: CreatureId,
}

/// Request to send when submitting a move.
///
/// The `ticket` identifies this submission; the response must be applied
/// with the same ticket or it is discarded as stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    /// Submission ticket, unique within one [`BattleSession`].
    pub ticket: u64,
    /// Battle identifier.
    pub session_id: SessionId,
    /// Local player identifier.
    pub player_id: PlayerId,
    /// Move in wire form.
    pub move_name: String,
}

impl TurnRequest {
    /// Whether this request forfeits the battle.
    pub fn is_forfeit(&self) -> bool {
        self.move_name == FORFEIT_MOVE
    }
}

/// What applying one turn changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    /// Turn number within the session (1-based).
    pub turn: u32,
    /// Move/result text per side.
    pub outcome: TurnOutcome,
    /// Player health as a whole percentage.
    pub player_health_percent: u32,
    /// Opponent health as a whole percentage.
    pub opponent_health_percent: u32,
    /// Player below the low-health threshold.
    pub player_low_health: bool,
    /// Opponent below the low-health threshold.
    pub opponent_low_health: bool,
    /// Set when this turn ended the battle.
    pub conclusion: Option<Outcome>,
    /// Set when this turn unlocked the defeated opponent.
    pub newly_found: Option<CreatureId>,
}

/// Result of feeding a turn response to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnApplication {
    /// The response belonged to the pending turn and was applied.
    Applied(TurnReport),
    /// The response was stale and the session was left untouched.
    Discarded,
}

/// A battle concluded by forfeit, with the notice still owed to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forfeit {
    /// The concluding turn.
    pub report: TurnReport,
    /// The reserved move to send. Any response to it is stale on arrival.
    pub notice: TurnRequest,
}

impl TurnApplication {
    /// The report, if the response was applied.
    pub const fn report(&self) -> Option<&TurnReport> {
        match self {
            Self::Applied(report) => Some(report),
            Self::Discarded => None,
        }
    }
}


/// Mutable state of one battle.
#[derive(Debug, Clone)]
pub struct BattleSession {
    phase: Phase,
    ids: Option<SessionIds>,
    player: Option<Creature>,
    opponent: Option<Creature>,
    /// Player health recorded at initiation, restored on reset.
    starting_hit_points: u32,
    last_outcome: Option<TurnOutcome>,
    outcome: Option<Outcome>,
    turn: u32,
    next_ticket: u64,
    /// Ticket of the move in flight.
    pending: Option<u64>,
    started_at: Option<DateTime<Utc>>,
}

impl Default for BattleSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BattleSession {
    /// Create an idle session with no creature chosen.
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            ids: None,
            player: None,
            opponent: None,
            starting_hit_points: 0,
            last_outcome: None,
            outcome: None,
            turn: 0,
            next_ticket: 0,
            pending: None,
            started_at: None,
        }
    }

    /// Current phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Server-issued ids, once active.
    pub const fn ids(&self) -> Option<&SessionIds> {
        self.ids.as_ref()
    }

    /// The player's creature, once chosen.
    pub const fn player(&self) -> Option<&Creature> {
        self.player.as_ref()
    }

    /// The opponent's creature, once known.
    pub const fn opponent(&self) -> Option<&Creature> {
        self.opponent.as_ref()
    }

    /// Move/result text of the most recent turn.
    pub const fn last_outcome(&self) -> Option<&TurnOutcome> {
        self.last_outcome.as_ref()
    }

    /// How the battle ended, once concluded.
    pub const fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Number of turns applied in this battle.
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Player health recorded when the battle was initiated.
    pub const fn starting_hit_points(&self) -> u32 {
        self.starting_hit_points
    }

    /// Start a battle with `player`, recording `starting_hit_points` as the
    /// health to restore on [`reset`](Self::reset).
    ///
    /// Moves the session to [`Phase::AwaitingOpponent`].
    ///
    /// # Errors
    ///
    /// [`SessionError::IllegalTransition`] unless idle;
    /// [`SessionError::NotFound`] if the creature has not been found.
    pub fn begin_initiate(
        &mut self,
        mut player: Creature,
        starting_hit_points: u32,
        catalog: &CatalogStore,
    ) -> Result<InitiateRequest, SessionError> {
        self.require(Phase::Idle, "initiate")?;
        if !catalog.is_found(&player.id) {
            return Err(SessionError::NotFound(player.id));
        }

        let hit_points = player.hit_points;
        player.set_health(hit_points, starting_hit_points);
        self.starting_hit_points = player.current_hit_points;

        let request = InitiateRequest {
            creature: player.id.clone(),
        };
        debug!(creature = %player.id, starting_hp = self.starting_hit_points, "initiating battle");
        self.player = Some(player);
        self.phase = Phase::AwaitingOpponent;
        Ok(request)
    }

    /// Apply the service's answer to an initiation request.
    ///
    /// Assigns the session ids (the only place they are ever set) and the
    /// opponent, then moves to [`Phase::Active`].
    ///
    /// # Errors
    ///
    /// [`SessionError::IllegalTransition`] unless awaiting an opponent.
    pub fn complete_initiate(&mut self, record: GameStartRecord) -> Result<(), SessionError> {
        self.require(Phase::AwaitingOpponent, "complete_initiate")?;

        let opponent = Creature::from(record.p2);
        info!(
            session_id = %record.guid,
            opponent = %opponent.id,
            opponent_hp = opponent.hit_points,
            "battle started"
        );
        self.ids = Some(SessionIds {
            session_id: record.guid,
            player_id: record.pid,
        });
        self.opponent = Some(opponent);
        self.last_outcome = None;
        self.outcome = None;
        self.turn = 0;
        self.started_at = Some(Utc::now());
        self.phase = Phase::Active;
        Ok(())
    }

    /// Roll back a failed initiation to [`Phase::Idle`], forgetting the
    /// chosen creature.
    ///
    /// Returns `false` (and changes nothing) unless awaiting an opponent.
    pub fn abort_initiate(&mut self) -> bool {
        if self.phase != Phase::AwaitingOpponent {
            return false;
        }
        debug!("initiation aborted");
        self.player = None;
        self.starting_hit_points = 0;
        self.phase = Phase::Idle;
        true
    }

    /// Prepare a move submission.
    ///
    /// `move_name` must be the wire form of one of the player's moves. The
    /// reserved [`FORFEIT_MOVE`] goes through [`forfeit`](Self::forfeit)
    /// instead. Moves the session to [`Phase::AwaitingTurnResult`].
    ///
    /// # Errors
    ///
    /// [`SessionError::SessionBusy`] while a turn is in flight;
    /// [`SessionError::IllegalTransition`] unless active;
    /// [`SessionError::UnknownMove`] for a move the player does not have.
    pub fn begin_turn(&mut self, move_name: &str) -> Result<TurnRequest, SessionError> {
        self.require_active("submit_move")?;
        let known = self
            .player
            .as_ref()
            .is_some_and(|p| p.find_move(move_name).is_some());
        if !known {
            return Err(SessionError::UnknownMove(move_name.to_owned()));
        }
        let request = self.next_request("submit_move", move_name)?;
        self.pending = Some(request.ticket);
        self.phase = Phase::AwaitingTurnResult;
        debug!(ticket = request.ticket, move_name, "turn dispatched");
        Ok(request)
    }

    /// Concede the battle: conclude immediately as [`Outcome::Lost`].
    ///
    /// Health is left as last reported and the found set is not touched.
    /// The returned notice carries the reserved [`FORFEIT_MOVE`] for the
    /// service; whether it is delivered does not affect the session.
    ///
    /// # Errors
    ///
    /// [`SessionError::SessionBusy`] while a turn is in flight;
    /// [`SessionError::IllegalTransition`] unless active.
    pub fn forfeit(&mut self) -> Result<Forfeit, SessionError> {
        self.require_active("forfeit")?;
        let notice = self.next_request("forfeit", FORFEIT_MOVE)?;

        let outcome = TurnOutcome {
            player: Some(SideAction {
                move_name: FORFEIT_MOVE.to_owned(),
                result: String::from("forfeit"),
            }),
            opponent: None,
        };
        self.turn = self.turn.saturating_add(1);
        let (player, opponent) = (self.player.as_ref(), self.opponent.as_ref());
        let report = TurnReport {
            turn: self.turn,
            outcome: outcome.clone(),
            player_health_percent: player.map_or(0, Creature::health_percent),
            opponent_health_percent: opponent.map_or(0, Creature::health_percent),
            player_low_health: player.is_some_and(Creature::is_low_health),
            opponent_low_health: opponent.is_some_and(Creature::is_low_health),
            conclusion: Some(Outcome::Lost),
            newly_found: None,
        };

        info!(turn = self.turn, session_id = %notice.session_id, "battle forfeited");
        self.last_outcome = Some(outcome);
        self.outcome = Some(Outcome::Lost);
        self.phase = Phase::Concluded;
        Ok(Forfeit { report, notice })
    }

    /// Roll back a failed submission to [`Phase::Active`].
    ///
    /// Returns `false` (and changes nothing) if `ticket` is not the pending
    /// submission.
    pub fn abort_turn(&mut self, ticket: u64) -> bool {
        match self.pending {
            Some(pending) if pending == ticket && self.phase == Phase::AwaitingTurnResult => {
                self.pending = None;
                self.phase = Phase::Active;
                debug!(ticket, "turn aborted");
                true
            }
            _ => false,
        }
    }

    /// Apply the service's answer to a move submission.
    ///
    /// The response is discarded, leaving the session untouched, unless it
    /// answers the pending submission `ticket` and carries the current
    /// session id. Otherwise, in order: record the last outcome, copy both
    /// sides' health from the response, then check for a knock-out. A
    /// defeated opponent that is not yet found is marked found, exactly once.
    pub fn apply_turn(
        &mut self,
        ticket: u64,
        record: TurnRecord,
        catalog: &mut CatalogStore,
    ) -> TurnApplication {
        let current_session = self.ids.as_ref().map(|ids| &ids.session_id);
        let answers_pending = self.pending == Some(ticket)
            && self.phase == Phase::AwaitingTurnResult
            && current_session == Some(&record.guid);
        if !answers_pending {
            warn!(
                ticket,
                response_session = %record.guid,
                phase = %self.phase,
                "discarding stale turn response"
            );
            return TurnApplication::Discarded;
        }
        let (Some(player), Some(opponent)) = (self.player.as_mut(), self.opponent.as_mut()) else {
            warn!(ticket, "active session without creatures, discarding turn response");
            return TurnApplication::Discarded;
        };
        self.pending = None;

        let outcome = TurnOutcome::from(record.results);
        player.set_health(record.p1.hp, record.p1.current_hp);
        opponent.set_health(record.p2.hp, record.p2.current_hp);

        let conclusion = match (player.is_fainted(), opponent.is_fainted()) {
            (true, true) => Some(Outcome::Both),
            (true, false) => Some(Outcome::Lost),
            (false, true) => Some(Outcome::Won),
            (false, false) => None,
        };

        let newly_found = match conclusion {
            Some(result) if result.is_win() && !catalog.is_found(&opponent.id) => {
                catalog.mark_found(&opponent.id).then(|| opponent.id.clone())
            }
            _ => None,
        };

        self.turn = self.turn.saturating_add(1);
        let report = TurnReport {
            turn: self.turn,
            outcome: outcome.clone(),
            player_health_percent: player.health_percent(),
            opponent_health_percent: opponent.health_percent(),
            player_low_health: player.is_low_health(),
            opponent_low_health: opponent.is_low_health(),
            conclusion,
            newly_found,
        };
        debug!(
            turn = self.turn,
            player_hp = player.current_hit_points,
            opponent_hp = opponent.current_hit_points,
            "turn applied"
        );

        self.last_outcome = Some(outcome);
        if let Some(result) = conclusion {
            info!(turn = self.turn, outcome = ?result, "battle concluded");
            self.outcome = Some(result);
            self.phase = Phase::Concluded;
        } else {
            self.phase = Phase::Active;
        }
        TurnApplication::Applied(report)
    }

    /// Return a concluded session to [`Phase::Idle`].
    ///
    /// Clears the ids, the opponent and the last outcome, and restores the
    /// player's health to the value recorded at initiation. The catalog is
    /// not touched.
    ///
    /// # Errors
    ///
    /// [`SessionError::IllegalTransition`] unless concluded.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.require(Phase::Concluded, "reset")?;
        let starting = self.starting_hit_points;
        if let Some(player) = self.player.as_mut() {
            let hit_points = player.hit_points;
            player.set_health(hit_points, starting);
        }
        self.ids = None;
        self.opponent = None;
        self.last_outcome = None;
        self.outcome = None;
        self.pending = None;
        self.turn = 0;
        self.started_at = None;
        self.phase = Phase::Idle;
        debug!(restored_hp = starting, "session reset");
        Ok(())
    }

    /// Render-ready snapshot of the session.
    pub fn view(&self) -> SessionView {
        let messages = self
            .last_outcome
            .iter()
            .flat_map(|o| {
                let player = o.player.as_ref().map(|a| a.message(1));
                let opponent = o.opponent.as_ref().map(|a| a.message(2));
                player.into_iter().chain(opponent)
            })
            .collect();
        SessionView {
            phase: self.phase,
            session_id: self.ids.as_ref().map(|ids| ids.session_id.clone()),
            turn: self.turn,
            player: self.player.as_ref().map(SideView::from),
            opponent: self.opponent.as_ref().map(SideView::from),
            messages,
            outcome: self.outcome,
            started_at: self.started_at,
        }
    }

    fn require(&self, expected: Phase, operation: &'static str) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::IllegalTransition {
                operation,
                phase: self.phase,
            })
        }
    }

    fn require_active(&self, operation: &'static str) -> Result<(), SessionError> {
        match self.phase {
            Phase::Active => Ok(()),
            Phase::AwaitingTurnResult => Err(SessionError::SessionBusy),
            phase => Err(SessionError::IllegalTransition { operation, phase }),
        }
    }

    /// Issue a fresh ticket for `move_name` under the current ids.
    fn next_request(
        &mut self,
        operation: &'static str,
        move_name: &str,
    ) -> Result<TurnRequest, SessionError> {
        let Some(ids) = self.ids.clone() else {
            return Err(SessionError::IllegalTransition {
                operation,
                phase: self.phase,
            });
        };
        let ticket = self.next_ticket;
        self.next_ticket = self.next_ticket.wrapping_add(1);
        Ok(TurnRequest {
            ticket,
            session_id: ids.session_id,
            player_id: ids.player_id,
            move_name: move_name.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pokedex_types::{CreatureImages, CreatureSummary, Move};

    use super::*;

    fn catalog() -> CatalogStore {
        CatalogStore::from_summaries(
            ["bulbasaur", "charmander", "squirtle"]
                .iter()
                .map(|id| CreatureSummary {
                    id: CreatureId::from(*id),
                    display_name: (*id).to_owned(),
                    sprite_key: (*id).to_owned(),
                })
                .collect(),
        )
    }

    fn bulbasaur() -> Creature {
        Creature {
            id: CreatureId::from("bulbasaur"),
            display_name: String::from("Bulbasaur"),
            hit_points: 45,
            current_hit_points: 45,
            moves: vec![Move {
                name: String::from("Vine Whip"),
                damage_points: Some(45),
                type_tag: String::from("grass"),
            }],
            description: String::new(),
            type_tag: String::from("grass"),
            weakness_tag: String::from("fire"),
            images: CreatureImages::default(),
        }
    }

    #[test]
    fn new_session_is_idle_and_empty() {
        let session = BattleSession::new();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.ids().is_none());
        let view = session.view();
        assert!(view.player.is_none());
        assert!(view.messages.is_empty());
        assert!(!view.is_busy());
    }

    #[test]
    fn starting_health_is_capped_at_maximum() {
        let mut session = BattleSession::new();
        let request = session.begin_initiate(bulbasaur(), 90, &catalog());
        assert!(request.is_ok());
        assert_eq!(session.starting_hit_points(), 45);
        assert_eq!(session.phase(), Phase::AwaitingOpponent);
    }

    #[test]
    fn abort_initiate_returns_to_idle() {
        let mut session = BattleSession::new();
        let _ = session.begin_initiate(bulbasaur(), 45, &catalog());
        assert!(session.abort_initiate());
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.ids().is_none());
        assert!(session.player().is_none());
        assert!(session.view().player.is_none());
        assert_eq!(session.starting_hit_points(), 0);

        // Nothing left to roll back.
        assert!(!session.abort_initiate());
    }

    #[test]
    fn abort_turn_ignores_foreign_tickets() {
        let mut session = BattleSession::new();
        assert!(!session.abort_turn(0));
        assert_eq!(session.phase(), Phase::Idle);
    }
}
