//! Observable battle session state.
//!
//! The battle session itself lives in `pokedex-core`; this module holds the
//! vocabulary it is described with ([`Phase`], [`Outcome`], [`TurnOutcome`])
//! and the [`SessionView`] projection that a presentation layer renders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::creature::Creature;
use crate::ids::{CreatureId, SessionId};
use crate::wire::TurnResultsRecord;

/// Lifecycle phase of a battle session.
///
/// `AwaitingTurnResult` is the transient sub-state of `Active` while a move
/// is in flight; it rejects further submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Phase {
    /// No creature chosen yet.
    Idle,
    /// Initiation request sent, waiting for the opponent.
    AwaitingOpponent,
    /// Battle in progress, ready for a move.
    Active,
    /// Battle in progress, a move is in flight.
    AwaitingTurnResult,
    /// Battle over.
    Concluded,
}

impl Phase {
    /// Whether the battle is in progress (including a pending turn).
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active | Self::AwaitingTurnResult)
    }

    /// Whether a service request is outstanding.
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::AwaitingOpponent | Self::AwaitingTurnResult)
    }
}

impl core::fmt::Display for Phase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingOpponent => "awaiting-opponent",
            Self::Active => "active",
            Self::AwaitingTurnResult => "awaiting-turn-result",
            Self::Concluded => "concluded",
        };
        f.write_str(name)
    }
}

/// How a concluded battle ended for the local player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Outcome {
    /// The opponent was knocked out.
    Won,
    /// The player's creature was knocked out, or the player fled.
    Lost,
    /// Both creatures were knocked out in the same turn.
    ///
    /// Recorded as both a win and a loss.
    Both,
}

impl Outcome {
    /// Whether the outcome counts as a win.
    pub const fn is_win(self) -> bool {
        matches!(self, Self::Won | Self::Both)
    }

    /// Whether the outcome counts as a loss.
    pub const fn is_loss(self) -> bool {
        matches!(self, Self::Lost | Self::Both)
    }
}

/// What one side did during a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SideAction {
    /// Move played (wire form).
    pub move_name: String,
    /// Result text reported by the service.
    pub result: String,
}

impl SideAction {
    /// Build from the raw move/result pair; `None` when the side did not act.
    pub fn from_pair(move_name: Option<String>, result: Option<String>) -> Option<Self> {
        match (move_name, result) {
            (None, None) => None,
            (move_name, result) => Some(Self {
                move_name: move_name.unwrap_or_default(),
                result: result.unwrap_or_default(),
            }),
        }
    }

    /// Human-readable line for the given player slot (1 or 2).
    pub fn message(&self, slot: u8) -> String {
        format!(
            "Player {slot} played {} and {}",
            self.move_name, self.result
        )
    }
}

/// The most recent turn's actions for each side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TurnOutcome {
    /// The local player's action, if taken.
    pub player: Option<SideAction>,
    /// The opponent's action, if taken.
    pub opponent: Option<SideAction>,
}

impl From<TurnResultsRecord> for TurnOutcome {
    fn from(results: TurnResultsRecord) -> Self {
        Self {
            player: SideAction::from_pair(results.p1_move, results.p1_result),
            opponent: SideAction::from_pair(results.p2_move, results.p2_result),
        }
    }
}

/// Render-ready state of one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SideView {
    /// Creature identifier.
    pub id: CreatureId,
    /// Display name.
    pub display_name: String,
    /// Maximum health.
    pub hit_points: u32,
    /// Remaining health.
    pub current_hit_points: u32,
    /// Remaining health as a whole percentage (health bar width).
    pub health_percent: u32,
    /// Below the low-health threshold.
    pub low_health: bool,
}

impl From<&Creature> for SideView {
    fn from(creature: &Creature) -> Self {
        Self {
            id: creature.id.clone(),
            display_name: creature.display_name.clone(),
            hit_points: creature.hit_points,
            current_hit_points: creature.current_hit_points,
            health_percent: creature.health_percent(),
            low_health: creature.is_low_health(),
        }
    }
}

/// Snapshot of a battle session for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SessionView {
    /// Current phase.
    pub phase: Phase,
    /// Server-issued battle id, once active.
    pub session_id: Option<SessionId>,
    /// Number of turns applied so far.
    pub turn: u32,
    /// The local player's side, once a creature is chosen.
    pub player: Option<SideView>,
    /// The opponent's side, once known.
    pub opponent: Option<SideView>,
    /// Message lines for the last turn (player first).
    pub messages: Vec<String>,
    /// How the battle ended, once concluded.
    pub outcome: Option<Outcome>,
    /// When the battle became active.
    pub started_at: Option<DateTime<Utc>>,
}

impl SessionView {
    /// Whether a service request is outstanding.
    pub const fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }
}
