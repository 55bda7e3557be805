//! Records exchanged with the catalog and battle service.
//!
//! These mirror the service's JSON exactly (including its hyphenated keys)
//! and are converted into the domain types at the edge. Unknown fields are
//! ignored; the server is trusted, so no cross-field validation happens
//! here.

use serde::{Deserialize, Serialize};

use crate::creature::{Creature, CreatureImages, Move};
use crate::ids::{CreatureId, PlayerId, SessionId};

/// Detail record for one creature (`?pokemon=<id>` and battle sides).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureRecord {
    /// Display name.
    pub name: String,
    /// Stable identifier.
    pub shortname: CreatureId,
    /// Maximum health.
    pub hp: u32,
    /// Remaining health, only present on battle responses.
    #[serde(rename = "current-hp", default, skip_serializing_if = "Option::is_none")]
    pub current_hp: Option<u32>,
    /// Descriptive info block.
    #[serde(default)]
    pub info: InfoRecord,
    /// Image paths relative to the data root.
    #[serde(default)]
    pub images: ImagesRecord,
    /// Moves in display order.
    #[serde(default)]
    pub moves: Vec<MoveRecord>,
}

/// The `info` block of a [`CreatureRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoRecord {
    /// Flavour text.
    #[serde(default)]
    pub description: String,
    /// Creature type.
    #[serde(rename = "type", default)]
    pub type_tag: String,
    /// Weakness type.
    #[serde(default)]
    pub weakness: String,
}

/// The `images` block of a [`CreatureRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagesRecord {
    /// Portrait photo path.
    #[serde(default)]
    pub photo: String,
    /// Type icon path.
    #[serde(rename = "typeIcon", default)]
    pub type_icon: String,
    /// Weakness icon path.
    #[serde(rename = "weaknessIcon", default)]
    pub weakness_icon: String,
}

/// One entry of a creature's `moves` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Display name.
    pub name: String,
    /// Damage points; absent for status moves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dp: Option<u32>,
    /// Move type.
    #[serde(rename = "type", default)]
    pub type_tag: String,
}

/// Response to a battle initiation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStartRecord {
    /// Battle identifier.
    pub guid: SessionId,
    /// Local player identifier.
    pub pid: PlayerId,
    /// The player's creature as the server sees it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p1: Option<CreatureRecord>,
    /// The server-chosen opponent.
    pub p2: CreatureRecord,
}

/// Per-side move and result text of one turn.
///
/// `null` on either field means that side did not act.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResultsRecord {
    /// Move played by the local player.
    #[serde(rename = "p1-move", default)]
    pub p1_move: Option<String>,
    /// Result of the local player's move.
    #[serde(rename = "p1-result", default)]
    pub p1_result: Option<String>,
    /// Move played by the opponent.
    #[serde(rename = "p2-move", default)]
    pub p2_move: Option<String>,
    /// Result of the opponent's move.
    #[serde(rename = "p2-result", default)]
    pub p2_result: Option<String>,
}

/// Health report for one side after a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideHealthRecord {
    /// Identifier of the creature, when the server includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortname: Option<CreatureId>,
    /// Maximum health.
    pub hp: u32,
    /// Remaining health.
    #[serde(rename = "current-hp")]
    pub current_hp: u32,
}

/// Response to a move submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Battle identifier the response belongs to.
    pub guid: SessionId,
    /// Local player identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<PlayerId>,
    /// Move/result text per side.
    #[serde(default)]
    pub results: TurnResultsRecord,
    /// Local player's health.
    pub p1: SideHealthRecord,
    /// Opponent's health.
    pub p2: SideHealthRecord,
}

impl From<MoveRecord> for Move {
    fn from(record: MoveRecord) -> Self {
        Self {
            name: record.name,
            damage_points: record.dp,
            type_tag: record.type_tag,
        }
    }
}

impl From<CreatureRecord> for Creature {
    fn from(record: CreatureRecord) -> Self {
        let current_hit_points = record.current_hp.unwrap_or(record.hp).min(record.hp);
        Self {
            id: record.shortname,
            display_name: record.name,
            hit_points: record.hp,
            current_hit_points,
            moves: record.moves.into_iter().map(Move::from).collect(),
            description: record.info.description,
            type_tag: record.info.type_tag,
            weakness_tag: record.info.weakness,
            images: CreatureImages {
                photo: record.images.photo,
                type_icon: record.images.type_icon,
                weakness_icon: record.images.weakness_icon,
            },
        }
    }
}
