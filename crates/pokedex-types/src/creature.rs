//! Creature and move types shared by the catalog and the battle session.
//!
//! A [`Creature`] is rebuilt from every service response; nothing here is
//! cached between requests. Health figures are plain integers handed down
//! by the server -- the client never computes damage, it only derives the
//! display percentage and the low-health flag from them.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::CreatureId;

/// Health percentage below which a side is flagged as low on health.
pub const LOW_HEALTH_PERCENT: u32 = 20;

/// Maximum number of moves a creature carries.
pub const MAX_MOVES: usize = 4;

/// Move name the service reserves for forfeiting a battle.
pub const FORFEIT_MOVE: &str = "flee";

/// Normalize a move's display name into the value sent over the wire.
///
/// All whitespace is stripped and the result is lowercased, so
/// `"Fire  Blast"` becomes `"fireblast"`.
pub fn normalize_move_name(display: &str) -> String {
    display
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// An action a creature can perform in battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Move {
    /// Display name, e.g. `"Fire Blast"`.
    pub name: String,
    /// Damage points, absent for status and utility moves.
    pub damage_points: Option<u32>,
    /// Move category; only used to pick a display icon.
    pub type_tag: String,
}

impl Move {
    /// The normalized name submitted to the battle service.
    pub fn wire_name(&self) -> String {
        normalize_move_name(&self.name)
    }

    /// Whether this move deals damage at all.
    pub const fn is_damaging(&self) -> bool {
        matches!(self.damage_points, Some(dp) if dp > 0)
    }
}

/// Relative image paths attached to a creature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CreatureImages {
    /// Portrait photo.
    pub photo: String,
    /// Icon of the creature's own type.
    pub type_icon: String,
    /// Icon of the type the creature is weak against.
    pub weakness_icon: String,
}

/// A creature species with its battle-relevant state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Creature {
    /// Stable key, unique across the catalog.
    pub id: CreatureId,
    /// Human-readable name.
    pub display_name: String,
    /// Maximum health.
    pub hit_points: u32,
    /// Remaining health, never above `hit_points`.
    pub current_hit_points: u32,
    /// Moves in display order (at most [`MAX_MOVES`]).
    pub moves: Vec<Move>,
    /// Flavour text.
    pub description: String,
    /// Type of the creature (presentational).
    pub type_tag: String,
    /// Type the creature is weak against (presentational).
    pub weakness_tag: String,
    /// Image paths.
    pub images: CreatureImages,
}

impl Creature {
    /// Remaining health as a whole percentage of maximum health.
    ///
    /// A creature with zero maximum health reports 0.
    pub fn health_percent(&self) -> u32 {
        health_percent(self.current_hit_points, self.hit_points)
    }

    /// Whether remaining health is below [`LOW_HEALTH_PERCENT`].
    pub fn is_low_health(&self) -> bool {
        is_low_health(self.current_hit_points, self.hit_points)
    }

    /// Whether the creature has been knocked out.
    pub const fn is_fainted(&self) -> bool {
        self.current_hit_points == 0
    }

    /// Set both health figures from an authoritative server report.
    ///
    /// Current health is capped at the reported maximum.
    pub fn set_health(&mut self, hit_points: u32, current_hit_points: u32) {
        self.hit_points = hit_points;
        self.current_hit_points = current_hit_points.min(hit_points);
    }

    /// Look up a move by its wire name.
    pub fn find_move(&self, wire_name: &str) -> Option<&Move> {
        self.moves.iter().find(|m| m.wire_name() == wire_name)
    }
}

/// Compute `current / max * 100`, rounded down.
pub fn health_percent(current: u32, max: u32) -> u32 {
    u64::from(current)
        .saturating_mul(100)
        .checked_div(u64::from(max))
        .and_then(|pct| u32::try_from(pct).ok())
        .unwrap_or(0)
}

/// Whether `current / max` is strictly below [`LOW_HEALTH_PERCENT`] percent.
///
/// Compared in integers (`current * 100 < max * 20`) so that no rounding
/// can move a side across the threshold.
pub fn is_low_health(current: u32, max: u32) -> bool {
    u64::from(current).saturating_mul(100)
        < u64::from(max).saturating_mul(u64::from(LOW_HEALTH_PERCENT))
}

/// One catalog entry: enough to list a creature and load its sprite.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CreatureSummary {
    /// Stable key, identical to the sprite key.
    pub id: CreatureId,
    /// Human-readable name.
    pub display_name: String,
    /// Sprite file stem.
    pub sprite_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creature(hp: u32, current: u32) -> Creature {
        Creature {
            id: CreatureId::from("pikachu"),
            display_name: String::from("Pikachu"),
            hit_points: hp,
            current_hit_points: current,
            moves: vec![
                Move {
                    name: String::from("Thunder Shock"),
                    damage_points: Some(40),
                    type_tag: String::from("electric"),
                },
                Move {
                    name: String::from("Growl"),
                    damage_points: None,
                    type_tag: String::from("normal"),
                },
            ],
            description: String::new(),
            type_tag: String::from("electric"),
            weakness_tag: String::from("ground"),
            images: CreatureImages::default(),
        }
    }

    #[test]
    fn normalization_strips_whitespace_and_lowercases() {
        assert_eq!(normalize_move_name("Fire  Blast"), "fireblast");
        assert_eq!(normalize_move_name(" Thunder\tShock "), "thundershock");
        assert_eq!(normalize_move_name("tackle"), "tackle");
    }

    #[test]
    fn normalization_is_deterministic() {
        let a = normalize_move_name("Hyper Beam");
        let b = normalize_move_name("Hyper Beam");
        assert_eq!(a, b);
    }

    #[test]
    fn low_health_threshold() {
        assert!(is_low_health(15, 100));
        assert!(!is_low_health(25, 100));
        assert!(!is_low_health(20, 100));
        assert!(is_low_health(0, 60));
        assert!(!is_low_health(0, 0));
    }

    #[test]
    fn percent_rounds_down_and_handles_zero_max() {
        assert_eq!(health_percent(45, 60), 75);
        assert_eq!(health_percent(1, 3), 33);
        assert_eq!(health_percent(10, 0), 0);
    }

    #[test]
    fn set_health_caps_current_at_max() {
        let mut c = creature(60, 60);
        c.set_health(50, 70);
        assert_eq!(c.hit_points, 50);
        assert_eq!(c.current_hit_points, 50);
        assert!(!c.is_fainted());

        c.set_health(50, 0);
        assert!(c.is_fainted());
        assert!(c.is_low_health());
    }

    #[test]
    fn find_move_by_wire_name() {
        let c = creature(60, 60);
        let found = c.find_move("thundershock");
        assert_eq!(found.map(|m| m.damage_points), Some(Some(40)));
        assert!(c.find_move("Thunder Shock").is_none());
        assert!(c.moves.iter().any(Move::is_damaging));
        assert!(c.find_move("growl").is_some_and(|m| !m.is_damaging()));
    }
}
