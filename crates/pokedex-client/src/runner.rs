//! Automatic battle loop.
//!
//! [`AutoBattler`] plays one battle end to end through a [`Battle`] driver:
//! it initiates with the given creature, submits randomly chosen moves
//! until the battle concludes, forfeits once the turn limit is reached,
//! and resets the session so it can be reused.

use pokedex_core::{Battle, PokedexService, SessionError, TurnApplication};
use pokedex_types::{Creature, CreatureId, FORFEIT_MOVE, Move, Outcome};
use rand::Rng;
use tracing::{debug, info, warn};

/// How one automatic battle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleSummary {
    /// Final result.
    pub outcome: Outcome,
    /// Turns applied, including a forfeit.
    pub turns: u32,
    /// Opponent unlocked by this battle, if any.
    pub newly_found: Option<CreatureId>,
    /// Whether the runner gave up.
    pub forfeited: bool,
}

/// Pick the next move for `creature`.
///
/// Damaging moves are preferred; a creature with only status moves uses
/// those, and one with no moves at all forfeits.
pub fn choose_move(creature: &Creature, rng: &mut impl Rng) -> String {
    let damaging: Vec<&Move> = creature.moves.iter().filter(|m| m.is_damaging()).collect();
    let pool = if damaging.is_empty() {
        creature.moves.iter().collect()
    } else {
        damaging
    };
    if pool.is_empty() {
        return FORFEIT_MOVE.to_owned();
    }
    let index = rng.random_range(0..pool.len());
    pool.get(index)
        .map_or_else(|| FORFEIT_MOVE.to_owned(), |m| m.wire_name())
}

/// Plays battles without user input.
#[derive(Debug)]
pub struct AutoBattler<R> {
    max_turns: u32,
    rng: R,
}

impl<R: Rng> AutoBattler<R> {
    /// Create a runner that forfeits after `max_turns` moves.
    pub const fn new(max_turns: u32, rng: R) -> Self {
        Self { max_turns, rng }
    }

    /// Play one battle with `player` at its current health.
    ///
    /// The session is reset before returning, so the driver is idle again
    /// on success.
    ///
    /// # Errors
    ///
    /// Propagates the first [`SessionError`]; the battle is left where the
    /// failure happened.
    pub async fn play<S: PokedexService>(
        &mut self,
        battle: &Battle<S>,
        player: Creature,
    ) -> Result<BattleSummary, SessionError> {
        let starting_hit_points = player.current_hit_points;
        let fighter = player.clone();

        let view = battle.initiate(player, starting_hit_points).await?;
        if let Some(opponent) = &view.opponent {
            info!(
                player = %fighter.id,
                opponent = %opponent.id,
                opponent_hp = opponent.hit_points,
                "battle begins"
            );
        }

        let mut attempts: u32 = 0;
        let summary = loop {
            let forfeit = attempts >= self.max_turns;
            let move_name = if forfeit {
                FORFEIT_MOVE.to_owned()
            } else {
                choose_move(&fighter, &mut self.rng)
            };
            attempts = attempts.saturating_add(1);

            let application = if move_name == FORFEIT_MOVE {
                info!(attempts, "turn limit reached or no moves left, forfeiting");
                TurnApplication::Applied(battle.forfeit().await?.report)
            } else {
                battle.submit_move(&move_name).await?
            };

            let TurnApplication::Applied(report) = application else {
                warn!(move_name, "turn response discarded");
                continue;
            };
            for message in battle.view().messages {
                debug!(turn = report.turn, "{message}");
            }
            if let Some(outcome) = report.conclusion {
                break BattleSummary {
                    outcome,
                    turns: report.turn,
                    newly_found: report.newly_found,
                    forfeited: move_name == FORFEIT_MOVE,
                };
            }
        };

        info!(
            outcome = ?summary.outcome,
            turns = summary.turns,
            forfeited = summary.forfeited,
            "battle over"
        );
        battle.reset()?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use pokedex_types::CreatureImages;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn creature(moves: &[(&str, Option<u32>)]) -> Creature {
        Creature {
            id: CreatureId::from("eevee"),
            display_name: String::from("Eevee"),
            hit_points: 55,
            current_hit_points: 55,
            moves: moves
                .iter()
                .map(|(name, dp)| Move {
                    name: (*name).to_owned(),
                    damage_points: *dp,
                    type_tag: String::from("normal"),
                })
                .collect(),
            description: String::new(),
            type_tag: String::from("normal"),
            weakness_tag: String::from("fighting"),
            images: CreatureImages::default(),
        }
    }

    #[test]
    fn prefers_damaging_moves() {
        let eevee = creature(&[("Growl", None), ("Quick Attack", Some(40)), ("Tail Whip", None)]);
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            assert_eq!(choose_move(&eevee, &mut rng), "quickattack");
        }
    }

    #[test]
    fn falls_back_to_status_moves() {
        let eevee = creature(&[("Growl", None), ("Tail Whip", None)]);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let chosen = choose_move(&eevee, &mut rng);
            assert!(chosen == "growl" || chosen == "tailwhip", "unexpected move {chosen}");
        }
    }

    #[test]
    fn no_moves_means_forfeit() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(choose_move(&creature(&[]), &mut rng), FORFEIT_MOVE);
    }
}
