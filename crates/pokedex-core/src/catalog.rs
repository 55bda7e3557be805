//! The catalog store: every known creature plus the player's found set.
//!
//! The store is built once from the service's catalog and lives for the
//! whole visit. `known` never changes after construction; `found` only
//! grows, and only through [`CatalogStore::mark_found`]. The store is
//! shared with the battle driver as a [`SharedCatalog`] so that a victory
//! can unlock the defeated opponent.

use std::collections::BTreeSet;
use std::sync::Arc;

use pokedex_types::{Creature, CreatureId, CreatureSummary};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{CatalogError, CatalogFailure};
use crate::service::PokedexService;

/// Creatures the player owns before winning any battle.
pub const STARTER_IDS: [&str; 3] = ["bulbasaur", "charmander", "squirtle"];

/// Catalog store shared between the caller and the battle driver.
pub type SharedCatalog = Arc<RwLock<CatalogStore>>;

/// Known creatures and the subset the player has found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogStore {
    /// Every creature in catalog order.
    known: Vec<CreatureSummary>,
    /// Identifiers the player has unlocked. Always a subset of `known`.
    found: BTreeSet<CreatureId>,
}

impl CatalogStore {
    /// Build a store from loaded summaries, seeding the found set with the
    /// starters that appear in the catalog.
    ///
    /// Duplicate identifiers keep their first occurrence.
    pub fn from_summaries(summaries: Vec<CreatureSummary>) -> Self {
        let mut seen = BTreeSet::new();
        let mut known = Vec::with_capacity(summaries.len());
        for summary in summaries {
            if seen.insert(summary.id.clone()) {
                known.push(summary);
            } else {
                warn!(creature = %summary.id, "duplicate catalog entry ignored");
            }
        }

        let mut found = BTreeSet::new();
        for starter in STARTER_IDS {
            let id = CreatureId::from(starter);
            if seen.contains(&id) {
                found.insert(id);
            } else {
                warn!(creature = starter, "starter missing from catalog, not seeded");
            }
        }

        info!(known = known.len(), found = found.len(), "catalog store built");
        Self { known, found }
    }

    /// Wrap the store for sharing with a battle driver.
    pub fn into_shared(self) -> SharedCatalog {
        Arc::new(RwLock::new(self))
    }

    /// Every known creature, in catalog order.
    pub fn known(&self) -> &[CreatureSummary] {
        &self.known
    }

    /// The found identifiers.
    pub const fn found(&self) -> &BTreeSet<CreatureId> {
        &self.found
    }

    /// Number of found creatures.
    pub fn found_count(&self) -> usize {
        self.found.len()
    }

    /// Whether the creature is in the catalog.
    pub fn is_known(&self, id: &CreatureId) -> bool {
        self.known.iter().any(|s| &s.id == id)
    }

    /// Whether the player has found the creature.
    pub fn is_found(&self, id: &CreatureId) -> bool {
        self.found.contains(id)
    }

    /// Look up one catalog entry.
    pub fn summary(&self, id: &CreatureId) -> Option<&CreatureSummary> {
        self.known.iter().find(|s| &s.id == id)
    }

    /// Found creatures in catalog order: the ones a player may battle with.
    pub fn selectable(&self) -> Vec<&CreatureSummary> {
        self.known
            .iter()
            .filter(|s| self.found.contains(&s.id))
            .collect()
    }

    /// Add a creature to the found set.
    ///
    /// Idempotent. Returns `true` only when the identifier was newly added.
    /// Identifiers outside the catalog are ignored so that `found` stays a
    /// subset of `known`.
    pub fn mark_found(&mut self, id: &CreatureId) -> bool {
        if !self.is_known(id) {
            warn!(creature = %id, "refusing to mark unknown creature as found");
            return false;
        }
        let inserted = self.found.insert(id.clone());
        if inserted {
            info!(creature = %id, found = self.found.len(), "creature found");
        }
        inserted
    }
}

/// Parse the catalog body: one `name:spriteKey` record per line.
///
/// Blank lines are skipped. Any other line without a non-empty name and a
/// non-empty, colon-free sprite key fails the whole parse.
///
/// # Errors
///
/// Returns [`CatalogError::CatalogUnavailable`] with
/// [`CatalogFailure::Malformed`] for the first bad line.
pub fn parse_catalog(body: &str) -> Result<Vec<CreatureSummary>, CatalogError> {
    let mut summaries = Vec::new();
    for (index, raw) in body.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let malformed = || {
            CatalogError::CatalogUnavailable(CatalogFailure::Malformed {
                line: index.saturating_add(1),
                content: line.to_owned(),
            })
        };
        let (name, key) = line.split_once(':').ok_or_else(malformed)?;
        let (name, key) = (name.trim(), key.trim());
        if name.is_empty() || key.is_empty() || key.contains(':') {
            return Err(malformed());
        }
        summaries.push(CreatureSummary {
            id: CreatureId::from(key),
            display_name: name.to_owned(),
            sprite_key: key.to_owned(),
        });
    }
    Ok(summaries)
}

/// Fetch and parse the full catalog.
///
/// No retry: a failure is returned to the caller as-is.
///
/// # Errors
///
/// Returns [`CatalogError::CatalogUnavailable`] if the service call fails
/// or the body does not parse.
pub async fn load_catalog<S: PokedexService>(
    service: &S,
) -> Result<Vec<CreatureSummary>, CatalogError> {
    let body = service.fetch_catalog().await.inspect_err(|e| {
        warn!(error = %e, "catalog fetch failed");
    })?;
    let summaries = parse_catalog(&body).inspect_err(|e| {
        warn!(error = %e, "catalog body rejected");
    })?;
    debug!(entries = summaries.len(), "catalog loaded");
    Ok(summaries)
}

/// Fetch the full detail of a found creature.
///
/// # Errors
///
/// Returns [`CatalogError::NotFound`] if the creature has not been found
/// and [`CatalogError::CatalogUnavailable`] if the service call fails.
pub async fn fetch_creature<S: PokedexService>(
    service: &S,
    catalog: &SharedCatalog,
    id: &CreatureId,
) -> Result<Creature, CatalogError> {
    if !catalog.read().await.is_found(id) {
        return Err(CatalogError::NotFound(id.clone()));
    }
    let record = service.fetch_creature(id).await?;
    debug!(creature = %id, moves = record.moves.len(), "creature detail fetched");
    Ok(Creature::from(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summaries(ids: &[&str]) -> Vec<CreatureSummary> {
        ids.iter()
            .map(|id| CreatureSummary {
                id: CreatureId::from(*id),
                display_name: id.to_uppercase(),
                sprite_key: (*id).to_owned(),
            })
            .collect()
    }

    fn id(raw: &str) -> CreatureId {
        CreatureId::from(raw)
    }

    #[test]
    fn parse_skips_blank_lines() {
        let parsed = parse_catalog("Bulbasaur:bulbasaur\n\nMr. Mime:mr-mime\n   \n");
        let parsed = parsed.unwrap_or_default();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get(1).map(|s| s.display_name.as_str()), Some("Mr. Mime"));
        assert_eq!(parsed.get(1).map(|s| s.id.as_str()), Some("mr-mime"));
    }

    #[test]
    fn parse_rejects_malformed_lines() {
        let err = parse_catalog("Bulbasaur:bulbasaur\nCharmander\n");
        assert_eq!(
            err,
            Err(CatalogError::CatalogUnavailable(CatalogFailure::Malformed {
                line: 2,
                content: String::from("Charmander"),
            }))
        );
        assert!(parse_catalog(":missingname").is_err());
        assert!(parse_catalog("Missing Key:").is_err());
        assert!(parse_catalog("Too:many:colons").is_err());
    }

    #[test]
    fn parse_empty_body_is_empty_catalog() {
        assert_eq!(parse_catalog("\n\n"), Ok(Vec::new()));
    }

    #[test]
    fn starters_are_seeded() {
        let store =
            CatalogStore::from_summaries(summaries(&["bulbasaur", "charmander", "squirtle", "pikachu"]));
        assert!(store.is_found(&id("bulbasaur")));
        assert!(store.is_found(&id("charmander")));
        assert!(store.is_found(&id("squirtle")));
        assert!(!store.is_found(&id("pikachu")));
        assert_eq!(store.found_count(), 3);
    }

    #[test]
    fn seeds_missing_from_catalog_are_dropped() {
        let store = CatalogStore::from_summaries(summaries(&["bulbasaur", "pikachu"]));
        assert_eq!(store.found_count(), 1);
        assert!(store.found().iter().all(|f| store.is_known(f)));
    }

    #[test]
    fn mark_found_is_idempotent() {
        let mut store = CatalogStore::from_summaries(summaries(&["bulbasaur", "charizard"]));
        assert!(store.mark_found(&id("charizard")));
        let after_first = store.found().clone();
        assert!(!store.mark_found(&id("charizard")));
        assert_eq!(store.found(), &after_first);
    }

    #[test]
    fn mark_found_ignores_unknown_creatures() {
        let mut store = CatalogStore::from_summaries(summaries(&["bulbasaur"]));
        assert!(!store.mark_found(&id("missingno")));
        assert!(!store.is_found(&id("missingno")));
    }

    #[test]
    fn found_set_is_monotonic() {
        let mut store =
            CatalogStore::from_summaries(summaries(&["bulbasaur", "charmander", "squirtle", "eevee", "onix"]));
        let mut previous = store.found().clone();
        for next in ["eevee", "eevee", "missingno", "onix", "bulbasaur"] {
            store.mark_found(&id(next));
            assert!(previous.is_subset(store.found()));
            previous = store.found().clone();
        }
        assert_eq!(store.found_count(), 5);
    }

    #[test]
    fn selectable_follows_catalog_order() {
        let mut store =
            CatalogStore::from_summaries(summaries(&["pikachu", "squirtle", "bulbasaur", "charmander"]));
        store.mark_found(&id("pikachu"));
        let order: Vec<&str> = store.selectable().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, ["pikachu", "squirtle", "bulbasaur", "charmander"]);
        assert_eq!(
            store.summary(&id("squirtle")).map(|s| s.sprite_key.as_str()),
            Some("squirtle")
        );
    }

    #[test]
    fn duplicate_entries_keep_first() {
        let mut list = summaries(&["bulbasaur"]);
        list.push(CreatureSummary {
            id: id("bulbasaur"),
            display_name: String::from("Other"),
            sprite_key: String::from("bulbasaur"),
        });
        let store = CatalogStore::from_summaries(list);
        assert_eq!(store.known().len(), 1);
        assert_eq!(
            store.summary(&id("bulbasaur")).map(|s| s.display_name.as_str()),
            Some("BULBASAUR")
        );
    }
}
