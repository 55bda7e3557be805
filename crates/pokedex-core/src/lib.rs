//! Catalog store and battle session for the Pokedex battle client.
//!
//! Two components, the second depending on the first:
//!
//! - [`catalog`] -- the [`CatalogStore`]: every known creature plus the
//!   found set, which only grows (on victory).
//! - [`session`] -- the [`BattleSession`] state machine:
//!   `Idle -> AwaitingOpponent -> Active -> Concluded -> Idle`.
//!
//! Around them:
//!
//! - [`service`] -- the [`PokedexService`] boundary to the remote service.
//! - [`battle`] -- the async [`Battle`] driver that runs the session
//!   against a service and broadcasts every state change.
//! - [`error`] -- typed errors for all of the above.
//!
//! Combat is server-authoritative: the session copies the health figures
//! the service reports and never computes damage itself.
//!
//! # Usage
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use pokedex_core::{Battle, CatalogStore, PokedexService, catalog};
//! use pokedex_types::CreatureId;
//!
//! async fn play<S: PokedexService>(service: S) -> Result<(), Box<dyn std::error::Error>> {
//!     let summaries = catalog::load_catalog(&service).await?;
//!     let store = CatalogStore::from_summaries(summaries).into_shared();
//!     let starter = catalog::fetch_creature(&service, &store, &CreatureId::from("bulbasaur")).await?;
//!
//!     let battle = Battle::new(service, store, Duration::from_secs(10));
//!     let hp = starter.current_hit_points;
//!     battle.initiate(starter, hp).await?;
//!     battle.forfeit().await?;
//!     battle.reset()?;
//!     Ok(())
//! }
//! ```

pub mod battle;
pub mod catalog;
pub mod error;
pub mod service;
pub mod session;

// Re-export primary types at crate root.
pub use battle::{Battle, Forfeited};
pub use catalog::{CatalogStore, STARTER_IDS, SharedCatalog};
pub use error::{CatalogError, CatalogFailure, ServiceError, SessionError};
pub use service::PokedexService;
pub use session::{
    BattleSession, Forfeit, InitiateRequest, SessionIds, TurnApplication, TurnReport, TurnRequest,
};
