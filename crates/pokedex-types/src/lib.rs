//! Shared type definitions for the Pokedex battle client.
//!
//! This crate is the single source of truth for the data model used by the
//! catalog store, the battle session, and the HTTP client. Domain types
//! flow to `TypeScript` via `ts-rs` so the browser presentation layer can
//! render [`SessionView`] snapshots without redeclaring them.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe string wrappers for creature, session, and player ids
//! - [`creature`] -- Creatures, moves, catalog summaries, health helpers
//! - [`session`] -- Phases, outcomes, and the observable session view
//! - [`wire`] -- Records exchanged with the remote service

pub mod creature;
pub mod ids;
pub mod session;
pub mod wire;

// Re-export all public types at crate root for convenience.
pub use creature::{
    Creature, CreatureImages, CreatureSummary, FORFEIT_MOVE, LOW_HEALTH_PERCENT, MAX_MOVES, Move,
    health_percent, is_low_health, normalize_move_name,
};
pub use ids::{CreatureId, PlayerId, SessionId};
pub use session::{Outcome, Phase, SessionView, SideAction, SideView, TurnOutcome};
pub use wire::{
    CreatureRecord, GameStartRecord, ImagesRecord, InfoRecord, MoveRecord, SideHealthRecord,
    TurnRecord, TurnResultsRecord,
};
