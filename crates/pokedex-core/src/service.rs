//! The request/response boundary to the remote catalog and battle service.
//!
//! [`PokedexService`] abstracts the transport. The production implementation
//! speaks HTTP (see `pokedex-client`); tests use scripted in-memory stubs.
//! The service is trusted: responses are applied as-is.

use core::future::Future;

use pokedex_types::{CreatureId, CreatureRecord, GameStartRecord, PlayerId, SessionId, TurnRecord};

use crate::error::ServiceError;

/// A remote catalog and battle service.
///
/// Every method is a single request with a single response. Non-success
/// responses must be reported as [`ServiceError::Status`] carrying the
/// response body text. Implementations never retry.
pub trait PokedexService: Send + Sync {
    /// Fetch the raw catalog body (`name:spriteKey` per line).
    fn fetch_catalog(&self) -> impl Future<Output = Result<String, ServiceError>> + Send;

    /// Fetch the detail record of one creature.
    fn fetch_creature(
        &self,
        id: &CreatureId,
    ) -> impl Future<Output = Result<CreatureRecord, ServiceError>> + Send;

    /// Start a battle with the chosen creature.
    fn start_game(
        &self,
        creature: &CreatureId,
    ) -> impl Future<Output = Result<GameStartRecord, ServiceError>> + Send;

    /// Submit one move (wire form) for an active battle.
    fn submit_move(
        &self,
        session_id: &SessionId,
        player_id: &PlayerId,
        move_name: &str,
    ) -> impl Future<Output = Result<TurnRecord, ServiceError>> + Send;
}
