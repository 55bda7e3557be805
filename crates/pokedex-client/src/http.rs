//! `reqwest`-backed implementation of [`PokedexService`].
//!
//! The catalog endpoint is queried with `GET` parameters; the battle
//! endpoint takes `application/x-www-form-urlencoded` `POST` bodies. Every
//! response is read as text first so that a non-success status can carry
//! the server's message, then decoded as JSON where one is expected.

use pokedex_core::{PokedexService, ServiceError};
use pokedex_types::{CreatureId, CreatureRecord, GameStartRecord, PlayerId, SessionId, TurnRecord};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, transport_error};

/// HTTP client for the catalog and battle service.
#[derive(Debug, Clone)]
pub struct HttpPokedexService {
    client: reqwest::Client,
    pokedex_url: String,
    game_url: String,
}

impl HttpPokedexService {
    /// Build a client for the endpoints in `config`.
    ///
    /// The request timeout also bounds each HTTP exchange.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Ok(Self {
            client,
            pokedex_url: config.pokedex_url.clone(),
            game_url: config.game_url.clone(),
        })
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ServiceError> {
        let response = request.send().await.map_err(|e| transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message: message.trim().to_owned(),
            });
        }

        response.text().await.map_err(|e| transport_error(&e))
    }
}

impl PokedexService for HttpPokedexService {
    async fn fetch_catalog(&self) -> Result<String, ServiceError> {
        debug!(url = self.pokedex_url, "fetching catalog");
        self.send(
            self.client
                .get(&self.pokedex_url)
                .query(&[("pokedex", "all")]),
        )
        .await
    }

    async fn fetch_creature(&self, id: &CreatureId) -> Result<CreatureRecord, ServiceError> {
        debug!(creature = %id, "fetching creature detail");
        let body = self
            .send(
                self.client
                    .get(&self.pokedex_url)
                    .query(&[("pokemon", id.as_str())]),
            )
            .await?;
        decode(&body)
    }

    async fn start_game(&self, creature: &CreatureId) -> Result<GameStartRecord, ServiceError> {
        debug!(creature = %creature, "requesting battle");
        let body = self
            .send(
                self.client
                    .post(&self.game_url)
                    .form(&[("startgame", "true"), ("mypokemon", creature.as_str())]),
            )
            .await?;
        decode(&body)
    }

    async fn submit_move(
        &self,
        session_id: &SessionId,
        player_id: &PlayerId,
        move_name: &str,
    ) -> Result<TurnRecord, ServiceError> {
        debug!(session_id = %session_id, move_name, "submitting move");
        let body = self
            .send(self.client.post(&self.game_url).form(&[
                ("guid", session_id.as_str()),
                ("pid", player_id.as_str()),
                ("movename", move_name),
            ]))
            .await?;
        decode(&body)
    }
}

/// Decode a JSON response body.
///
/// # Errors
///
/// Returns [`ServiceError::Decode`] if the body is not the expected shape.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ServiceError> {
    serde_json::from_str(body).map_err(|e| ServiceError::Decode(e.to_string()))
}
