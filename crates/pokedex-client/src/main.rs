//! Auto-battle entry point for the Pokedex battle client.
//!
//! Loads the catalog, fetches the configured creature, plays one battle
//! against a server-chosen opponent and reports the updated found set.
//!
//! ```text
//! catalog --> creature detail --> initiate --> moves ... --> conclusion --> reset
//! ```

use anyhow::Context;
use pokedex_client::{AssetUrls, AutoBattler, ClientConfig, ClientError, HttpPokedexService};
use pokedex_core::{Battle, CatalogStore, catalog};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Application entry point.
///
/// Initializes logging, loads configuration from environment variables,
/// then plays a single battle.
///
/// # Errors
///
/// Returns an error if configuration, the catalog, or the battle fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("pokedex-runner starting");

    let config = ClientConfig::from_env()?;
    info!(
        pokedex_url = config.pokedex_url,
        game_url = config.game_url,
        request_timeout_ms = config.request_timeout.as_millis(),
        player = %config.player,
        max_turns = config.max_turns,
        "configuration loaded"
    );

    let service = HttpPokedexService::new(&config)?;
    let assets = AssetUrls::new(&config);

    let summaries = catalog::load_catalog(&service)
        .await
        .map_err(ClientError::from)
        .context("loading catalog")?;
    let store = CatalogStore::from_summaries(summaries).into_shared();

    let player = catalog::fetch_creature(&service, &store, &config.player)
        .await
        .map_err(ClientError::from)
        .with_context(|| format!("fetching {}", config.player))?;
    if let Some(summary) = store.read().await.summary(&player.id) {
        info!(
            creature = %player.id,
            hp = player.hit_points,
            sprite = assets.sprite(summary),
            photo = assets.image(&player.images.photo),
            "player creature ready"
        );
    }

    let battle = Battle::new(service, store, config.request_timeout);

    // Presentation stand-in: log every published view.
    let mut views = battle.subscribe();
    tokio::spawn(async move {
        loop {
            match views.recv().await {
                Ok(view) => {
                    debug!(phase = %view.phase, turn = view.turn, messages = ?view.messages, "session view");
                }
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "session view subscriber lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut runner = AutoBattler::new(config.max_turns, SmallRng::from_os_rng());
    let summary = runner
        .play(&battle, player)
        .await
        .map_err(ClientError::from)
        .context("playing battle")?;

    let store = battle.catalog().read().await;
    let selectable: Vec<&str> = store.selectable().iter().map(|s| s.display_name.as_str()).collect();
    info!(
        outcome = ?summary.outcome,
        turns = summary.turns,
        newly_found = ?summary.newly_found,
        found = store.found_count(),
        known = store.known().len(),
        selectable = ?selectable,
        "pokedex-runner finished"
    );

    Ok(())
}
