//! HTTP client and auto-battle runner for the Pokedex battle service.
//!
//! - [`http`] -- [`HttpPokedexService`], the `reqwest` implementation of
//!   [`pokedex_core::PokedexService`].
//! - [`config`] -- [`ClientConfig`], loaded from `POKEDEX_*` environment
//!   variables.
//! - [`assets`] -- absolute URLs for sprites, type icons and images.
//! - [`runner`] -- [`AutoBattler`], which plays whole battles unattended.
//! - [`error`] -- [`ClientError`].
//!
//! The `pokedex-runner` binary wires these together: it loads the catalog,
//! fetches the configured creature and plays one battle with it.

pub mod assets;
pub mod config;
pub mod error;
pub mod http;
pub mod runner;

pub use assets::AssetUrls;
pub use config::ClientConfig;
pub use error::ClientError;
pub use http::HttpPokedexService;
pub use runner::{AutoBattler, BattleSummary, choose_move};
