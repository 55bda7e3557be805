//! Asset URL resolution.
//!
//! The service hands out bare keys and relative paths; this module turns
//! them into absolute URLs for a presentation layer to fetch.

use pokedex_types::{CreatureImages, CreatureSummary, Move};

use crate::config::ClientConfig;

/// Base URLs for sprites, type icons and creature images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUrls {
    data_url: String,
    sprites_url: String,
    icons_url: String,
}

impl AssetUrls {
    /// Take the asset roots from `config`.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            data_url: config.data_url.clone(),
            sprites_url: config.sprites_url.clone(),
            icons_url: config.icons_url.clone(),
        }
    }

    /// Sprite for a catalog entry: `{sprites}{spriteKey}.png`.
    pub fn sprite(&self, summary: &CreatureSummary) -> String {
        format!("{}{}.png", self.sprites_url, summary.sprite_key)
    }

    /// Icon for a type tag: `{icons}{type}.jpg`.
    pub fn type_icon(&self, type_tag: &str) -> String {
        format!("{}{}.jpg", self.icons_url, type_tag)
    }

    /// Icon for a move's type.
    pub fn move_icon(&self, creature_move: &Move) -> String {
        self.type_icon(&creature_move.type_tag)
    }

    /// A creature image path resolved against the data root.
    pub fn image(&self, path: &str) -> String {
        join(&self.data_url, path)
    }

    /// All of a creature's images resolved against the data root.
    pub fn images(&self, images: &CreatureImages) -> CreatureImages {
        CreatureImages {
            photo: self.image(&images.photo),
            type_icon: self.image(&images.type_icon),
            weakness_icon: self.image(&images.weakness_icon),
        }
    }
}

/// Join a base and a relative path with exactly one `/` between them.
fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
