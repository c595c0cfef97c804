//! Texture region registry.
//!
//! Entity definitions resolve their sprite regions once, through
//! [`AssetRegistry::load_if_absent`], and keep the returned [`TextureHandle`]s.
//! The registry only hands out stable handles; pixel data stays with the
//! external [`AssetProvider`].

use std::fmt;

use bevy_ecs::prelude::Resource;
use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

/// External source of texture regions.
pub trait AssetProvider: Send + Sync {
    fn region(&mut self, atlas: &str, sprite: &str) -> Option<TextureHandle>;
}

/// Headless provider that hands out increasing handles for any region.
#[derive(Debug, Default)]
pub struct SequentialAssets {
    next: u32,
}

impl AssetProvider for SequentialAssets {
    fn region(&mut self, _atlas: &str, _sprite: &str) -> Option<TextureHandle> {
        self.next += 1;
        Some(TextureHandle(self.next))
    }
}

#[derive(Resource)]
pub struct AssetRegistry {
    provider: Box<dyn AssetProvider>,
    regions: FxHashMap<(String, String), TextureHandle>,
}

impl fmt::Debug for AssetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetRegistry")
            .field("regions", &self.regions.len())
            .finish()
    }
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::new(SequentialAssets::default())
    }
}

impl AssetRegistry {
    pub fn new(provider: impl AssetProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            regions: FxHashMap::default(),
        }
    }

    /// Resolve a region, asking the provider only the first time.
    pub fn load_if_absent(&mut self, atlas: &str, sprite: &str) -> SimResult<TextureHandle> {
        let key = (atlas.to_string(), sprite.to_string());
        if let Some(handle) = self.regions.get(&key) {
            return Ok(*handle);
        }
        let handle = self
            .provider
            .region(atlas, sprite)
            .ok_or_else(|| SimError::MissingAsset {
                atlas: atlas.to_string(),
                sprite: sprite.to_string(),
            })?;
        debug!(target: "assets", "loaded {atlas}/{sprite} as {handle:?}");
        self.regions.insert(key, handle);
        Ok(handle)
    }

    pub fn get(&self, atlas: &str, sprite: &str) -> Option<TextureHandle> {
        self.regions
            .get(&(atlas.to_string(), sprite.to_string()))
            .copied()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}
