//! Static hero catalog
//!
//! Loaded once at startup from a JSON array and never mutated afterwards.

use crate::error::{BotError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info};

/// One playable character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub name: String,
    pub class: String,
    /// Free-form role line; class grouping matches against this field
    pub role: String,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub details_link: String,
}

/// Immutable, ordered set of heroes
#[derive(Debug, Clone, Default)]
pub struct HeroCatalog {
    heroes: Vec<Hero>,
}

impl HeroCatalog {
    pub fn new(heroes: Vec<Hero>) -> Self {
        Self { heroes }
    }

    /// Parse a catalog from JSON text
    pub fn from_json(source: &str) -> Result<Self> {
        let heroes: Vec<Hero> = serde_json::from_str(source)?;
        Ok(Self::new(heroes))
    }

    /// Load a catalog from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| BotError::DataLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&source).map_err(|e| BotError::DataLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Load a catalog, degrading to an empty one when the file is missing or malformed
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(catalog) => {
                info!(
                    path = %path.as_ref().display(),
                    count = catalog.len(),
                    "Loaded hero catalog"
                );
                catalog
            }
            Err(e) => {
                error!(error = %e, "Failed to load hero catalog, continuing with no heroes");
                Self::default()
            }
        }
    }

    /// Heroes whose role contains `class`, case-insensitively, in load order
    pub fn by_class(&self, class: &str) -> Vec<&Hero> {
        let needle = class.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.heroes
            .iter()
            .filter(|hero| hero.role.to_lowercase().contains(&needle))
            .collect()
    }

    /// Exact name lookup
    pub fn by_name(&self, name: &str) -> Option<&Hero> {
        self.heroes.iter().find(|hero| hero.name == name)
    }

    /// Heroes whose name contains `query`, case-insensitively, in load order
    pub fn search(&self, query: &str) -> Vec<&Hero> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.heroes
            .iter()
            .filter(|hero| hero.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn heroes(&self) -> &[Hero] {
        &self.heroes
    }

    pub fn len(&self) -> usize {
        self.heroes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn sample_catalog() -> HeroCatalog {
    fn hero(name: &str, class: &str, role: &str) -> Hero {
        Hero {
            name: name.to_string(),
            class: class.to_string(),
            role: role.to_string(),
            hp: 1000,
            attack: 100,
            defense: 50,
            details_link: format!(
                "https://heroes.example/{}",
                name.to_lowercase().replace(' ', "-")
            ),
        }
    }

    HeroCatalog::new(vec![
        hero("Aldric", "Warrior", "Frontline Warrior"),
        hero("Dragon Knight", "Warrior", "Warrior / Tank"),
        hero("Lyra", "Mage", "Burst Mage"),
        hero("Sylva", "Ranger", "Ranger, sustained DPS"),
        hero("Seren", "Healer", "Support Healer"),
    ])
}
