//! Configuration de l'hôte

use std::path::Path;

use anyhow::{Context, Result};
use parsel::ingest::{encoding_for_label, Encoding};
use parsel::EngineSettings;
use serde::{Deserialize, Serialize};

/// Noms des presets embarqués
pub const PRESETS: &[&str] = &["default", "tablet"];

/// Configuration principale
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Réglages du moteur (cadrage, emprise d'un arbre, fenêtre de réinitialisation)
    pub engine: EngineSettings,

    /// Taille de la carte, pour estimer le zoom d'un cadrage
    pub viewport: Viewport,

    /// Encodage de la source (défaut : UTF-8)
    pub encoding: Option<String>,
}

/// Taille de la fenêtre carte en pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_json::from_str(&content).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "default" => Self::load_embedded(include_str!("presets/default.json")),
            "tablet" => Self::load_embedded(include_str!("presets/tablet.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: {}", preset, PRESETS.join(", ")),
        }
    }

    /// Preset embarqué ou chemin vers un fichier JSON
    pub fn resolve(name: &str) -> Result<Self> {
        if PRESETS.contains(&name) {
            Self::from_preset(name)
        } else {
            Self::load(Path::new(name))
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse embedded config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.engine.validate().context("Invalid engine settings")?;
        if self.viewport.width == 0 || self.viewport.height == 0 {
            anyhow::bail!("Viewport must be at least 1x1 pixel");
        }
        Ok(())
    }

    /// Encodage de la source ; `override_label` l'emporte sur la configuration
    pub fn source_encoding(&self, override_label: Option<&str>) -> Result<Option<&'static Encoding>> {
        override_label
            .or(self.encoding.as_deref())
            .map(encoding_for_label)
            .transpose()
            .context("Invalid source encoding")
    }
}
