//! Réglages du moteur
//!
//! Toutes les constantes (région par défaut, marges, zoom maximal, emprise
//! moyenne d'un arbre, durée du signal de réinitialisation) sont regroupées
//! ici. Chaque champ a une valeur par défaut, un fichier JSON partiel suffit.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{LatLng, Mode};
use crate::ParselError;

/// Emprise moyenne d'un arbre ou d'un plant (m²)
pub const DEFAULT_TREE_FOOTPRINT_M2: f64 = 36.0;

/// Zoom maximal servi par le fond de carte
pub const MAX_MAP_ZOOM: u8 = 21;

/// Marge autour d'une emprise, en pixels écran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Padding {
    /// Marge gauche et droite
    pub x: u32,
    /// Marge haute et basse
    pub y: u32,
}

impl Default for Padding {
    fn default() -> Self {
        Self { x: 100, y: 50 }
    }
}

/// Réglages du cadrage de la carte
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusSettings {
    pub default_center: LatLng,
    pub default_zoom: u8,
    pub padding: Padding,
    pub max_zoom: u8,
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            default_center: LatLng::new(38.26984, 27.3991),
            default_zoom: 16,
            padding: Padding::default(),
            max_zoom: 17,
        }
    }
}

/// Réglages complets du moteur
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub default_mode: Mode,
    pub tree_footprint_m2: f64,
    pub reset_window_ms: u64,
    pub focus: FocusSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_mode: Mode::default(),
            tree_footprint_m2: DEFAULT_TREE_FOOTPRINT_M2,
            reset_window_ms: 500,
            focus: FocusSettings::default(),
        }
    }
}

impl EngineSettings {
    /// Durée pendant laquelle le signal de réinitialisation reste actif
    pub fn reset_window(&self) -> Duration {
        Duration::from_millis(self.reset_window_ms)
    }

    /// Vérifie la cohérence des réglages
    pub fn validate(&self) -> Result<(), ParselError> {
        if !(self.tree_footprint_m2.is_finite() && self.tree_footprint_m2 > 0.0) {
            return Err(ParselError::InvalidSettings(format!(
                "tree_footprint_m2 must be positive, got {}",
                self.tree_footprint_m2
            )));
        }
        if self.reset_window_ms == 0 {
            return Err(ParselError::InvalidSettings(
                "reset_window_ms must be greater than 0".to_string(),
            ));
        }
        let center = self.focus.default_center;
        if !(-90.0..=90.0).contains(&center.lat) || !(-180.0..=180.0).contains(&center.lng) {
            return Err(ParselError::InvalidSettings(format!(
                "default_center out of range: {}, {}",
                center.lat, center.lng
            )));
        }
        if self.focus.max_zoom > MAX_MAP_ZOOM || self.focus.default_zoom > MAX_MAP_ZOOM {
            return Err(ParselError::InvalidSettings(format!(
                "zoom levels must be <= {}",
                MAX_MAP_ZOOM
            )));
        }
        Ok(())
    }
}
