//! Types d'erreurs pour le crate parsel

use thiserror::Error;

/// Erreurs pouvant survenir lors de l'ingestion ou de la configuration
///
/// Le moteur lui-même (statut, sélection, agrégation, focus) ne produit
/// jamais d'erreur : les données manquantes sont absorbées en placeholders.
#[derive(Debug, Error)]
pub enum ParselError {
    /// Erreur d'I/O lors de la lecture de la source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document GeoJSON invalide ou de forme inattendue
    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),

    /// Encodage non supporté
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Géométrie invalide (parcelle ignorée)
    #[error("Invalid geometry for {parcel_id}: {reason}")]
    InvalidGeometry { parcel_id: String, reason: String },

    /// Mode de visualisation inconnu
    #[error("Unknown mode: {0}. Use: ilac, hasat, sayim, gubre, analiz")]
    UnknownMode(String),

    /// Réglages incohérents
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl ParselError {
    /// Crée une erreur de géométrie invalide
    pub fn invalid_geometry(parcel_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            parcel_id: parcel_id.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de GeoJSON invalide
    pub fn invalid_geojson(reason: impl Into<String>) -> Self {
        Self::InvalidGeoJson(reason.into())
    }
}

impl From<serde_json::Error> for ParselError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidGeoJson(err.to_string())
    }
}

impl From<geojson::Error> for ParselError {
    fn from(err: geojson::Error) -> Self {
        Self::InvalidGeoJson(err.to_string())
    }
}
