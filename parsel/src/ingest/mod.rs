//! Ingestion d'une source GeoJSON en parcelles canoniques
//!
//! Accepte une FeatureCollection ou un simple tableau de features. Une
//! feature sans contour exploitable est écartée et l'erreur conservée dans
//! [`IngestResult::errors`] ; seule une source illisible est fatale.

pub mod geometry;

pub use encoding_rs::Encoding;

use std::path::Path;

use encoding_rs::UTF_8;
use geojson::feature::Id;
use geojson::Feature;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::ParselError;
use crate::record::ParcelInfo;
use crate::types::{Parcel, ParcelProperties};

/// Résultat d'une ingestion
#[derive(Debug, Default)]
pub struct IngestResult {
    /// Parcelles retenues, dans l'ordre de la source
    pub parcels: Vec<Parcel>,
    /// Nombre de features écartées
    pub dropped: usize,
    /// Erreurs non fatales rencontrées
    pub errors: Vec<ParselError>,
}

/// Lit un fichier GeoJSON
pub fn parse(path: &Path, encoding: Option<&'static Encoding>) -> Result<IngestResult, ParselError> {
    let bytes = std::fs::read(path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "Source read");
    parse_bytes(&bytes, encoding)
}

/// Résout un libellé d'encodage (« utf-8 », « windows-1254 »...)
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding, ParselError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ParselError::UnsupportedEncoding(label.to_string()))
}

/// Décode puis ingère ; un BOM éventuel l'emporte sur l'encodage demandé
pub fn parse_bytes(
    bytes: &[u8],
    encoding: Option<&'static Encoding>,
) -> Result<IngestResult, ParselError> {
    let encoding = encoding.unwrap_or(UTF_8);
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!(encoding = used.name(), "Malformed sequences replaced while decoding");
    }
    parse_str(&text)
}

/// Ingère un document GeoJSON déjà décodé
pub fn parse_str(text: &str) -> Result<IngestResult, ParselError> {
    let document: Value = serde_json::from_str(text)?;
    let features = feature_values(document)?;

    let mut result = IngestResult::default();
    for (idx, value) in features.into_iter().enumerate() {
        match build_parcel(value, idx) {
            Ok(parcel) => result.parcels.push(parcel),
            Err(err) => {
                warn!(index = idx, error = %err, "Feature dropped");
                result.dropped += 1;
                result.errors.push(err);
            }
        }
    }

    info!(
        parcels = result.parcels.len(),
        dropped = result.dropped,
        "Ingestion complete"
    );
    Ok(result)
}

/// Liste des features brutes d'un document
fn feature_values(document: Value) -> Result<Vec<Value>, ParselError> {
    match document {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => match obj.remove("features") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ParselError::invalid_geojson(
                "expected a FeatureCollection or an array of features",
            )),
        },
        _ => Err(ParselError::invalid_geojson(
            "expected a FeatureCollection or an array of features",
        )),
    }
}

/// Construit une parcelle depuis une feature brute
fn build_parcel(mut value: Value, idx: usize) -> Result<Parcel, ParselError> {
    // Les éléments d'un tableau nu n'ont pas toujours de « type »
    if let Value::Object(obj) = &mut value {
        obj.entry("type")
            .or_insert_with(|| Value::String("Feature".to_string()));
        obj.entry("geometry").or_insert(Value::Null);
        obj.entry("properties").or_insert(Value::Null);

        // Un id null ou d'un autre type équivaut à un id absent
        if obj
            .get("id")
            .is_some_and(|id| !(id.is_string() || id.is_number()))
        {
            obj.remove("id");
        }
        if let Some(geom) = obj.get_mut("geometry") {
            geometry::retain_valid_positions(geom);
        }
    }
    let feature = Feature::from_json_value(value)
        .map_err(|e| ParselError::invalid_geojson(format!("feature {}: {}", idx, e)))?;

    let empty = Map::new();
    let props = feature.properties.as_ref().unwrap_or(&empty);
    let id = feature_id(feature.id.as_ref(), props, idx);

    let geom = feature
        .geometry
        .as_ref()
        .ok_or_else(|| ParselError::invalid_geometry(id.as_str(), "missing geometry"))?;
    let ring = geometry::exterior_ring(&geom.value).ok_or_else(|| {
        ParselError::invalid_geometry(
            id.as_str(),
            format!("unsupported geometry {}", geometry::type_name(&geom.value)),
        )
    })?;
    if ring.0.is_empty() {
        return Err(ParselError::invalid_geometry(id.as_str(), "empty ring"));
    }

    // `info` au niveau de la feature, sinon dans les propriétés
    let info = feature
        .foreign_members
        .as_ref()
        .and_then(|fm| fm.get("info"))
        .or_else(|| props.get("info"))
        .and_then(Value::as_object)
        .map(ParcelInfo::from_json)
        .unwrap_or_default();

    let mut parcel = Parcel::new(id, ring);
    parcel.properties = ParcelProperties::from_json(props);
    parcel.info = info;
    Ok(parcel)
}

/// Identifiant de la feature, sinon « îlot_parcelle_quartier_rang »
fn feature_id(id: Option<&Id>, props: &Map<String, Value>, idx: usize) -> String {
    match id {
        Some(Id::String(s)) => s.clone(),
        Some(Id::Number(n)) => n.to_string(),
        None => {
            let part = |key: &str| {
                crate::text::json_text(props.get(key)).unwrap_or_default()
            };
            format!("{}_{}_{}_{}", part("adaNo"), part("parselNo"), part("mahalleAd"), idx)
        }
    }
}
