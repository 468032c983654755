//! Types de données pour le crate parsel

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use geo::{BoundingRect, Coord, LineString, Rect};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::number::flexible_value;
use crate::record::{ActivityKind, ActivityRecord, ParcelInfo};
use crate::text::{json_text, or_placeholder};
use crate::ParselError;

/// Identifiant stable d'une parcelle
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParcelId(pub String);

impl ParcelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParcelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParcelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ParcelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Mode de visualisation actif
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// İlaçlama
    #[default]
    #[serde(rename = "ilac", alias = "spraying")]
    Spraying,
    /// Hasat
    #[serde(rename = "hasat", alias = "harvest")]
    Harvest,
    /// Sayım
    #[serde(rename = "sayim", alias = "census")]
    Census,
    /// Gübreleme
    #[serde(rename = "gubre", alias = "fertilizing")]
    Fertilizing,
    /// Analyse de surface (densité, capacité, occupation)
    #[serde(rename = "analiz", alias = "analysis")]
    Analysis,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Spraying,
        Mode::Harvest,
        Mode::Census,
        Mode::Fertilizing,
        Mode::Analysis,
    ];

    /// Clé courte du mode
    pub const fn key(self) -> &'static str {
        match self {
            Self::Spraying => "ilac",
            Self::Harvest => "hasat",
            Self::Census => "sayim",
            Self::Fertilizing => "gubre",
            Self::Analysis => "analiz",
        }
    }

    /// Libellé affiché
    pub const fn label(self) -> &'static str {
        match self {
            Self::Spraying => "İlaçlama Bilgisi",
            Self::Harvest => "Hasat Haritası",
            Self::Census => "Sayım Bilgisi",
            Self::Fertilizing => "Gübreleme",
            Self::Analysis => "Alan Analizi",
        }
    }

    /// Couleur de contour des parcelles non sélectionnées
    pub const fn stroke_color(self) -> &'static str {
        match self {
            Self::Spraying => "#3b82f6",
            Self::Harvest => "#f59e0b",
            Self::Census => "#8b5cf6",
            Self::Fertilizing => "#10b981",
            Self::Analysis => "#0ea5e9",
        }
    }

    /// Journal daté associé au mode
    pub const fn activity_kind(self) -> Option<ActivityKind> {
        match self {
            Self::Spraying => Some(ActivityKind::Spraying),
            Self::Fertilizing => Some(ActivityKind::Fertilizing),
            Self::Harvest => Some(ActivityKind::Harvest),
            Self::Census | Self::Analysis => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Mode {
    type Err = ParselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ilac" | "ilaclama" | "spraying" => Ok(Mode::Spraying),
            "hasat" | "harvest" => Ok(Mode::Harvest),
            "sayim" | "census" => Ok(Mode::Census),
            "gubre" | "fertilizing" => Ok(Mode::Fertilizing),
            "analiz" | "analysis" => Ok(Mode::Analysis),
            _ => Err(ParselError::UnknownMode(s.to_string())),
        }
    }
}

/// Point géographique (degrés WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<Coord> for LatLng {
    fn from(c: Coord) -> Self {
        Self { lat: c.y, lng: c.x }
    }
}

impl From<LatLng> for Coord {
    fn from(p: LatLng) -> Self {
        Coord { x: p.lng, y: p.lat }
    }
}

/// Attributs descriptifs d'une parcelle
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParcelProperties {
    /// Numéro d'îlot (`adaNo`)
    pub block: Option<String>,
    /// Numéro de parcelle (`parselNo`)
    pub parcel_no: Option<String>,
    /// Quartier (`mahalleAd`)
    pub neighborhood: Option<String>,
    /// District (`ilceAd`)
    pub district: Option<String>,
    /// Lieu-dit (`mevkii`)
    pub locality: Option<String>,
    /// Feuille cadastrale (`pafta`)
    pub sheet: Option<String>,
    /// Nature du terrain (`nitelik`)
    pub land_use: Option<String>,
    /// Description (`tanim`)
    pub definition: Option<String>,
    /// Surface brute en m² (`alan`)
    pub area_m2: Option<f64>,
    /// Journaux hérités embarqués dans les propriétés
    pub records: ParcelInfo,
    /// Autres attributs scalaires
    pub extra: BTreeMap<String, String>,
}

const KNOWN_PROPERTIES: &[&str] = &[
    "adaNo", "ada", "parselNo", "parsel", "mahalleAd", "mahalle", "ilceAd", "mevkii", "pafta",
    "nitelik", "tanim", "alan", "info", "ilaclama", "gubre", "hasat", "sayimTarih",
];

impl ParcelProperties {
    /// Lit les propriétés d'une feature
    pub fn from_json(obj: &Map<String, Value>) -> Self {
        let first = |keys: &[&str]| keys.iter().find_map(|k| json_text(obj.get(*k)));

        let extra = obj
            .iter()
            .filter(|(k, _)| !KNOWN_PROPERTIES.contains(&k.as_str()))
            .filter_map(|(k, v)| json_text(Some(v)).map(|text| (k.clone(), text)))
            .collect();

        Self {
            block: first(&["adaNo", "ada"]),
            parcel_no: first(&["parselNo", "parsel"]),
            neighborhood: first(&["mahalleAd", "mahalle"]),
            district: first(&["ilceAd"]),
            locality: first(&["mevkii"]),
            sheet: first(&["pafta"]),
            land_use: first(&["nitelik"]),
            definition: first(&["tanim"]),
            area_m2: flexible_value(obj.get("alan")),
            records: ParcelInfo::from_json(obj),
            extra,
        }
    }

    pub fn block_display(&self) -> &str {
        or_placeholder(self.block.as_deref())
    }

    pub fn parcel_no_display(&self) -> &str {
        or_placeholder(self.parcel_no.as_deref())
    }

    pub fn neighborhood_display(&self) -> &str {
        or_placeholder(self.neighborhood.as_deref())
    }
}

/// Une parcelle cadastrale avec sa géométrie et son historique agricole
#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    pub id: ParcelId,
    /// Contour (x = longitude, y = latitude)
    pub ring: LineString<f64>,
    pub properties: ParcelProperties,
    pub info: ParcelInfo,
}

impl Parcel {
    pub fn new(id: impl Into<ParcelId>, ring: LineString<f64>) -> Self {
        Self {
            id: id.into(),
            ring,
            properties: ParcelProperties::default(),
            info: ParcelInfo::default(),
        }
    }

    /// Journal d'une catégorie : `info` d'abord, puis les propriétés
    pub fn activities(&self, kind: ActivityKind) -> &[ActivityRecord] {
        self.info
            .activities(kind)
            .or_else(|| self.properties.records.activities(kind))
            .unwrap_or(&[])
    }

    /// Date du recensement : `info` d'abord, puis les propriétés
    pub fn census_date(&self) -> Option<&str> {
        self.info
            .census_date
            .as_deref()
            .or(self.properties.records.census_date.as_deref())
    }

    /// Description : `info` d'abord, puis les propriétés
    pub fn definition(&self) -> Option<&str> {
        self.info
            .definition
            .as_deref()
            .or(self.properties.definition.as_deref())
    }

    /// Surface en m² (0 si inconnue)
    pub fn area_m2(&self) -> f64 {
        self.properties.area_m2.unwrap_or(0.0)
    }

    /// Nombre d'arbres et de jeunes plants
    pub fn tree_total(&self) -> f64 {
        self.info.tree_total()
    }

    pub fn has_ring(&self) -> bool {
        !self.ring.0.is_empty()
    }

    /// Emprise du contour, `None` si le contour est vide
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.ring.bounding_rect()
    }

    /// Libellé court « quartier îlot/parcelle »
    pub fn label(&self) -> String {
        format!(
            "{} {}/{}",
            self.properties.neighborhood_display(),
            self.properties.block_display(),
            self.properties.parcel_no_display()
        )
    }
}
