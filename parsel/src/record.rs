//! Journaux d'activité et comptages d'une parcelle
//!
//! Les exports historiques utilisent plusieurs noms pour un même champ
//! (`miktar` / `hasatKg`, `not` / `gozlem`...). Chaque champ déclare ses
//! alias dans l'ordre de résolution : le premier alias non vide gagne.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::number::flexible_value;
use crate::text::json_text;

/// Champ d'un enregistrement d'activité
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Date,
    Status,
    Quantity,
    Note,
    Substance,
    Crop,
    Workers,
    Hours,
    Oil,
}

impl RecordField {
    /// Noms de clés acceptés, par ordre de priorité
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Date => &["tarih"],
            Self::Status => &["durum"],
            Self::Quantity => &["miktar", "hasatKg"],
            Self::Note => &["not", "gozlem"],
            Self::Substance => &["marka", "ilac", "cins", "cinsi", "gubreCinsi"],
            Self::Crop => &["urun", "tur"],
            Self::Workers => &["isci", "isciSayisi"],
            Self::Hours => &["saat", "calisilanSaat"],
            Self::Oil => &["yag", "cikanYag"],
        }
    }

    /// Première valeur texte non vide parmi les alias
    fn text(self, obj: &Map<String, Value>) -> Option<String> {
        self.aliases().iter().find_map(|key| json_text(obj.get(*key)))
    }

    /// Première valeur numérique présente parmi les alias
    fn number(self, obj: &Map<String, Value>) -> Option<f64> {
        self.aliases().iter().find_map(|key| match obj.get(*key) {
            Some(Value::String(s)) if s.trim().is_empty() => None,
            other => flexible_value(other),
        })
    }
}

/// Un événement journalisé (traitement, fertilisation, récolte)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityRecord {
    pub date: Option<String>,
    /// Texte libre (« Yapıldı », « Beklemede », « Zamanı Geçti »...)
    pub status: Option<String>,
    pub quantity: Option<f64>,
    pub note: Option<String>,
    /// Marque de produit ou type d'engrais
    pub substance: Option<String>,
    pub crop: Option<String>,
    pub workers: Option<f64>,
    pub hours: Option<f64>,
    /// Huile extraite
    pub oil: Option<f64>,
}

impl ActivityRecord {
    /// Construit un enregistrement depuis un objet JSON en résolvant les alias
    pub fn from_json(obj: &Map<String, Value>) -> Self {
        Self {
            date: RecordField::Date.text(obj),
            status: RecordField::Status.text(obj),
            quantity: RecordField::Quantity.number(obj),
            note: RecordField::Note.text(obj),
            substance: RecordField::Substance.text(obj),
            crop: RecordField::Crop.text(obj),
            workers: RecordField::Workers.number(obj),
            hours: RecordField::Hours.number(obj),
            oil: RecordField::Oil.number(obj),
        }
    }
}

/// Catégories de journaux datés
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    Spraying,
    Fertilizing,
    Harvest,
}

impl ActivityKind {
    /// Clé de la catégorie dans `info` / `properties`
    pub const fn key(self) -> &'static str {
        match self {
            Self::Spraying => "ilaclama",
            Self::Fertilizing => "gubre",
            Self::Harvest => "hasat",
        }
    }
}

/// Comptage par espèce, dans l'ordre d'insertion
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpeciesCounts(pub Vec<(String, f64)>);

impl SpeciesCounts {
    fn from_json(value: Option<&Value>) -> Self {
        let Some(Value::Object(obj)) = value else {
            return Self::default();
        };
        Self(
            obj.iter()
                .map(|(species, count)| (species.clone(), flexible_value(Some(count)).unwrap_or(0.0)))
                .collect(),
        )
    }

    /// Somme de toutes les espèces
    pub fn total(&self) -> f64 {
        self.0.iter().map(|(_, n)| n).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(s, n)| (s.as_str(), *n))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Historique agricole d'une parcelle
///
/// Une liste à `None` signifie « catégorie absente » (on retombe alors sur
/// les propriétés) ; `Some(vec![])` signifie « catégorie présente mais vide ».
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParcelInfo {
    pub spraying: Option<Vec<ActivityRecord>>,
    pub fertilizing: Option<Vec<ActivityRecord>>,
    pub harvest: Option<Vec<ActivityRecord>>,
    /// Arbres par espèce (`agac`)
    pub trees: SpeciesCounts,
    /// Jeunes plants par espèce (`fidan`)
    pub saplings: SpeciesCounts,
    /// Statut du recensement (`Durum`)
    pub census_status: Option<String>,
    /// Date du recensement (`sayimTarih`)
    pub census_date: Option<String>,
    /// Description libre (`tanim`)
    pub definition: Option<String>,
}

impl ParcelInfo {
    /// Lit les catégories connues d'un objet JSON
    pub fn from_json(obj: &Map<String, Value>) -> Self {
        Self {
            spraying: activity_list(obj.get(ActivityKind::Spraying.key())),
            fertilizing: activity_list(obj.get(ActivityKind::Fertilizing.key())),
            harvest: activity_list(obj.get(ActivityKind::Harvest.key())),
            trees: SpeciesCounts::from_json(obj.get("agac")),
            saplings: SpeciesCounts::from_json(obj.get("fidan")),
            census_status: json_text(obj.get("Durum")),
            census_date: json_text(obj.get("sayimTarih")),
            definition: json_text(obj.get("tanim")),
        }
    }

    /// Journal d'une catégorie tel que stocké
    pub fn activities(&self, kind: ActivityKind) -> Option<&[ActivityRecord]> {
        match kind {
            ActivityKind::Spraying => self.spraying.as_deref(),
            ActivityKind::Fertilizing => self.fertilizing.as_deref(),
            ActivityKind::Harvest => self.harvest.as_deref(),
        }
    }

    /// Nombre total d'arbres et de jeunes plants
    pub fn tree_total(&self) -> f64 {
        self.trees.total() + self.saplings.total()
    }
}

/// Une catégorie présente mais qui n'est pas un tableau reste « présente et vide »
fn activity_list(value: Option<&Value>) -> Option<Vec<ActivityRecord>> {
    match value? {
        Value::Null => None,
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_object)
                .map(ActivityRecord::from_json)
                .collect(),
        ),
        _ => Some(Vec::new()),
    }
}
