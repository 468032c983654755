//! Agrégation des enregistrements d'une sélection en une ligne de résumé
//!
//! Règles communes à tous les modes :
//! - textes : valeurs non vides, dédoublonnées dans l'ordre d'apparition, jointes par ` / `
//! - nombres : sommés, une valeur absente compte pour 0, un total nul s'affiche `-`
//! - dates : triées par valeur calendaire, affichées en intervalle `début – fin`
//!
//! Le recensement retient l'espèce dominante (arbres + plants) ; l'analyse
//! expose les indicateurs de surface de [`metrics`].

pub mod header;
pub mod metrics;

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::trace;

use crate::date::{date_span, DateSpan};
use crate::record::ActivityKind;
use crate::settings::DEFAULT_TREE_FOOTPRINT_M2;
use crate::text::{join_text, turkish_uppercase, PLACEHOLDER};
use crate::types::{Mode, Parcel};

pub use header::SelectionHeader;
pub use metrics::AreaMetrics;

/// Colonne d'un résumé
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Substance,
    Quantity,
    Note,
    Date,
    Status,
    Crop,
    HarvestedKg,
    Workers,
    Hours,
    ExtractedOil,
    Yield,
    Species,
    Trees,
    Saplings,
    Total,
    Area,
    TreeTotal,
    TreesPerDonum,
    PlantableCapacity,
    Occupancy,
}

const TREATMENT_COLUMNS: &[Column] = &[
    Column::Substance,
    Column::Quantity,
    Column::Note,
    Column::Date,
    Column::Status,
];

const HARVEST_COLUMNS: &[Column] = &[
    Column::Crop,
    Column::HarvestedKg,
    Column::Note,
    Column::Date,
    Column::Workers,
    Column::Hours,
    Column::ExtractedOil,
    Column::Yield,
];

const CENSUS_COLUMNS: &[Column] = &[
    Column::Species,
    Column::Trees,
    Column::Saplings,
    Column::Total,
    Column::Date,
];

const ANALYSIS_COLUMNS: &[Column] = &[
    Column::Area,
    Column::TreeTotal,
    Column::TreesPerDonum,
    Column::PlantableCapacity,
    Column::Occupancy,
];

impl Column {
    /// Colonnes d'un mode, dans l'ordre d'affichage
    pub fn for_mode(mode: Mode) -> &'static [Column] {
        match mode {
            Mode::Spraying | Mode::Fertilizing => TREATMENT_COLUMNS,
            Mode::Harvest => HARVEST_COLUMNS,
            Mode::Census => CENSUS_COLUMNS,
            Mode::Analysis => ANALYSIS_COLUMNS,
        }
    }

    /// Libellé affiché (dépend du mode pour les colonnes partagées)
    pub fn label(self, mode: Mode) -> &'static str {
        match self {
            Self::Substance if mode == Mode::Fertilizing => "Gübre Cinsi",
            Self::Substance => "İlaç Marka",
            Self::Quantity => "Miktar",
            Self::Note if mode == Mode::Spraying => "Gözlem / Not",
            Self::Note => "Gözlem/Not",
            Self::Date => "Tarih",
            Self::Status => "Durum (Yapıldı, Beklemede, Zamanı Geçti)",
            Self::Crop | Self::Species => "Tür",
            Self::HarvestedKg => "Hasat (kg)",
            Self::Workers => "İşçi Sayısı",
            Self::Hours => "Çalışılan Saat",
            Self::ExtractedOil => "Çıkan Yağ",
            Self::Yield => "Verim",
            Self::Trees => "Ağaç",
            Self::Saplings => "Fidan",
            Self::Total => "Toplam",
            Self::Area => "Alan (dönüm)",
            Self::TreeTotal => "Ağaç + Fidan",
            Self::TreesPerDonum => "Ağaç / Dönüm",
            Self::PlantableCapacity => "Dikilebilir Fidan",
            Self::Occupancy => "Doluluk",
        }
    }
}

/// Valeur d'une cellule de résumé
///
/// Le formatage localisé reste à la charge de la présentation ; `Display`
/// fournit un rendu neutre (entiers arrondis, deux décimales au plus).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SummaryValue {
    Missing,
    Text(String),
    /// Nombre affiché sans décimale
    Count(f64),
    /// Nombre affiché avec deux décimales au plus
    Amount(f64),
    Percent(f64),
    Dates(DateSpan),
}

impl SummaryValue {
    fn text(value: Option<String>) -> Self {
        value.map_or(Self::Missing, Self::Text)
    }

    /// Total nul ou absent → placeholder
    fn count(total: f64) -> Self {
        if total != 0.0 {
            Self::Count(total)
        } else {
            Self::Missing
        }
    }

    fn amount(total: f64) -> Self {
        if total != 0.0 {
            Self::Amount(total)
        } else {
            Self::Missing
        }
    }

    fn dates(span: Option<DateSpan>) -> Self {
        span.map_or(Self::Missing, Self::Dates)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Valeur numérique, si la cellule en porte une
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Count(v) | Self::Amount(v) | Self::Percent(v) => Some(*v),
            _ => None,
        }
    }
}

/// Deux décimales au plus, sans zéros superflus
fn format_amount(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

impl fmt::Display for SummaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str(PLACEHOLDER),
            Self::Text(s) => f.write_str(s),
            Self::Count(v) => write!(f, "{:.0}", v.round()),
            Self::Amount(v) => f.write_str(&format_amount(*v)),
            Self::Percent(v) => write!(f, "{}%", format_amount(*v)),
            Self::Dates(span) => fmt::Display::fmt(span, f),
        }
    }
}

/// Une cellule du résumé
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCell {
    pub column: Column,
    pub label: &'static str,
    pub value: SummaryValue,
}

/// Ligne de résumé d'une sélection pour un mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedSummary {
    pub mode: Mode,
    pub title: &'static str,
    pub cells: Vec<SummaryCell>,
}

impl AggregatedSummary {
    fn new(mode: Mode, values: Vec<(Column, SummaryValue)>) -> Self {
        debug_assert_eq!(
            values.iter().map(|(c, _)| *c).collect::<Vec<_>>(),
            Column::for_mode(mode)
        );
        Self {
            mode,
            title: mode.label(),
            cells: values
                .into_iter()
                .map(|(column, value)| SummaryCell {
                    column,
                    label: column.label(mode),
                    value,
                })
                .collect(),
        }
    }

    /// Valeur d'une colonne
    pub fn get(&self, column: Column) -> Option<&SummaryValue> {
        self.cells.iter().find(|c| c.column == column).map(|c| &c.value)
    }
}

/// Résume une sélection avec l'emprise moyenne par défaut
pub fn summarize(parcels: &[&Parcel], mode: Mode) -> AggregatedSummary {
    summarize_with(parcels, mode, DEFAULT_TREE_FOOTPRINT_M2)
}

/// Résume une sélection
pub fn summarize_with(parcels: &[&Parcel], mode: Mode, footprint_m2: f64) -> AggregatedSummary {
    trace!(mode = %mode, parcels = parcels.len(), "Summarizing selection");

    let values = match mode {
        Mode::Spraying => summarize_treatments(parcels, ActivityKind::Spraying),
        Mode::Fertilizing => summarize_treatments(parcels, ActivityKind::Fertilizing),
        Mode::Harvest => summarize_harvest(parcels),
        Mode::Census => summarize_census(parcels),
        Mode::Analysis => summarize_analysis(parcels, footprint_m2),
    };

    AggregatedSummary::new(mode, values)
}

/// İlaçlama et gübreleme
fn summarize_treatments(parcels: &[&Parcel], kind: ActivityKind) -> Vec<(Column, SummaryValue)> {
    let records: Vec<_> = parcels.iter().flat_map(|p| p.activities(kind)).collect();
    let quantity: f64 = records.iter().map(|r| r.quantity.unwrap_or(0.0)).sum();

    vec![
        (
            Column::Substance,
            SummaryValue::text(join_text(records.iter().map(|r| r.substance.as_deref()))),
        ),
        (Column::Quantity, SummaryValue::amount(quantity)),
        (
            Column::Note,
            SummaryValue::text(join_text(records.iter().map(|r| r.note.as_deref()))),
        ),
        (
            Column::Date,
            SummaryValue::dates(date_span(records.iter().map(|r| r.date.as_deref()))),
        ),
        (
            Column::Status,
            SummaryValue::text(join_text(records.iter().map(|r| r.status.as_deref()))),
        ),
    ]
}

fn summarize_harvest(parcels: &[&Parcel]) -> Vec<(Column, SummaryValue)> {
    let records: Vec<_> = parcels
        .iter()
        .flat_map(|p| p.activities(ActivityKind::Harvest))
        .collect();

    let sum = |f: fn(&crate::record::ActivityRecord) -> Option<f64>| -> f64 {
        records.iter().map(|r| f(r).unwrap_or(0.0)).sum()
    };
    let harvested_kg = sum(|r| r.quantity);
    let workers = sum(|r| r.workers);
    let hours = sum(|r| r.hours);
    let oil = sum(|r| r.oil);

    let yield_pct = if harvested_kg > 0.0 {
        SummaryValue::Percent(oil / harvested_kg * 100.0)
    } else {
        SummaryValue::Missing
    };

    vec![
        (
            Column::Crop,
            SummaryValue::text(join_text(records.iter().map(|r| r.crop.as_deref()))),
        ),
        (Column::HarvestedKg, SummaryValue::count(harvested_kg)),
        (
            Column::Note,
            SummaryValue::text(join_text(records.iter().map(|r| r.note.as_deref()))),
        ),
        (
            Column::Date,
            SummaryValue::dates(date_span(records.iter().map(|r| r.date.as_deref()))),
        ),
        (Column::Workers, SummaryValue::count(workers)),
        (Column::Hours, SummaryValue::amount(hours)),
        (Column::ExtractedOil, SummaryValue::count(oil)),
        (Column::Yield, yield_pct),
    ]
}

/// Comptage d'une espèce sur la sélection
#[derive(Debug, Clone, PartialEq)]
struct SpeciesTally {
    species: String,
    trees: f64,
    saplings: f64,
}

impl SpeciesTally {
    fn total(&self) -> f64 {
        self.trees + self.saplings
    }
}

fn summarize_census(parcels: &[&Parcel]) -> Vec<(Column, SummaryValue)> {
    let mut tallies: Vec<SpeciesTally> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut slot = |species: &str, tallies: &mut Vec<SpeciesTally>| -> usize {
        *index.entry(species.to_string()).or_insert_with(|| {
            tallies.push(SpeciesTally {
                species: species.to_string(),
                trees: 0.0,
                saplings: 0.0,
            });
            tallies.len() - 1
        })
    };

    for parcel in parcels {
        for (species, n) in parcel.info.trees.iter() {
            let i = slot(species, &mut tallies);
            tallies[i].trees += n;
        }
        for (species, n) in parcel.info.saplings.iter() {
            let i = slot(species, &mut tallies);
            tallies[i].saplings += n;
        }
    }

    // Égalité : la première espèce rencontrée reste
    let best = tallies.iter().fold(None::<&SpeciesTally>, |best, t| match best {
        Some(b) if t.total() <= b.total() => Some(b),
        _ => Some(t),
    });

    let dates = SummaryValue::dates(date_span(parcels.iter().map(|p| p.census_date())));

    match best {
        Some(b) => vec![
            (Column::Species, SummaryValue::Text(turkish_uppercase(&b.species))),
            (Column::Trees, SummaryValue::Count(b.trees)),
            (Column::Saplings, SummaryValue::Count(b.saplings)),
            (Column::Total, SummaryValue::Count(b.total())),
            (Column::Date, dates),
        ],
        None => vec![
            (Column::Species, SummaryValue::Missing),
            (Column::Trees, SummaryValue::Missing),
            (Column::Saplings, SummaryValue::Missing),
            (Column::Total, SummaryValue::Missing),
            (Column::Date, dates),
        ],
    }
}

fn summarize_analysis(parcels: &[&Parcel], footprint_m2: f64) -> Vec<(Column, SummaryValue)> {
    let m = AreaMetrics::for_selection(parcels, footprint_m2);

    vec![
        (Column::Area, SummaryValue::amount(m.donum)),
        (Column::TreeTotal, SummaryValue::count(m.trees)),
        (Column::TreesPerDonum, SummaryValue::Amount(m.trees_per_donum)),
        (
            Column::PlantableCapacity,
            SummaryValue::Count(m.plantable_capacity as f64),
        ),
        (Column::Occupancy, SummaryValue::Percent(m.occupancy_pct)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ActivityRecord, ParcelInfo, SpeciesCounts};
    use geo::LineString;
    use proptest::prelude::*;

    fn parcel(id: &str, info: ParcelInfo) -> Parcel {
        let mut p = Parcel::new(id, LineString::from(vec![(27.0, 38.0)]));
        p.info = info;
        p
    }

    fn spray(date: &str, brand: &str, qty: Option<f64>, status: &str) -> ActivityRecord {
        ActivityRecord {
            date: Some(date.to_string()),
            substance: Some(brand.to_string()),
            quantity: qty,
            status: Some(status.to_string()),
            ..Default::default()
        }
    }

    fn species(pairs: &[(&str, f64)]) -> SpeciesCounts {
        SpeciesCounts(pairs.iter().map(|(s, n)| (s.to_string(), *n)).collect())
    }

    #[test]
    fn test_spraying_summary() {
        let a = parcel(
            "a",
            ParcelInfo {
                spraying: Some(vec![
                    spray("2024-05-01", "Bakırlı", Some(2.5), "Yapıldı"),
                    spray("2024-03-01", "Kükürt", None, "Beklemede"),
                ]),
                ..Default::default()
            },
        );
        let b = parcel(
            "b",
            ParcelInfo {
                spraying: Some(vec![spray("2024-04-10", " Bakırlı ", Some(1.5), "Yapıldı")]),
                ..Default::default()
            },
        );

        let summary = summarize(&[&a, &b], Mode::Spraying);
        assert_eq!(summary.title, "İlaçlama Bilgisi");
        assert_eq!(summary.cells.len(), 5);
        assert_eq!(
            summary.get(Column::Substance),
            Some(&SummaryValue::Text("Bakırlı / Kükürt".to_string()))
        );
        assert_eq!(summary.get(Column::Quantity), Some(&SummaryValue::Amount(4.0)));
        assert_eq!(summary.get(Column::Note), Some(&SummaryValue::Missing));
        assert_eq!(
            summary.get(Column::Date).unwrap().to_string(),
            "2024-03-01 – 2024-05-01"
        );
        assert_eq!(
            summary.get(Column::Status).unwrap().to_string(),
            "Yapıldı / Beklemede"
        );
    }

    #[test]
    fn test_zero_quantity_renders_placeholder() {
        let a = parcel(
            "a",
            ParcelInfo {
                fertilizing: Some(vec![spray("2024-01-01", "NPK", Some(0.0), "Yapıldı")]),
                ..Default::default()
            },
        );
        let summary = summarize(&[&a], Mode::Fertilizing);
        assert_eq!(summary.get(Column::Quantity).unwrap().to_string(), "-");
        assert_eq!(summary.cells[0].label, "Gübre Cinsi");
    }

    #[test]
    fn test_harvest_yield() {
        let record = |kg: f64, oil: f64| ActivityRecord {
            quantity: Some(kg),
            oil: Some(oil),
            workers: Some(3.0),
            hours: Some(7.5),
            crop: Some("Zeytin".to_string()),
            ..Default::default()
        };
        let a = parcel(
            "a",
            ParcelInfo {
                harvest: Some(vec![record(1000.0, 150.0), record(1000.0, 250.0)]),
                ..Default::default()
            },
        );

        let summary = summarize(&[&a], Mode::Harvest);
        assert_eq!(summary.get(Column::HarvestedKg), Some(&SummaryValue::Count(2000.0)));
        let yield_pct = summary.get(Column::Yield).and_then(SummaryValue::as_number).unwrap();
        assert!((yield_pct - 20.0).abs() < 1e-9);
        assert_eq!(summary.get(Column::Yield).unwrap().to_string(), "20%");
        assert_eq!(summary.get(Column::Hours).unwrap().to_string(), "15");
        assert_eq!(summary.get(Column::Crop).unwrap().to_string(), "Zeytin");
    }

    #[test]
    fn test_harvest_without_weight_has_no_yield() {
        let a = parcel(
            "a",
            ParcelInfo {
                harvest: Some(vec![ActivityRecord {
                    oil: Some(40.0),
                    ..Default::default()
                }]),
                ..Default::default()
            },
        );
        let summary = summarize(&[&a], Mode::Harvest);
        assert_eq!(summary.get(Column::Yield), Some(&SummaryValue::Missing));
        assert_eq!(summary.get(Column::ExtractedOil), Some(&SummaryValue::Count(40.0)));
    }

    #[test]
    fn test_census_dominant_species() {
        let a = parcel(
            "a",
            ParcelInfo {
                trees: species(&[("zeytin", 40.0), ("incir", 10.0)]),
                saplings: species(&[("incir", 35.0)]),
                census_date: Some("2024-02-01".to_string()),
                ..Default::default()
            },
        );
        let b = parcel(
            "b",
            ParcelInfo {
                trees: species(&[("zeytin", 4.0)]),
                census_date: Some("2023-11-20".to_string()),
                ..Default::default()
            },
        );

        let summary = summarize(&[&a, &b], Mode::Census);
        assert_eq!(summary.get(Column::Species).unwrap().to_string(), "İNCİR");
        assert_eq!(summary.get(Column::Trees), Some(&SummaryValue::Count(10.0)));
        assert_eq!(summary.get(Column::Saplings), Some(&SummaryValue::Count(35.0)));
        assert_eq!(summary.get(Column::Total), Some(&SummaryValue::Count(45.0)));
        assert_eq!(
            summary.get(Column::Date).unwrap().to_string(),
            "2023-11-20 – 2024-02-01"
        );
    }

    #[test]
    fn test_census_tie_keeps_first_inserted() {
        let a = parcel(
            "a",
            ParcelInfo {
                trees: species(&[("badem", 10.0), ("zeytin", 10.0)]),
                ..Default::default()
            },
        );
        let summary = summarize(&[&a], Mode::Census);
        assert_eq!(summary.get(Column::Species).unwrap().to_string(), "BADEM");
    }

    #[test]
    fn test_census_empty() {
        let summary = summarize(&[], Mode::Census);
        assert!(summary.cells.iter().all(|c| c.value.is_missing()));
    }

    #[test]
    fn test_analysis_summary() {
        let mut a = parcel(
            "a",
            ParcelInfo {
                trees: species(&[("zeytin", 100.0)]),
                ..Default::default()
            },
        );
        a.properties.area_m2 = Some(10_000.0);

        let summary = summarize(&[&a], Mode::Analysis);
        assert_eq!(summary.get(Column::Area), Some(&SummaryValue::Amount(10.0)));
        assert_eq!(summary.get(Column::PlantableCapacity), Some(&SummaryValue::Count(177.0)));
        assert_eq!(summary.get(Column::Occupancy).unwrap().to_string(), "36%");
    }

    #[test]
    fn test_columns_match_mode() {
        for mode in Mode::ALL {
            let summary = summarize(&[], mode);
            let columns: Vec<Column> = summary.cells.iter().map(|c| c.column).collect();
            assert_eq!(columns, Column::for_mode(mode));
        }
    }

    #[test]
    fn test_display_formats() {
        assert_eq!(SummaryValue::Amount(2.5).to_string(), "2.5");
        assert_eq!(SummaryValue::Amount(3.0).to_string(), "3");
        assert_eq!(SummaryValue::Amount(1.005).to_string(), "1");
        assert_eq!(SummaryValue::Count(1234.6).to_string(), "1235");
        assert_eq!(SummaryValue::Missing.to_string(), "-");
    }

    fn numeric_cells(summary: &AggregatedSummary) -> Vec<(Column, Option<f64>)> {
        summary
            .cells
            .iter()
            .map(|c| (c.column, c.value.as_number()))
            .collect()
    }

    proptest! {
        #[test]
        fn numeric_sums_are_order_independent(
            qa in proptest::collection::vec(0u32..10_000, 0..6),
            qb in proptest::collection::vec(0u32..10_000, 0..6),
        ) {
            let records = |qs: &[u32]| -> Vec<ActivityRecord> {
                qs.iter()
                    .map(|q| ActivityRecord {
                        quantity: Some(f64::from(*q)),
                        workers: Some(f64::from(*q % 7)),
                        oil: Some(f64::from(*q / 10)),
                        ..Default::default()
                    })
                    .collect()
            };
            let a = parcel("a", ParcelInfo {
                spraying: Some(records(&qa)),
                harvest: Some(records(&qa)),
                ..Default::default()
            });
            let b = parcel("b", ParcelInfo {
                spraying: Some(records(&qb)),
                harvest: Some(records(&qb)),
                ..Default::default()
            });

            for mode in [Mode::Spraying, Mode::Harvest] {
                let ab = summarize(&[&a, &b], mode);
                let ba = summarize(&[&b, &a], mode);
                prop_assert_eq!(numeric_cells(&ab), numeric_cells(&ba));
            }
        }
    }
}
