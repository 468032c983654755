//! # parsel
//!
//! Moteur de sélection, de statut et d'agrégation pour des parcelles agricoles.
//!
//! ## Features
//!
//! - Ingestion GeoJSON tolérante (FeatureCollection ou tableau nu, alias de champs)
//! - Statut courant d'une parcelle par mode (ilaçlama, gübreleme, sayım)
//! - Sélection simple ou groupée avec signal de réinitialisation à générations
//! - Synthèse par mode d'un ensemble de parcelles et indicateurs de surface
//! - Région de cadrage de la carte, types `geo` pour l'interopérabilité
//!
//! ## Usage
//!
//! ```rust,ignore
//! use parsel::{parse, summarize, Mode, ParcelSet, Selection};
//! use std::path::Path;
//!
//! let result = parse(Path::new("parseller.geojson"))?;
//! let parcels = ParcelSet::new(result.parcels);
//!
//! let mut selection = Selection::new(Mode::Harvest);
//! selection.set_group_mode(true);
//! selection.select_all(parcels.ids());
//!
//! let summary = summarize(&parcels.resolve(&selection), selection.mode());
//! for cell in &summary.cells {
//!     println!("{}: {}", cell.label, cell.value);
//! }
//! ```

pub mod aggregate;
pub mod date;
pub mod error;
pub mod focus;
pub mod ingest;
pub mod listing;
pub mod number;
pub mod record;
pub mod render;
pub mod repository;
pub mod selection;
pub mod settings;
pub mod status;
pub mod text;
pub mod types;

pub use aggregate::{
    summarize, summarize_with, AggregatedSummary, AreaMetrics, Column, SelectionHeader,
    SummaryCell, SummaryValue,
};
pub use error::ParselError;
pub use focus::{compute_focus_region, FitRegion, FocusRegion};
pub use ingest::IngestResult;
pub use listing::{listing, ListingEntry};
pub use record::{ActivityKind, ActivityRecord, ParcelInfo, SpeciesCounts};
pub use render::{render_hints, BadgePlacement, PolygonStyle, RenderHint};
pub use repository::ParcelSet;
pub use selection::{ResetTicket, Selection, SelectionSnapshot};
pub use settings::{EngineSettings, FocusSettings, Padding};
pub use status::{derive_status, norm_status, StatusBadge, StatusKey};
pub use types::{LatLng, Mode, Parcel, ParcelId, ParcelProperties};

use std::path::Path;

/// Lit une source GeoJSON UTF-8 et retourne les parcelles canoniques.
///
/// # Arguments
///
/// * `path` - Chemin vers le fichier GeoJSON
///
/// # Returns
///
/// Un `IngestResult` contenant les parcelles retenues dans l'ordre de la
/// source, le nombre de features écartées et les erreurs non fatales.
///
/// # Errors
///
/// Retourne `ParselError` si le fichier est illisible ou n'est pas un
/// document GeoJSON exploitable.
pub fn parse(path: &Path) -> Result<IngestResult, ParselError> {
    ingest::parse(path, None)
}
