//! Export de la carte dérivée (GeoJSON)

pub mod geojson;

pub use geojson::{export_render_hints, ExportStats};
