//! Export des indications de rendu en GeoJSON (streaming avec geozero)
//!
//! Chaque parcelle dessinable devient un Polygon portant son style ; chaque
//! pastille de statut devient un Point à sa position.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo::{Geometry, Point, Polygon};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;
use parsel::{render_hints, BadgePlacement, Parcel, ParcelSet, RenderHint, Selection};
use serde_json::{json, Value};

/// Statistiques d'un export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub parcels: usize,
    pub badges: usize,
}

/// Exporte la carte de la sélection courante en GeoJSON
pub fn export_render_hints(
    parcels: &ParcelSet,
    selection: &Selection,
    output_path: &Path,
) -> Result<ExportStats> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    let stats = write_collection(&mut writer, parcels, selection)?;
    writer.flush()?;

    Ok(stats)
}

/// Écrit la FeatureCollection complète
pub fn write_collection<W: Write>(
    writer: &mut W,
    parcels: &ParcelSet,
    selection: &Selection,
) -> Result<ExportStats> {
    let mut stats = ExportStats::default();

    write!(
        writer,
        r#"{{"type":"FeatureCollection","mode":"{}","features":["#,
        selection.mode().key()
    )?;

    let mut first = true;
    for hint in render_hints(parcels, selection) {
        // Les indications ne sont produites que pour des parcelles connues
        let Some(parcel) = parcels.get(&hint.id) else {
            continue;
        };

        if !first {
            write!(writer, ",")?;
        }
        first = false;
        write_parcel_feature(writer, parcel, &hint)?;
        stats.parcels += 1;

        if let Some(badge) = &hint.badge {
            write!(writer, ",")?;
            write_badge_feature(writer, &hint, badge)?;
            stats.badges += 1;
        }
    }

    write!(writer, "]}}")?;
    Ok(stats)
}

/// Écrit un polygone de parcelle avec son style
fn write_parcel_feature<W: Write>(writer: &mut W, parcel: &Parcel, hint: &RenderHint) -> Result<()> {
    let geometry = Geometry::Polygon(Polygon::new(parcel.ring.clone(), vec![]));
    let properties = json!({
        "kind": "parcel",
        "label": parcel.label(),
        "selected": hint.selected,
        "stroke": hint.style.stroke,
        "weight": hint.style.weight,
        "fill_color": hint.style.fill_color.unwrap_or(hint.style.stroke),
        "fill_opacity": hint.style.fill_opacity,
        "status": hint.badge.as_ref().map(|b| b.badge.key.as_str()),
    });
    write_feature(writer, hint.id.as_str(), &geometry, &properties)
}

/// Écrit la pastille de statut d'une parcelle
fn write_badge_feature<W: Write>(
    writer: &mut W,
    hint: &RenderHint,
    badge: &BadgePlacement,
) -> Result<()> {
    let geometry = Geometry::Point(Point::new(badge.position.lng, badge.position.lat));
    let properties = json!({
        "kind": "badge",
        "parcel_id": hint.id.as_str(),
        "status": badge.badge.key.as_str(),
        "symbol": badge.badge.symbol,
        "title": badge.badge.title,
        "color": badge.badge.color,
    });
    write_feature(writer, &format!("{}#badge", hint.id), &geometry, &properties)
}

/// Écrit une feature ; la géométrie passe par geozero
fn write_feature<W: Write>(
    writer: &mut W,
    id: &str,
    geometry: &Geometry,
    properties: &Value,
) -> Result<()> {
    write!(writer, r#"{{"type":"Feature","id":"#)?;
    serde_json::to_writer(&mut *writer, id)?;

    write!(writer, r#","geometry":"#)?;
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    geometry.process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;

    write!(writer, r#","properties":"#)?;
    serde_json::to_writer(&mut *writer, properties)?;
    write!(writer, "}}")?;

    Ok(())
}
