//! Extraction du contour extérieur d'une géométrie GeoJSON

use geo::{Coord, LineString};
use geojson::{PolygonType, Position, Value};
use serde_json::Value as JsonValue;

/// Retire d'une géométrie brute les positions de moins de deux nombres
///
/// Seuls les Polygon et MultiPolygon sont concernés : ce sont les seuls
/// types dont on extrait un contour.
pub fn retain_valid_positions(geometry: &mut JsonValue) {
    let depth = match geometry.get("type").and_then(JsonValue::as_str) {
        Some("Polygon") => 1,
        Some("MultiPolygon") => 2,
        _ => return,
    };
    if let Some(coords) = geometry.get_mut("coordinates") {
        retain_in_rings(coords, depth);
    }
}

/// Descend jusqu'aux anneaux (`depth` niveaux de tableaux) puis filtre
fn retain_in_rings(node: &mut JsonValue, depth: u8) {
    let Some(items) = node.as_array_mut() else {
        return;
    };
    for item in items.iter_mut() {
        if depth > 1 {
            retain_in_rings(item, depth - 1);
        } else if let Some(ring) = item.as_array_mut() {
            ring.retain(is_position);
        }
    }
}

fn is_position(value: &JsonValue) -> bool {
    value
        .as_array()
        .is_some_and(|pos| pos.len() >= 2 && pos.iter().all(JsonValue::is_number))
}

/// Contour extérieur : premier anneau d'un Polygon, ou du premier
/// polygone d'un MultiPolygon. Les autres types n'ont pas de contour.
pub fn exterior_ring(value: &Value) -> Option<LineString<f64>> {
    let polygon: &PolygonType = match value {
        Value::Polygon(rings) => rings,
        Value::MultiPolygon(polygons) => polygons.first()?,
        _ => return None,
    };
    polygon.first().map(|ring| to_line_string(ring))
}

/// Positions [lng, lat] vers un `LineString` (x = lng, y = lat)
///
/// Les positions de moins de deux nombres ou non finies sont ignorées.
fn to_line_string(ring: &[Position]) -> LineString<f64> {
    ring.iter()
        .filter(|pos| pos.len() >= 2 && pos[0].is_finite() && pos[1].is_finite())
        .map(|pos| Coord { x: pos[0], y: pos[1] })
        .collect::<Vec<_>>()
        .into()
}

/// Nom du type de géométrie pour les messages
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}
