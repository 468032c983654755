//! Indications de rendu par parcelle
//!
//! Le moteur de carte n'a qu'à appliquer le style et placer la pastille ;
//! aucune décision n'est prise de son côté.

use serde::Serialize;

use crate::repository::ParcelSet;
use crate::selection::Selection;
use crate::status::{derive_status, StatusBadge};
use crate::types::{LatLng, Mode, Parcel, ParcelId};

/// Contour d'une parcelle sélectionnée
pub const SELECTED_STROKE: &str = "red";

/// Fraction de la hauteur de l'emprise dont la pastille est décalée vers le nord en recensement
const CENSUS_BADGE_OFFSET: f64 = 0.25;

/// Style d'un polygone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonStyle {
    pub stroke: &'static str,
    pub weight: u8,
    /// Remplissage imposé par le statut, sinon couleur du contour
    pub fill_color: Option<&'static str>,
    pub fill_opacity: f64,
}

impl PolygonStyle {
    fn base(mode: Mode, selected: bool) -> Self {
        if selected {
            Self {
                stroke: SELECTED_STROKE,
                weight: 3,
                fill_color: None,
                fill_opacity: 0.25,
            }
        } else {
            Self {
                stroke: mode.stroke_color(),
                weight: 2,
                fill_color: None,
                fill_opacity: 0.2,
            }
        }
    }

    fn with_status(mut self, badge: &StatusBadge) -> Self {
        self.fill_color = Some(badge.color);
        self.fill_opacity = 0.35;
        self
    }
}

/// Pastille de statut et sa position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgePlacement {
    pub badge: StatusBadge,
    pub position: LatLng,
}

/// Tout ce qu'il faut pour dessiner une parcelle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderHint {
    pub id: ParcelId,
    pub selected: bool,
    pub style: PolygonStyle,
    pub badge: Option<BadgePlacement>,
}

/// Position de la pastille : centre de l'emprise, décalé en recensement
fn badge_position(parcel: &Parcel, mode: Mode) -> Option<LatLng> {
    let rect = parcel.bounds()?;
    let mut center = LatLng::from(rect.center());
    if mode == Mode::Census {
        center.lat += rect.height() * CENSUS_BADGE_OFFSET;
    }
    Some(center)
}

/// Indication de rendu d'une parcelle
pub fn render_hint(parcel: &Parcel, selection: &Selection) -> RenderHint {
    let mode = selection.mode();
    let selected = selection.is_selected(&parcel.id);
    let status = derive_status(parcel, mode);

    let mut style = PolygonStyle::base(mode, selected);
    if let Some(badge) = &status {
        style = style.with_status(badge);
    }

    // Sans contour, pas de centre : la pastille est omise
    let badge = status.and_then(|badge| {
        badge_position(parcel, mode).map(|position| BadgePlacement { badge, position })
    });

    RenderHint {
        id: parcel.id.clone(),
        selected,
        style,
        badge,
    }
}

/// Indications de rendu de toutes les parcelles affichables
///
/// Les parcelles sans contour ne sont pas dessinées.
pub fn render_hints(parcels: &ParcelSet, selection: &Selection) -> Vec<RenderHint> {
    parcels
        .iter()
        .filter(|p| p.has_ring())
        .map(|p| render_hint(p, selection))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ActivityRecord, ParcelInfo};
    use crate::status::StatusKey;
    use geo::LineString;

    fn square(id: &str) -> Parcel {
        Parcel::new(
            id,
            LineString::from(vec![(27.0, 38.0), (27.002, 38.0), (27.002, 38.004), (27.0, 38.004)]),
        )
    }

    fn sprayed(id: &str, status: &str) -> Parcel {
        let mut p = square(id);
        p.info = ParcelInfo {
            spraying: Some(vec![ActivityRecord {
                date: Some("2024-05-01".to_string()),
                status: Some(status.to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        p
    }

    #[test]
    fn test_base_and_selected_styles() {
        let set = ParcelSet::new(vec![square("a"), square("b")]);
        let mut sel = Selection::new(Mode::Harvest);
        sel.select_parcel("a".into());

        let hints = render_hints(&set, &sel);
        assert_eq!(hints.len(), 2);
        assert!(hints[0].selected);
        assert_eq!(hints[0].style.stroke, "red");
        assert_eq!(hints[0].style.weight, 3);
        assert_eq!(hints[0].style.fill_opacity, 0.25);

        assert!(!hints[1].selected);
        assert_eq!(hints[1].style.stroke, "#f59e0b");
        assert_eq!(hints[1].style.weight, 2);
        assert_eq!(hints[1].badge, None);
    }

    #[test]
    fn test_status_fill_and_badge_at_center() {
        let set = ParcelSet::new(vec![sprayed("a", "Zamanı Geçti")]);
        let sel = Selection::new(Mode::Spraying);
        let hint = &render_hints(&set, &sel)[0];

        assert_eq!(hint.style.fill_color, Some("#ef4444"));
        assert_eq!(hint.style.fill_opacity, 0.35);
        let badge = hint.badge.as_ref().unwrap();
        assert_eq!(badge.badge.key, StatusKey::Late);
        assert!((badge.position.lat - 38.002).abs() < 1e-12);
        assert!((badge.position.lng - 27.001).abs() < 1e-12);
    }

    #[test]
    fn test_census_badge_offset_north() {
        let set = ParcelSet::new(vec![square("a")]);
        let sel = Selection::new(Mode::Census);
        let hint = &render_hints(&set, &sel)[0];

        let badge = hint.badge.as_ref().unwrap();
        assert_eq!(badge.badge.key, StatusKey::Done);
        assert!((badge.position.lat - 38.003).abs() < 1e-12);
    }

    #[test]
    fn test_unrecognized_status_no_badge() {
        let set = ParcelSet::new(vec![sprayed("a", "bilinmiyor")]);
        let hint = &render_hints(&set, &Selection::new(Mode::Spraying))[0];
        assert_eq!(hint.badge, None);
        assert_eq!(hint.style.fill_color, None);
    }

    #[test]
    fn test_parcels_without_ring_not_rendered() {
        let set = ParcelSet::new(vec![square("a"), Parcel::new("x", LineString::new(vec![]))]);
        let hints = render_hints(&set, &Selection::default());
        assert_eq!(hints.len(), 1);
    }
}
