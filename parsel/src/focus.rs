//! Cadrage de la carte selon la sélection
//!
//! Le contrôleur ne fait que calculer la région ; l'animation et
//! l'ajustement sont à la charge du moteur de rendu.

use geo::{BoundingRect, MultiPoint, Point, Rect};
use serde::Serialize;
use tracing::debug;

use crate::repository::ParcelSet;
use crate::selection::Selection;
use crate::settings::{FocusSettings, Padding};
use crate::types::{LatLng, Parcel};

/// Taille d'une tuile de carte en pixels
const TILE_SIZE: f64 = 256.0;

/// Latitude maximale représentable en Web Mercator
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

/// Région à afficher
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FocusRegion {
    /// Vue par défaut (réinitialisation)
    Default { center: LatLng, zoom: u8 },
    /// Ajustement sur une emprise
    Fit(FitRegion),
}

/// Emprise à ajuster, avec marge et zoom plafonné
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitRegion {
    pub south_west: LatLng,
    pub north_east: LatLng,
    pub padding: Padding,
    pub max_zoom: u8,
}

impl FitRegion {
    fn from_rect(rect: Rect<f64>, settings: &FocusSettings) -> Self {
        Self {
            south_west: LatLng::from(rect.min()),
            north_east: LatLng::from(rect.max()),
            padding: settings.padding,
            max_zoom: settings.max_zoom,
        }
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    /// Zoom entier retenu pour ajuster l'emprise dans une fenêtre donnée
    ///
    /// Même calcul qu'un `fitBounds` : plus grand zoom pour lequel l'emprise
    /// projetée tient dans la fenêtre moins les marges, plafonné à `max_zoom`.
    pub fn zoom_for_viewport(&self, width_px: u32, height_px: u32) -> u8 {
        let avail_w = f64::from(width_px) - 2.0 * f64::from(self.padding.x);
        let avail_h = f64::from(height_px) - 2.0 * f64::from(self.padding.y);
        if avail_w <= 0.0 || avail_h <= 0.0 {
            return 0;
        }

        let (x0, y0) = web_mercator_unit(self.south_west);
        let (x1, y1) = web_mercator_unit(self.north_east);
        let dx = (x1 - x0).abs() * TILE_SIZE;
        let dy = (y1 - y0).abs() * TILE_SIZE;

        let zoom_x = if dx > 0.0 { (avail_w / dx).log2() } else { f64::INFINITY };
        let zoom_y = if dy > 0.0 { (avail_h / dy).log2() } else { f64::INFINITY };
        let zoom = zoom_x.min(zoom_y).floor();

        if zoom.is_infinite() || zoom >= f64::from(self.max_zoom) {
            self.max_zoom
        } else if zoom <= 0.0 {
            0
        } else {
            zoom as u8
        }
    }
}

/// Projection Web Mercator normalisée sur [0, 1] (origine nord-ouest)
fn web_mercator_unit(p: LatLng) -> (f64, f64) {
    let lat = p.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = (p.lng + 180.0) / 360.0;
    let y = (1.0 - (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln() / std::f64::consts::PI) / 2.0;
    (x, y)
}

/// Emprise de tous les points des parcelles données
fn bounds_of<'a, I>(parcels: I) -> Option<Rect<f64>>
where
    I: IntoIterator<Item = &'a Parcel>,
{
    let points: Vec<Point<f64>> = parcels
        .into_iter()
        .flat_map(|p| p.ring.0.iter().copied().map(Point::from))
        .collect();
    MultiPoint::new(points).bounding_rect()
}

/// Région à afficher pour la sélection courante, `None` si la vue ne change pas
pub fn compute_focus_region(
    parcels: &ParcelSet,
    selection: &Selection,
    settings: &FocusSettings,
) -> Option<FocusRegion> {
    if selection.is_reset_active() {
        return Some(FocusRegion::Default {
            center: settings.default_center,
            zoom: settings.default_zoom,
        });
    }

    let rect = if selection.group_mode() {
        if selection.selected_group().is_empty() {
            return None;
        }
        bounds_of(
            selection
                .selected_group()
                .iter()
                .filter_map(|id| parcels.get(id)),
        )?
    } else {
        let parcel = selection.selected_single().and_then(|id| parcels.get(id))?;
        parcel.bounds()?
    };

    debug!(
        min_x = rect.min().x,
        min_y = rect.min().y,
        max_x = rect.max().x,
        max_y = rect.max().y,
        "Focus region computed"
    );
    Some(FocusRegion::Fit(FitRegion::from_rect(rect, settings)))
}
