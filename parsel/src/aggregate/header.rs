//! Ligne d'en-tête fixe du panneau de sélection

use serde::Serialize;

use crate::aggregate::metrics::SQUARE_METERS_PER_DONUM;
use crate::text::PLACEHOLDER;
use crate::types::Parcel;

/// Description, localisation et surface de la sélection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionHeader {
    pub parcel_count: usize,
    pub group: bool,
    /// Description de la première parcelle
    pub definition: String,
    pub neighborhood: String,
    pub block: String,
    pub parcel_no: String,
    pub area_m2: f64,
    pub donum: f64,
}

impl SelectionHeader {
    pub fn build(parcels: &[&Parcel], group: bool) -> Self {
        let area_m2: f64 = parcels.iter().map(|p| p.area_m2()).sum();
        let donum = if area_m2 > 0.0 {
            area_m2 / SQUARE_METERS_PER_DONUM
        } else {
            0.0
        };

        let (definition, neighborhood, block, parcel_no) = match parcels.first() {
            Some(p) => (
                p.definition().unwrap_or(PLACEHOLDER),
                p.properties.neighborhood_display(),
                p.properties.block_display(),
                p.properties.parcel_no_display(),
            ),
            None => (PLACEHOLDER, PLACEHOLDER, PLACEHOLDER, PLACEHOLDER),
        };

        Self {
            parcel_count: parcels.len(),
            group,
            definition: definition.to_string(),
            neighborhood: neighborhood.to_string(),
            block: block.to_string(),
            parcel_no: parcel_no.to_string(),
            area_m2,
            donum,
        }
    }

    /// « îlot / parcelle » en sélection simple, « N parsel » en groupé
    pub fn parcel_label(&self) -> String {
        if self.group {
            format!("{} parsel", self.parcel_count)
        } else {
            format!("{} / {}", self.block, self.parcel_no)
        }
    }
}
