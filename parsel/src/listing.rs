//! Liste à plat des parcelles pour la navigation

use serde::Serialize;

use crate::aggregate::metrics::AreaMetrics;
use crate::repository::ParcelSet;
use crate::types::ParcelId;

/// Une ligne de la liste
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingEntry {
    pub id: ParcelId,
    pub label: String,
    pub block: String,
    pub parcel_no: String,
    pub area_m2: f64,
    pub occupancy_pct: f64,
}

/// Toutes les parcelles, dans l'ordre d'ingestion
pub fn listing(parcels: &ParcelSet, footprint_m2: f64) -> Vec<ListingEntry> {
    parcels
        .iter()
        .map(|p| ListingEntry {
            id: p.id.clone(),
            label: p.label(),
            block: p.properties.block_display().to_string(),
            parcel_no: p.properties.parcel_no_display().to_string(),
            area_m2: p.area_m2(),
            occupancy_pct: AreaMetrics::for_parcel(p, footprint_m2).occupancy_pct,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Parcel;
    use geo::LineString;

    #[test]
    fn test_listing_entries() {
        let mut a = Parcel::new("a", LineString::from(vec![(27.0, 38.0)]));
        a.properties.block = Some("101".to_string());
        a.properties.parcel_no = Some("7".to_string());
        a.properties.neighborhood = Some("Kuyucak".to_string());
        a.properties.area_m2 = Some(10_000.0);
        a.info.trees.0.push(("zeytin".to_string(), 100.0));
        let b = Parcel::new("b", LineString::new(vec![]));

        let entries = listing(&ParcelSet::new(vec![a, b]), 36.0);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].label, "Kuyucak 101/7");
        assert!((entries[0].occupancy_pct - 36.0).abs() < 1e-9);
        assert_eq!(entries[1].block, "-");
        assert_eq!(entries[1].area_m2, 0.0);
        assert_eq!(entries[1].occupancy_pct, 0.0);
    }
}
