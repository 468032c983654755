//! Indicateurs de surface : densité, capacité de plantation, occupation
//!
//! Pour une sélection de plusieurs parcelles, la densité (arbres/dönüm) et
//! l'occupation sont calculées par parcelle puis moyennées. La capacité de
//! plantation, la surface et le nombre d'arbres sont sommés.

use serde::Serialize;

use crate::types::Parcel;

/// m² par dönüm
pub const SQUARE_METERS_PER_DONUM: f64 = 1000.0;

/// Indicateurs d'une parcelle ou d'une sélection
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AreaMetrics {
    pub parcel_count: usize,
    pub area_m2: f64,
    pub donum: f64,
    /// Arbres et jeunes plants
    pub trees: f64,
    pub trees_per_donum: f64,
    /// Plants supplémentaires possibles sur la surface libre
    pub plantable_capacity: u64,
    /// Part de la surface occupée, dans [0, 100]
    pub occupancy_pct: f64,
}

impl AreaMetrics {
    /// Indicateurs à partir d'une surface et d'un nombre d'arbres
    pub fn compute(area_m2: f64, trees: f64, footprint_m2: f64) -> Self {
        let area_m2 = if area_m2.is_finite() { area_m2.max(0.0) } else { 0.0 };
        let trees = if trees.is_finite() { trees.max(0.0) } else { 0.0 };
        let donum = area_m2 / SQUARE_METERS_PER_DONUM;

        let trees_per_donum = if donum > 0.0 { trees / donum } else { 0.0 };

        let used_m2 = trees * footprint_m2;
        let plantable_capacity = if footprint_m2 > 0.0 {
            ((area_m2 - used_m2).max(0.0) / footprint_m2).floor() as u64
        } else {
            0
        };

        let occupancy_pct = if area_m2 > 0.0 {
            (used_m2 / area_m2 * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        Self {
            parcel_count: 1,
            area_m2,
            donum,
            trees,
            trees_per_donum,
            plantable_capacity,
            occupancy_pct,
        }
    }

    /// Indicateurs d'une parcelle
    pub fn for_parcel(parcel: &Parcel, footprint_m2: f64) -> Self {
        Self::compute(parcel.area_m2(), parcel.tree_total(), footprint_m2)
    }

    /// Indicateurs d'une sélection (ratios moyennés, capacités sommées)
    pub fn for_selection(parcels: &[&Parcel], footprint_m2: f64) -> Self {
        if parcels.is_empty() {
            return Self::default();
        }

        let per_parcel: Vec<AreaMetrics> = parcels
            .iter()
            .map(|p| Self::for_parcel(p, footprint_m2))
            .collect();
        let n = per_parcel.len() as f64;

        let area_m2: f64 = per_parcel.iter().map(|m| m.area_m2).sum();
        Self {
            parcel_count: per_parcel.len(),
            area_m2,
            donum: area_m2 / SQUARE_METERS_PER_DONUM,
            trees: per_parcel.iter().map(|m| m.trees).sum(),
            trees_per_donum: per_parcel.iter().map(|m| m.trees_per_donum).sum::<f64>() / n,
            plantable_capacity: per_parcel.iter().map(|m| m.plantable_capacity).sum(),
            occupancy_pct: per_parcel.iter().map(|m| m.occupancy_pct).sum::<f64>() / n,
        }
    }
}
