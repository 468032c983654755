//! Jeu de parcelles chargé en mémoire
//!
//! Lecture seule pour tous les consommateurs ; une nouvelle ingestion
//! remplace l'ensemble via [`ParcelSet::replace`].

use std::collections::HashMap;

use tracing::{info, warn};

use crate::selection::Selection;
use crate::types::{Parcel, ParcelId};

/// Parcelles indexées par identifiant, dans l'ordre d'ingestion
#[derive(Debug, Clone, Default)]
pub struct ParcelSet {
    parcels: Vec<Parcel>,
    index: HashMap<ParcelId, usize>,
}

impl ParcelSet {
    /// Construit le jeu ; un identifiant en double est ignoré (la première occurrence reste)
    pub fn new(parcels: Vec<Parcel>) -> Self {
        let mut set = Self::default();
        set.replace(parcels);
        set
    }

    /// Remplace l'ensemble des parcelles
    pub fn replace(&mut self, parcels: Vec<Parcel>) {
        self.parcels.clear();
        self.index.clear();

        for parcel in parcels {
            if self.index.contains_key(&parcel.id) {
                warn!(id = %parcel.id, "Duplicate parcel id, keeping first occurrence");
                continue;
            }
            self.index.insert(parcel.id.clone(), self.parcels.len());
            self.parcels.push(parcel);
        }

        info!(parcels = self.parcels.len(), "Parcel set loaded");
    }

    pub fn get(&self, id: &ParcelId) -> Option<&Parcel> {
        self.index.get(id).map(|&i| &self.parcels[i])
    }

    pub fn contains(&self, id: &ParcelId) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parcel> {
        self.parcels.iter()
    }

    pub fn as_slice(&self) -> &[Parcel] {
        &self.parcels
    }

    /// Identifiants de toutes les parcelles, dans l'ordre d'ingestion
    pub fn ids(&self) -> impl Iterator<Item = ParcelId> + '_ {
        self.parcels.iter().map(|p| p.id.clone())
    }

    /// Parcelles de la sélection effective
    ///
    /// En mode groupé, l'ordre est celui du jeu de parcelles. Les
    /// identifiants inconnus sont simplement exclus.
    pub fn resolve(&self, selection: &Selection) -> Vec<&Parcel> {
        if selection.group_mode() {
            self.parcels
                .iter()
                .filter(|p| selection.selected_group().contains(&p.id))
                .collect()
        } else {
            selection
                .selected_single()
                .and_then(|id| self.get(id))
                .into_iter()
                .collect()
        }
    }

    /// Identifiants sélectionnés qui n'existent plus dans le jeu
    pub fn stale_ids<'a>(&self, selection: &'a Selection) -> Vec<&'a ParcelId> {
        let ids: Vec<&ParcelId> = if selection.group_mode() {
            selection.selected_group().iter().collect()
        } else {
            selection.selected_single().into_iter().collect()
        };
        ids.into_iter().filter(|id| !self.contains(id)).collect()
    }
}
