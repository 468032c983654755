//! Machine d'état de la sélection
//!
//! Deux états exclusifs : sélection simple (au plus une parcelle) ou
//! sélection groupée (ensemble de parcelles), croisés avec le mode de
//! visualisation. `set_group_mode` est le seul endroit où l'invariant
//! d'exclusion est appliqué.
//!
//! Le signal de réinitialisation est transitoire : `reset_view` l'active et
//! retourne un ticket ; l'hôte programme l'expiration du ticket après
//! [`EngineSettings::reset_window`](crate::settings::EngineSettings::reset_window).
//! Un nouveau déclenchement invalide les tickets précédents.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::types::{Mode, ParcelId};

/// Jeton identifiant un déclenchement du signal de réinitialisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResetTicket {
    generation: u64,
}

impl ResetTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Signal transitoire de réinitialisation de la vue
#[derive(Debug, Clone, Default)]
struct ResetPulse {
    generation: u64,
    active: bool,
}

impl ResetPulse {
    fn trigger(&mut self) -> ResetTicket {
        self.generation += 1;
        self.active = true;
        ResetTicket {
            generation: self.generation,
        }
    }

    fn expire(&mut self, ticket: ResetTicket) -> bool {
        if self.active && ticket.generation == self.generation {
            self.active = false;
            true
        } else {
            false
        }
    }
}

/// État de la sélection d'une session
#[derive(Debug, Clone, Default)]
pub struct Selection {
    mode: Mode,
    group_mode: bool,
    single: Option<ParcelId>,
    group: BTreeSet<ParcelId>,
    reset: ResetPulse,
}

impl Selection {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn group_mode(&self) -> bool {
        self.group_mode
    }

    pub fn selected_single(&self) -> Option<&ParcelId> {
        self.single.as_ref()
    }

    pub fn selected_group(&self) -> &BTreeSet<ParcelId> {
        &self.group
    }

    /// Clic sur une parcelle : remplace en mode simple, bascule en mode groupé
    pub fn select_parcel(&mut self, id: ParcelId) {
        if self.group_mode {
            if self.group.remove(&id) {
                debug!(id = %id, size = self.group.len(), "Parcel removed from group");
            } else {
                debug!(id = %id, size = self.group.len() + 1, "Parcel added to group");
                self.group.insert(id);
            }
        } else {
            debug!(id = %id, "Single parcel selected");
            self.single = Some(id);
        }
    }

    /// Active ou désactive la sélection groupée
    pub fn set_group_mode(&mut self, enabled: bool) {
        self.group_mode = enabled;
        if enabled {
            self.single = None;
        } else {
            self.group.clear();
        }
        debug!(enabled, "Group mode changed");
    }

    /// Sélectionne toutes les parcelles chargées (mode groupé uniquement)
    ///
    /// Remplace le groupe courant. Retourne `false` hors mode groupé.
    pub fn select_all<I>(&mut self, ids: I) -> bool
    where
        I: IntoIterator<Item = ParcelId>,
    {
        if !self.group_mode {
            return false;
        }
        self.group = ids.into_iter().collect();
        debug!(size = self.group.len(), "All parcels selected");
        true
    }

    /// Vide la sélection sans changer le mode groupé
    pub fn clear_selection(&mut self) {
        self.single = None;
        self.group.clear();
        debug!("Selection cleared");
    }

    /// Change le mode de visualisation, la sélection est conservée
    pub fn set_mode(&mut self, mode: Mode) {
        debug!(from = %self.mode, to = %mode, "Mode changed");
        self.mode = mode;
    }

    /// Réinitialise la vue : sélection vidée, mode groupé désactivé, signal actif
    pub fn reset_view(&mut self) -> ResetTicket {
        self.clear_selection();
        self.set_group_mode(false);
        let ticket = self.reset.trigger();
        debug!(generation = ticket.generation, "Reset view triggered");
        ticket
    }

    /// Expiration d'un ticket ; sans effet si un déclenchement plus récent existe
    pub fn expire_reset(&mut self, ticket: ResetTicket) -> bool {
        let expired = self.reset.expire(ticket);
        debug!(generation = ticket.generation, expired, "Reset window elapsed");
        expired
    }

    pub fn is_reset_active(&self) -> bool {
        self.reset.active
    }

    /// Vrai si la parcelle fait partie de la sélection effective
    pub fn is_selected(&self, id: &ParcelId) -> bool {
        if self.group_mode {
            self.group.contains(id)
        } else {
            self.single.as_ref() == Some(id)
        }
    }

    /// Aucune parcelle sélectionnée dans l'état courant
    pub fn is_empty(&self) -> bool {
        if self.group_mode {
            self.group.is_empty()
        } else {
            self.single.is_none()
        }
    }

    /// Instantané sérialisable
    pub fn snapshot(&self) -> SelectionSnapshot {
        let selected = if self.group_mode {
            self.group.iter().cloned().collect()
        } else {
            self.single.iter().cloned().collect()
        };
        SelectionSnapshot {
            mode: self.mode,
            group_mode: self.group_mode,
            selected,
            reset_active: self.reset.active,
        }
    }
}

/// Vue figée de la sélection, pour les rapports
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionSnapshot {
    pub mode: Mode,
    pub group_mode: bool,
    pub selected: Vec<ParcelId>,
    pub reset_active: bool,
}
