//! # parsel-map
//!
//! Hôte interactif du moteur `parsel` : chargement d'un GeoJSON de parcelles,
//! sélection, rapports par mode et export de la carte dérivée.
//!
//! ## Features
//!
//! - Presets de configuration embarqués (`default`, `tablet`) ou fichier JSON
//! - Rapport de sélection (en-tête, résumé, indicateurs, cadrage)
//! - Export GeoJSON des styles et pastilles de statut
//! - Session interactive avec minuterie de réinitialisation annulable
//!
//! ## Usage CLI
//!
//! ```bash
//! # Liste des parcelles
//! parsel-map list --path ./parseller.geojson
//!
//! # Synthèse hasat de deux parcelles
//! parsel-map summary --path ./parseller.geojson --mode hasat --select 101_7,101_8
//!
//! # Carte dérivée en GeoJSON
//! parsel-map export --path ./parseller.geojson --mode ilac --all --output ./carte.geojson
//!
//! # Session interactive
//! parsel-map session --path ./parseller.geojson
//! ```

pub mod cli;
pub mod config;
pub mod export;
pub mod fingerprint;
pub mod report;
pub mod session;

pub use config::{Config, Viewport};
pub use report::{FocusHint, SelectionReport};
pub use session::{Command, Outcome, SessionHost};
