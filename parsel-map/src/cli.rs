//! Définition et implémentation des commandes CLI
//!
//! - `list` : liste à plat des parcelles
//! - `summary` : rapport d'une sélection dans un mode
//! - `export` : carte dérivée en GeoJSON
//! - `session` : boucle interactive sur l'entrée standard

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use parsel::ingest::Encoding;
use parsel::{listing, Mode, ParcelId, ParcelSet, Selection};
use tokio::io::BufReader;
use tracing::{info, warn};

use crate::config::Config;
use crate::export::export_render_hints;
use crate::report::SelectionReport;
use crate::session::SessionHost;

#[derive(Subcommand)]
pub enum Commands {
    /// List every parcel with its area and occupancy
    List {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print the summary of a selection for one mode
    Summary {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Also write the report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Export parcel styles and status badges to GeoJSON
    Export {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Output GeoJSON file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Interactive session reading commands from stdin
    Session {
        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Source GeoJSON
#[derive(Args, Clone)]
pub struct SourceArgs {
    /// Path to a GeoJSON FeatureCollection (or array of features)
    #[arg(short, long)]
    pub path: PathBuf,
}

/// Sélection décrite en ligne de commande
#[derive(Args, Clone, Default)]
pub struct SelectionArgs {
    /// Viewing mode: ilac, hasat, sayim, gubre, analiz (défaut : config)
    #[arg(short, long)]
    pub mode: Option<Mode>,

    /// Parcel ids to select, comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub select: Vec<String>,

    /// Group selection (implied by --all or several ids)
    #[arg(short, long)]
    pub group: bool,

    /// Select every parcel (group selection)
    #[arg(long)]
    pub all: bool,
}

impl SelectionArgs {
    /// Rejoue les arguments comme une suite de transitions
    pub fn apply(&self, parcels: &ParcelSet, default_mode: Mode) -> Selection {
        let mut selection = Selection::new(self.mode.unwrap_or(default_mode));
        let group = self.group || self.all || self.select.len() > 1;
        selection.set_group_mode(group);

        if self.all {
            selection.select_all(parcels.ids());
        } else {
            for id in &self.select {
                let id = ParcelId::from(id.trim());
                if !parcels.contains(&id) {
                    warn!(id = %id, "Unknown parcel id in selection");
                }
                // En mode groupé, un id répété se désélectionnerait
                if !(group && selection.is_selected(&id)) {
                    selection.select_parcel(id);
                }
            }
        }
        selection
    }
}

/// Charge la source avec l'encodage résolu
fn load_parcels(path: &Path, encoding: Option<&'static Encoding>) -> Result<ParcelSet> {
    let result = parsel::ingest::parse(path, encoding)
        .with_context(|| format!("Failed to read parcels from {}", path.display()))?;

    if !result.errors.is_empty() {
        warn!(
            dropped = result.dropped,
            "Some features were dropped during ingestion"
        );
        for err in result.errors.iter().take(10) {
            warn!(error = %err, "Dropped feature");
        }
    }

    if result.parcels.is_empty() {
        anyhow::bail!("No displayable parcel found in {}", path.display());
    }

    Ok(ParcelSet::new(result.parcels))
}

/// Exécute la commande list
pub fn cmd_list(path: &Path, config: &Config, encoding: Option<&'static Encoding>) -> Result<()> {
    let parcels = load_parcels(path, encoding)?;
    let entries = listing(&parcels, config.engine.tree_footprint_m2);

    println!("=== Parsel Listeleri ({}) ===", entries.len());
    for entry in &entries {
        println!(
            "{:<24} {:<28} {:>10.0} m² {:>6.1}%",
            entry.id.as_str(),
            entry.label,
            entry.area_m2,
            entry.occupancy_pct
        );
    }

    Ok(())
}

/// Exécute la commande summary
pub fn cmd_summary(
    path: &Path,
    selection_args: &SelectionArgs,
    json: Option<&Path>,
    config: &Config,
    encoding: Option<&'static Encoding>,
) -> Result<()> {
    let parcels = load_parcels(path, encoding)?;
    let selection = selection_args.apply(&parcels, config.engine.default_mode);

    let report = SelectionReport::build(&parcels, &selection, config);
    info!(summary = %report.summary(), "Selection summarized");
    report.display();

    if let Some(json_path) = json {
        report
            .save_to_file(json_path)
            .with_context(|| format!("Failed to write report to {}", json_path.display()))?;
        println!("Report saved to {}", json_path.display());
    }

    Ok(())
}

/// Exécute la commande export
pub fn cmd_export(
    path: &Path,
    selection_args: &SelectionArgs,
    output: &Path,
    config: &Config,
    encoding: Option<&'static Encoding>,
) -> Result<()> {
    let parcels = load_parcels(path, encoding)?;
    let selection = selection_args.apply(&parcels, config.engine.default_mode);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let stats = export_render_hints(&parcels, &selection, output)?;

    info!(
        parcels = stats.parcels,
        badges = stats.badges,
        output = %output.display(),
        "Export complete"
    );
    println!(
        "Export complete: {} parcels, {} badges to {} ({})",
        stats.parcels,
        stats.badges,
        output.display(),
        selection.mode().label()
    );

    Ok(())
}

/// Exécute la commande session
pub async fn cmd_session(
    path: &Path,
    config: Config,
    encoding: Option<&'static Encoding>,
) -> Result<()> {
    let parcels = load_parcels(path, encoding)?;
    let host = SessionHost::new(parcels, config).with_source(path.to_path_buf(), encoding);
    info!(fingerprint = host.fingerprint(), "Session started");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    host.run(stdin, &mut stdout).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::LineString;
    use parsel::Parcel;

    fn set() -> ParcelSet {
        ParcelSet::new(
            ["a", "b", "c"]
                .iter()
                .map(|id| Parcel::new(*id, LineString::from(vec![(27.0, 38.0)])))
                .collect(),
        )
    }

    #[test]
    fn test_single_selection_args() {
        let args = SelectionArgs {
            select: vec!["b".to_string()],
            ..Default::default()
        };
        let sel = args.apply(&set(), Mode::Harvest);
        assert_eq!(sel.mode(), Mode::Harvest);
        assert!(!sel.group_mode());
        assert_eq!(sel.selected_single(), Some(&ParcelId::from("b")));
    }

    #[test]
    fn test_several_ids_imply_group() {
        let args = SelectionArgs {
            mode: Some(Mode::Census),
            select: vec!["a".to_string(), "c".to_string(), "a".to_string()],
            ..Default::default()
        };
        let sel = args.apply(&set(), Mode::Spraying);
        assert_eq!(sel.mode(), Mode::Census);
        assert!(sel.group_mode());
        assert_eq!(sel.selected_group().len(), 2);
    }

    #[test]
    fn test_all_replaces_ids() {
        let args = SelectionArgs {
            select: vec!["a".to_string()],
            all: true,
            ..Default::default()
        };
        let sel = args.apply(&set(), Mode::Spraying);
        assert_eq!(sel.selected_group().len(), 3);
    }
}
