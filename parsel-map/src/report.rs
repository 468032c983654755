//! Rapport de la sélection courante
//!
//! Regroupe tout ce que la présentation affiche après un événement :
//! en-tête, résumé du mode, indicateurs de surface et région de cadrage.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use parsel::{
    compute_focus_region, summarize_with, AggregatedSummary, AreaMetrics, FocusRegion, ParcelId,
    ParcelSet, Selection, SelectionHeader, SelectionSnapshot,
};
use serde::Serialize;

use crate::config::Config;

/// Cadrage demandé à la carte, avec le zoom estimé pour la fenêtre configurée
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusHint {
    pub region: FocusRegion,
    pub zoom: u8,
}

/// Rapport complet d'une sélection
#[derive(Debug, Clone, Serialize)]
pub struct SelectionReport {
    pub selection: SelectionSnapshot,
    pub header: SelectionHeader,
    pub summary: AggregatedSummary,
    pub metrics: AreaMetrics,
    /// `None` : la vue ne change pas
    pub focus: Option<FocusHint>,
    /// Identifiants sélectionnés absents du jeu courant
    pub stale: Vec<ParcelId>,
}

impl SelectionReport {
    /// Dérive le rapport depuis l'état courant
    pub fn build(parcels: &ParcelSet, selection: &Selection, config: &Config) -> Self {
        let engine = &config.engine;
        let resolved = parcels.resolve(selection);

        let focus = compute_focus_region(parcels, selection, &engine.focus).map(|region| {
            let zoom = match &region {
                FocusRegion::Default { zoom, .. } => *zoom,
                FocusRegion::Fit(fit) => {
                    fit.zoom_for_viewport(config.viewport.width, config.viewport.height)
                }
            };
            FocusHint { region, zoom }
        });

        Self {
            selection: selection.snapshot(),
            header: SelectionHeader::build(&resolved, selection.group_mode()),
            summary: summarize_with(&resolved, selection.mode(), engine.tree_footprint_m2),
            metrics: AreaMetrics::for_selection(&resolved, engine.tree_footprint_m2),
            focus,
            stale: parcels.stale_ids(selection).into_iter().cloned().collect(),
        }
    }

    /// Écrit le rapport lisible
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "\n{}", "=".repeat(60))?;
        writeln!(
            out,
            "{} - {}",
            self.summary.title,
            if self.selection.group_mode { "Çoklu Seçim" } else { "Tekli Seçim" }
        )?;
        writeln!(out, "{}", "=".repeat(60))?;

        if self.header.parcel_count == 0 {
            writeln!(out, "\nNo parcel selected")?;
        } else {
            writeln!(out, "\n--- SELECTION ---")?;
            writeln!(out, "Tanım: {}", self.header.definition)?;
            writeln!(out, "Mahalle: {}", self.header.neighborhood)?;
            writeln!(out, "Ada / Parsel: {}", self.header.parcel_label())?;
            writeln!(
                out,
                "Alan: {:.0} m² ({:.2} dönüm)",
                self.header.area_m2, self.header.donum
            )?;
        }

        writeln!(out, "\n--- SUMMARY ---")?;
        for cell in &self.summary.cells {
            writeln!(out, "  {}: {}", cell.label, cell.value)?;
        }

        if self.metrics.parcel_count > 0 {
            writeln!(out, "\n--- AREA ---")?;
            writeln!(
                out,
                "  {} trees, {:.2} per dönüm, {} plantable, {:.1}% occupied",
                self.metrics.trees,
                self.metrics.trees_per_donum,
                self.metrics.plantable_capacity,
                self.metrics.occupancy_pct
            )?;
        }

        match &self.focus {
            Some(FocusHint {
                region: FocusRegion::Default { center, .. },
                zoom,
            }) => writeln!(out, "\nFocus: default view {:.5}, {:.5} @ z{}", center.lat, center.lng, zoom)?,
            Some(FocusHint {
                region: FocusRegion::Fit(fit),
                zoom,
            }) => writeln!(
                out,
                "\nFocus: [{:.6}, {:.6}] - [{:.6}, {:.6}] @ z{}",
                fit.south_west.lat, fit.south_west.lng, fit.north_east.lat, fit.north_east.lng, zoom
            )?,
            None => {}
        }

        if !self.stale.is_empty() {
            writeln!(out, "\n--- STALE ({}) ---", self.stale.len())?;
            for id in self.stale.iter().take(10) {
                writeln!(out, "  {}", id)?;
            }
            if self.stale.len() > 10 {
                writeln!(out, "  ... and {} more", self.stale.len() - 10)?;
            }
        }

        writeln!(out, "\n{}", "=".repeat(60))
    }

    /// Affiche le rapport sur la sortie standard
    pub fn display(&self) {
        let stdout = std::io::stdout();
        let _ = self.write_to(&mut stdout.lock());
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Résumé une ligne pour les logs
    pub fn summary(&self) -> String {
        format!(
            "{}: {} parcel(s), {}",
            self.summary.mode,
            self.header.parcel_count,
            self.summary
                .cells
                .iter()
                .map(|c| format!("{}={}", c.label, c.value))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::LineString;
    use parsel::{Mode, Parcel};

    fn set() -> ParcelSet {
        let mut a = Parcel::new(
            "a",
            LineString::from(vec![(27.0, 38.0), (27.001, 38.0), (27.001, 38.001), (27.0, 38.0)]),
        );
        a.properties.area_m2 = Some(10_000.0);
        a.info.trees.0.push(("zeytin".to_string(), 100.0));
        ParcelSet::new(vec![a])
    }

    #[test]
    fn test_empty_selection_report() {
        let report = SelectionReport::build(&set(), &Selection::default(), &Config::default());
        assert_eq!(report.header.parcel_count, 0);
        assert!(report.focus.is_none());
        assert!(report.summary.cells.iter().all(|c| c.value.is_missing()));

        let mut buf = Vec::new();
        report.write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("No parcel selected"));
        assert!(text.contains("İlaçlama Bilgisi"));
    }

    #[test]
    fn test_single_selection_report() {
        let mut sel = Selection::new(Mode::Analysis);
        sel.select_parcel("a".into());
        let report = SelectionReport::build(&set(), &sel, &Config::default());

        assert_eq!(report.header.parcel_count, 1);
        assert_eq!(report.metrics.plantable_capacity, 177);
        let focus = report.focus.as_ref().unwrap();
        assert!(matches!(focus.region, FocusRegion::Fit(_)));
        assert_eq!(focus.zoom, 17);
        assert_eq!(
            report.summary(),
            "analiz: 1 parcel(s), Alan (dönüm)=10, Ağaç + Fidan=100, Ağaç / Dönüm=10, Dikilebilir Fidan=177, Doluluk=36%"
        );
    }

    #[test]
    fn test_stale_ids_reported() {
        let mut sel = Selection::default();
        sel.set_group_mode(true);
        sel.select_parcel("gone".into());
        let report = SelectionReport::build(&set(), &sel, &Config::default());

        assert_eq!(report.stale, vec![ParcelId::from("gone")]);
        assert!(report.focus.is_none());
        let mut buf = Vec::new();
        report.write_to(&mut buf).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("STALE (1)"));
    }

    #[test]
    fn test_save_to_file() {
        let report = SelectionReport::build(&set(), &Selection::default(), &Config::default());
        let path = std::env::temp_dir().join("parsel_map_report.json");
        report.save_to_file(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["summary"]["mode"], "ilac");
        assert_eq!(json["selection"]["group_mode"], false);
        std::fs::remove_file(&path).ok();
    }
}
