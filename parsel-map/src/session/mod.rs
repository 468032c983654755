//! Session interactive : boucle d'événements autour du moteur
//!
//! Chaque commande (clic, bascule du mode groupé, changement de mode...) est
//! appliquée à la sélection puis la vue est re-dérivée. Le signal de
//! réinitialisation est une tâche tokio planifiée : un nouveau déclenchement
//! annule la tâche en cours avant d'en planifier une autre.

mod command;

pub use command::Command;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use parsel::ingest::{self, Encoding};
use parsel::{listing, ListingEntry, ParcelSet, ResetTicket, Selection};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::fingerprint::dataset_fingerprint;
use crate::report::SelectionReport;

/// Résultat d'une commande
#[derive(Debug)]
pub enum Outcome {
    /// Vue re-dérivée après une transition
    View(Box<SelectionReport>),
    /// Liste des parcelles
    Listing(Vec<ListingEntry>),
    /// Rechargement de la source ; `changed` selon l'empreinte, et la vue
    /// re-dérivée quand le jeu a changé
    Reloaded {
        changed: bool,
        parcels: usize,
        view: Option<Box<SelectionReport>>,
    },
    Quit,
}

/// Source rechargeable
#[derive(Debug, Clone)]
struct Source {
    path: PathBuf,
    encoding: Option<&'static Encoding>,
}

/// Hôte d'une session : jeu de parcelles, sélection et minuterie de réinitialisation
pub struct SessionHost {
    config: Config,
    parcels: ParcelSet,
    fingerprint: String,
    selection: Selection,
    source: Option<Source>,
    reset_timer: Option<JoinHandle<()>>,
    expiry_tx: mpsc::UnboundedSender<ResetTicket>,
    expiry_rx: Option<mpsc::UnboundedReceiver<ResetTicket>>,
}

impl SessionHost {
    pub fn new(parcels: ParcelSet, config: Config) -> Self {
        let (expiry_tx, expiry_rx) = mpsc::unbounded_channel();
        Self {
            selection: Selection::new(config.engine.default_mode),
            fingerprint: dataset_fingerprint(&parcels),
            config,
            parcels,
            source: None,
            reset_timer: None,
            expiry_tx,
            expiry_rx: Some(expiry_rx),
        }
    }

    /// Associe la source relue par la commande `reload`
    pub fn with_source(mut self, path: PathBuf, encoding: Option<&'static Encoding>) -> Self {
        self.source = Some(Source { path, encoding });
        self
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn parcels(&self) -> &ParcelSet {
        &self.parcels
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Récepteur des expirations du signal de réinitialisation (une seule fois)
    pub fn take_expiry_receiver(&mut self) -> Option<mpsc::UnboundedReceiver<ResetTicket>> {
        self.expiry_rx.take()
    }

    /// Vue courante
    pub fn view(&self) -> SelectionReport {
        SelectionReport::build(&self.parcels, &self.selection, &self.config)
    }

    /// Applique une commande ; doit être appelé dans un runtime tokio
    pub fn handle(&mut self, command: Command) -> Result<Outcome> {
        debug!(?command, "Session command");
        match command {
            Command::Click(id) => {
                if !self.parcels.contains(&id) {
                    warn!(id = %id, "Click on unknown parcel");
                }
                self.selection.select_parcel(id);
            }
            Command::Group(enabled) => self.selection.set_group_mode(enabled),
            Command::All => {
                if !self.selection.select_all(self.parcels.ids()) {
                    warn!("Select all ignored outside group mode");
                }
            }
            Command::Clear => self.selection.clear_selection(),
            Command::Mode(mode) => self.selection.set_mode(mode),
            Command::Reset => self.reset_view(),
            Command::Show => {}
            Command::List => {
                return Ok(Outcome::Listing(listing(
                    &self.parcels,
                    self.config.engine.tree_footprint_m2,
                )))
            }
            Command::Reload => return self.reload(),
            Command::Quit => {
                self.cancel_reset_timer();
                return Ok(Outcome::Quit);
            }
        }
        Ok(Outcome::View(Box::new(self.view())))
    }

    /// Déclenche la réinitialisation et replanifie son expiration
    fn reset_view(&mut self) {
        let ticket = self.selection.reset_view();
        self.cancel_reset_timer();

        let deadline = Instant::now() + self.config.engine.reset_window();
        let tx = self.expiry_tx.clone();
        self.reset_timer = Some(tokio::spawn(async move {
            sleep_until(deadline).await;
            // Le récepteur peut avoir disparu en fin de session
            let _ = tx.send(ticket);
        }));
    }

    fn cancel_reset_timer(&mut self) {
        if let Some(handle) = self.reset_timer.take() {
            handle.abort();
        }
    }

    /// Fin de la fenêtre de réinitialisation ; `false` si le ticket est périmé
    pub fn on_reset_expired(&mut self, ticket: ResetTicket) -> bool {
        let expired = self.selection.expire_reset(ticket);
        if expired {
            self.reset_timer = None;
        }
        expired
    }

    /// Relit la source et remplace le jeu si son empreinte a changé
    fn reload(&mut self) -> Result<Outcome> {
        let source = self
            .source
            .clone()
            .context("No source file to reload")?;

        let result = ingest::parse(&source.path, source.encoding)
            .with_context(|| format!("Failed to reload {}", source.path.display()))?;
        let parcels = ParcelSet::new(result.parcels);
        let fingerprint = dataset_fingerprint(&parcels);

        let changed = fingerprint != self.fingerprint;
        if changed {
            self.parcels = parcels;
            self.fingerprint = fingerprint;
            let stale = self.parcels.stale_ids(&self.selection).len();
            info!(parcels = self.parcels.len(), stale, "Parcel set reloaded");
        } else {
            info!("Source unchanged");
        }

        Ok(Outcome::Reloaded {
            changed,
            parcels: self.parcels.len(),
            view: changed.then(|| Box::new(self.view())),
        })
    }

    /// Boucle de session : commandes ligne à ligne et expirations de la minuterie
    pub async fn run<R, W>(mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut expiries = self
            .take_expiry_receiver()
            .context("Session loop already running")?;
        let mut lines = input.lines();

        writeln!(out, "{} parcels loaded. Type 'help' for commands.", self.parcels.len())?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if line == "help" {
                        writeln!(out, "{}", Command::HELP)?;
                        continue;
                    }
                    let command = match line.parse::<Command>() {
                        Ok(command) => command,
                        Err(e) => {
                            writeln!(out, "error: {}", e)?;
                            continue;
                        }
                    };
                    match self.handle(command) {
                        Ok(Outcome::Quit) => break,
                        Ok(outcome) => write_outcome(out, &outcome)?,
                        Err(e) => writeln!(out, "error: {:#}", e)?,
                    }
                }
                Some(ticket) = expiries.recv() => {
                    if self.on_reset_expired(ticket) {
                        debug!(generation = ticket.generation(), "Reset signal cleared");
                    }
                }
            }
        }

        self.cancel_reset_timer();
        info!("Session closed");
        Ok(())
    }
}

fn write_outcome<W: Write>(out: &mut W, outcome: &Outcome) -> Result<()> {
    match outcome {
        Outcome::View(report) => report.write_to(out)?,
        Outcome::Listing(entries) => {
            for entry in entries {
                writeln!(
                    out,
                    "  {}  {}  {:.0} m²  {:.1}%",
                    entry.id, entry.label, entry.area_m2, entry.occupancy_pct
                )?;
            }
        }
        Outcome::Reloaded {
            changed,
            parcels,
            view,
        } => {
            let state = if *changed { "changed" } else { "unchanged" };
            writeln!(out, "Reloaded {} parcels ({})", parcels, state)?;
            if let Some(report) = view {
                report.write_to(out)?;
            }
        }
        Outcome::Quit => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::LineString;
    use parsel::{FocusRegion, Mode, Parcel};
    use std::time::Duration;

    fn set() -> ParcelSet {
        let parcel = |id: &str, x: f64| {
            Parcel::new(
                id,
                LineString::from(vec![(x, 38.0), (x + 0.001, 38.0), (x + 0.001, 38.001), (x, 38.0)]),
            )
        };
        ParcelSet::new(vec![parcel("a", 27.0), parcel("b", 27.01)])
    }

    fn window() -> Duration {
        Config::default().engine.reset_window()
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_expires_after_window() {
        let mut host = SessionHost::new(set(), Config::default());
        let mut rx = host.take_expiry_receiver().unwrap();

        host.handle(Command::Click("a".into())).unwrap();
        let start = Instant::now();
        let outcome = host.handle(Command::Reset).unwrap();
        match outcome {
            Outcome::View(report) => {
                assert_eq!(report.header.parcel_count, 0);
                assert!(matches!(
                    report.focus.map(|f| f.region),
                    Some(FocusRegion::Default { .. })
                ));
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(host.selection().is_reset_active());

        let ticket = rx.recv().await.unwrap();
        assert!(Instant::now() >= start + window());
        assert!(host.on_reset_expired(ticket));
        assert!(!host.selection().is_reset_active());
        assert!(host.view().focus.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrigger_restarts_window() {
        let mut host = SessionHost::new(set(), Config::default());
        let mut rx = host.take_expiry_receiver().unwrap();

        let start = Instant::now();
        host.handle(Command::Reset).unwrap();
        tokio::time::advance(window() / 2).await;
        host.handle(Command::Reset).unwrap();

        let ticket = rx.recv().await.unwrap();
        assert!(Instant::now() >= start + window() * 3 / 2);
        assert!(host.on_reset_expired(ticket));

        // La première minuterie a été annulée : aucune seconde expiration
        tokio::time::advance(window() * 2).await;
        assert!(rx.try_recv().is_err());
        assert!(!host.selection().is_reset_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_ticket_ignored() {
        let mut host = SessionHost::new(set(), Config::default());
        let mut rx = host.take_expiry_receiver().unwrap();

        host.handle(Command::Reset).unwrap();
        let first = rx.recv().await.unwrap();
        host.handle(Command::Reset).unwrap();

        assert!(!host.on_reset_expired(first));
        assert!(host.selection().is_reset_active());

        let second = rx.recv().await.unwrap();
        assert!(host.on_reset_expired(second));
    }

    #[tokio::test]
    async fn test_commands_drive_selection() {
        let mut host = SessionHost::new(set(), Config::default());

        host.handle(Command::Group(true)).unwrap();
        host.handle(Command::All).unwrap();
        assert_eq!(host.selection().selected_group().len(), 2);

        host.handle(Command::Click("a".into())).unwrap();
        assert_eq!(host.selection().selected_group().len(), 1);

        host.handle(Command::Mode(Mode::Harvest)).unwrap();
        assert_eq!(host.selection().selected_group().len(), 1);

        host.handle(Command::Group(false)).unwrap();
        assert!(host.selection().is_empty());

        match host.handle(Command::List).unwrap() {
            Outcome::Listing(entries) => assert_eq!(entries.len(), 2),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(host.handle(Command::Reload).is_err(), "no source to reload");
        assert!(matches!(host.handle(Command::Quit).unwrap(), Outcome::Quit));
    }

    #[test]
    fn test_changed_reload_prints_view() {
        let host = SessionHost::new(set(), Config::default());
        let mut out = Vec::new();
        let outcome = Outcome::Reloaded {
            changed: true,
            parcels: 2,
            view: Some(Box::new(host.view())),
        };
        write_outcome(&mut out, &outcome).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Reloaded 2 parcels (changed)"));
        assert!(text.contains("--- SUMMARY ---"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_loop() {
        let host = SessionHost::new(set(), Config::default());
        let input: &[u8] = b"group on\nall\nmode hasat\nbogus\nreset\nshow\nquit\nclick a\n";
        let mut out = Vec::new();

        host.run(input, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("2 parcels loaded."));
        assert!(text.contains("Hasat Haritası - Çoklu Seçim"));
        assert!(text.contains("error: "));
        assert!(text.contains("Focus: default view"));
    }
}
