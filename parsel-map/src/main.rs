//! Point d'entrée CLI pour parsel-map

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use parsel_map::cli::{self, Commands};
use parsel_map::Config;

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

/// Parcourir, sélectionner et résumer des parcelles agricoles
#[derive(Parser)]
#[command(name = "parsel-map")]
#[command(author, version)]
#[command(about = "Sélection, statut et synthèse de parcelles agricoles depuis un GeoJSON")]
#[command(long_about = "Charge un jeu de parcelles GeoJSON, dérive le statut de chaque parcelle selon le mode (ilaçlama, hasat, sayım, gübre, analiz) et résume une sélection simple ou groupée.\n\nLa commande 'session' lit des événements sur l'entrée standard et ré-affiche la vue après chacun.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config preset name (default/tablet) or path to a JSON config
    #[arg(long, env = "PARSEL_CONFIG", default_value = "default", global = true)]
    config: String,

    /// Source encoding label (utf-8, windows-1254...), overrides the config
    #[arg(long, env = "PARSEL_ENCODING", global = true)]
    encoding: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    let config = Config::resolve(&cli.config)
        .with_context(|| format!("Failed to load config '{}'", cli.config))?;
    let encoding = config.source_encoding(cli.encoding.as_deref())?;

    match cli.command {
        Commands::List { source } => {
            info!(path = %source.path.display(), "Listing parcels");
            cli::cmd_list(&source.path, &config, encoding)?;
        }
        Commands::Summary {
            source,
            selection,
            json,
        } => {
            info!(path = %source.path.display(), mode = ?selection.mode, "Summarizing selection");
            cli::cmd_summary(&source.path, &selection, json.as_deref(), &config, encoding)?;
        }
        Commands::Export {
            source,
            selection,
            output,
        } => {
            info!(path = %source.path.display(), output = %output.display(), "Export vers GeoJSON");
            cli::cmd_export(&source.path, &selection, &output, &config, encoding)?;
        }
        Commands::Session { source } => {
            info!(path = %source.path.display(), config = %cli.config, "Starting session");
            cli::cmd_session(&source.path, config, encoding).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // Les logs vont sur stderr : stdout reste réservé aux rapports
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
