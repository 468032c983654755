//! Commandes texte de la session

use std::str::FromStr;

use parsel::{Mode, ParcelId};
use thiserror::Error;

/// Événement d'entrée de la session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Clic sur une parcelle (carte ou liste)
    Click(ParcelId),
    /// Case « Çoklu Seçim »
    Group(bool),
    /// Bouton « Tümünü Seç »
    All,
    Clear,
    Mode(Mode),
    Reset,
    Show,
    List,
    Reload,
    Quit,
}

impl Command {
    pub const HELP: &'static str = "\
commands:
  click ID      select / toggle a parcel
  group on|off  toggle group selection
  all           select every parcel (group mode)
  clear         clear the selection
  mode M        ilac, hasat, sayim, gubre, analiz
  reset         reset the view
  show          print the current view
  list          list all parcels
  reload        re-read the source file
  quit";
}

/// Erreur de lecture d'une commande
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CommandError(String);

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let verb = parts
            .next()
            .ok_or_else(|| CommandError("empty command".to_string()))?;
        let arg = parts.next();

        let command = match (verb.to_lowercase().as_str(), arg) {
            ("click" | "select", Some(id)) => Command::Click(ParcelId::from(id)),
            ("group", Some("on" | "true" | "1")) => Command::Group(true),
            ("group", Some("off" | "false" | "0")) => Command::Group(false),
            ("all", None) => Command::All,
            ("clear", None) => Command::Clear,
            ("mode", Some(mode)) => Command::Mode(
                mode.parse()
                    .map_err(|e: parsel::ParselError| CommandError(e.to_string()))?,
            ),
            ("reset", None) => Command::Reset,
            ("show", None) => Command::Show,
            ("list" | "ls", None) => Command::List,
            ("reload", None) => Command::Reload,
            ("quit" | "exit" | "q", None) => Command::Quit,
            _ => return Err(CommandError(format!("unknown command: {}", s.trim()))),
        };

        if parts.next().is_some() {
            return Err(CommandError(format!("too many arguments: {}", s.trim())));
        }
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("click 101_7".parse(), Ok(Command::Click("101_7".into())));
        assert_eq!("GROUP on".parse(), Ok(Command::Group(true)));
        assert_eq!("group off".parse(), Ok(Command::Group(false)));
        assert_eq!("mode sayim".parse(), Ok(Command::Mode(Mode::Census)));
        assert_eq!("  all ".parse(), Ok(Command::All));
        assert_eq!("q".parse(), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Command>().is_err());
        assert!("click".parse::<Command>().is_err());
        assert!("group maybe".parse::<Command>().is_err());
        assert!("all now".parse::<Command>().is_err());
        assert!("click a b".parse::<Command>().is_err());
        let err = "mode uydu".parse::<Command>().unwrap_err();
        assert!(err.to_string().contains("Unknown mode"));
    }
}
