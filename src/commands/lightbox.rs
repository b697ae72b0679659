//! Lightbox commands for the interactive kiosk
//!
//! Each stdin line is parsed into a [`KioskCommand`] and applied to the
//! mounted view of the current collection.

use std::str::FromStr;
use thiserror::Error;

use weddingwall_core::services::NavKey;
use weddingwall_core::{CommandError, GalleryView, LightboxState};

#[derive(Debug, Clone, PartialEq)]
pub enum KioskCommand {
    Open(usize),
    Jump(usize),
    Next,
    Prev,
    Close,
    Key(String),
    Swipe { from: f32, to: f32 },
    Drag(f32),
    Show,
    Refresh,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
}

pub const HELP: &str = "\
commands:
  open <n>          open the lightbox at photo n
  jump <n>          show photo n in the open lightbox
  next | prev       step through photos (wraps around)
  close             close the lightbox
  key <name>        Escape, ArrowLeft or ArrowRight
  swipe <x0> <x1>   horizontal touch swipe
  drag <dx>         mouse drag by dx pixels
  show              print the gallery
  refresh           fetch now
  quit";

fn number<T: FromStr>(arg: Option<&str>, command: &'static str) -> Result<T, ParseError> {
    let arg = arg.ok_or(ParseError::MissingArgument(command))?;
    arg.parse()
        .map_err(|_| ParseError::InvalidNumber(arg.to_string()))
}

impl FromStr for KioskCommand {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return Err(ParseError::Empty);
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "open" | "o" => KioskCommand::Open(number(parts.next(), "open")?),
            "jump" | "j" => KioskCommand::Jump(number(parts.next(), "jump")?),
            "next" | "n" => KioskCommand::Next,
            "prev" | "p" => KioskCommand::Prev,
            "close" | "c" => KioskCommand::Close,
            "key" => KioskCommand::Key(
                parts
                    .next()
                    .ok_or(ParseError::MissingArgument("key"))?
                    .to_string(),
            ),
            "swipe" => KioskCommand::Swipe {
                from: number(parts.next(), "swipe")?,
                to: number(parts.next(), "swipe")?,
            },
            "drag" => KioskCommand::Drag(number(parts.next(), "drag")?),
            "show" | "ls" => KioskCommand::Show,
            "refresh" | "r" => KioskCommand::Refresh,
            "help" | "?" => KioskCommand::Help,
            "quit" | "exit" | "q" => KioskCommand::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

/// Apply a navigation command to a view.
///
/// Returns `None` for commands that are not lightbox navigation.
pub fn apply(
    view: &GalleryView,
    command: &KioskCommand,
) -> Option<Result<LightboxState, CommandError>> {
    let result = match command {
        KioskCommand::Open(index) => view.open(*index).map_err(CommandError::from),
        KioskCommand::Jump(index) => view.jump(*index).map_err(CommandError::from),
        KioskCommand::Next => Ok(view.next()),
        KioskCommand::Prev => Ok(view.prev()),
        KioskCommand::Close => Ok(view.close()),
        KioskCommand::Key(name) => Ok(view.handle_key(NavKey::from_key_name(name))),
        KioskCommand::Swipe { from, to } => {
            view.touch_start(*from, 0.0);
            Ok(view.touch_end(*to, 0.0))
        }
        KioskCommand::Drag(dx) => {
            view.drag_move(*dx);
            Ok(view.drag_end())
        }
        KioskCommand::Show | KioskCommand::Refresh | KioskCommand::Help | KioskCommand::Quit => {
            return None
        }
    };
    Some(result)
}

pub fn format_lightbox(state: &LightboxState, len: usize) -> String {
    match (state.is_open, state.current_index) {
        (true, Some(index)) => format!("lightbox: photo {} of {}", index + 1, len),
        _ => "lightbox: closed".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation() {
        assert_eq!("open 3".parse(), Ok(KioskCommand::Open(3)));
        assert_eq!("  N ".parse(), Ok(KioskCommand::Next));
        assert_eq!("key Escape".parse(), Ok(KioskCommand::Key("Escape".into())));
        assert_eq!(
            "swipe 200 90".parse(),
            Ok(KioskCommand::Swipe { from: 200.0, to: 90.0 })
        );
        assert_eq!("drag -60".parse(), Ok(KioskCommand::Drag(-60.0)));
        assert_eq!("q".parse(), Ok(KioskCommand::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<KioskCommand>(), Err(ParseError::Empty));
        assert_eq!(
            "open".parse::<KioskCommand>(),
            Err(ParseError::MissingArgument("open"))
        );
        assert_eq!(
            "open -1".parse::<KioskCommand>(),
            Err(ParseError::InvalidNumber("-1".into()))
        );
        assert_eq!(
            "dance".parse::<KioskCommand>(),
            Err(ParseError::Unknown("dance".into()))
        );
    }

    #[test]
    fn test_format_lightbox() {
        let closed = LightboxState::default();
        assert_eq!(format_lightbox(&closed, 4), "lightbox: closed");

        let open = LightboxState {
            is_open: true,
            current_index: Some(1),
            pending_direction: 0,
        };
        assert_eq!(format_lightbox(&open, 4), "lightbox: photo 2 of 4");
    }
}
